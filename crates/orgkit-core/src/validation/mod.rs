//! Input validation helpers
//!
//! Slug and email validation shared by the API handlers and repositories.

use crate::AppError;
use regex::Regex;
use std::sync::OnceLock;
use validator::ValidateEmail;

const SLUG_MIN_LEN: usize = 2;
const SLUG_MAX_LEN: usize = 64;
const NAME_MIN_LEN: usize = 2;

fn slug_regex() -> &'static Regex {
    static SLUG_RE: OnceLock<Regex> = OnceLock::new();
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9-]+$").expect("valid slug regex"))
}

/// Validate an organization slug: lowercase letters, digits, and hyphens,
/// length at least 2. The slug is immutable after creation.
pub fn validate_slug(slug: &str) -> Result<(), AppError> {
    if slug.len() < SLUG_MIN_LEN {
        return Err(AppError::InvalidInput(
            "Slug must be at least 2 characters".to_string(),
        ));
    }
    if slug.len() > SLUG_MAX_LEN {
        return Err(AppError::InvalidInput(format!(
            "Slug must be at most {} characters",
            SLUG_MAX_LEN
        )));
    }
    if !slug_regex().is_match(slug) {
        return Err(AppError::InvalidInput(
            "Slug can only contain lowercase letters, numbers, and hyphens".to_string(),
        ));
    }
    Ok(())
}

/// Validate an organization display name.
pub fn validate_organization_name(name: &str) -> Result<(), AppError> {
    if name.trim().len() < NAME_MIN_LEN {
        return Err(AppError::InvalidInput(
            "Name must be at least 2 characters".to_string(),
        ));
    }
    Ok(())
}

/// Validate an email address and return it normalized to lowercase.
/// Emails are unique case-insensitively; lowercase is the canonical form.
pub fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim();
    if !email.validate_email() {
        return Err(AppError::InvalidInput("Invalid email".to_string()));
    }
    Ok(email.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_slugs_pass() {
        for slug in ["acme", "ab", "my-org-2", "42"] {
            assert!(validate_slug(slug).is_ok(), "slug {:?} should pass", slug);
        }
    }

    #[test]
    fn invalid_slugs_fail() {
        for slug in ["a", "", "Acme", "my org", "org_1", "café", "org!"] {
            assert!(validate_slug(slug).is_err(), "slug {:?} should fail", slug);
        }
    }

    #[test]
    fn slug_length_limit_enforced() {
        let long = "a".repeat(SLUG_MAX_LEN + 1);
        assert!(validate_slug(&long).is_err());
        let max = "a".repeat(SLUG_MAX_LEN);
        assert!(validate_slug(&max).is_ok());
    }

    #[test]
    fn organization_name_requires_two_chars() {
        assert!(validate_organization_name("A").is_err());
        assert!(validate_organization_name("  ").is_err());
        assert!(validate_organization_name("Acme").is_ok());
    }

    #[test]
    fn emails_are_normalized_to_lowercase() {
        assert_eq!(
            normalize_email("Bob@Example.COM").unwrap(),
            "bob@example.com"
        );
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("").is_err());
    }
}
