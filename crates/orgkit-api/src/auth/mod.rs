pub mod middleware;
pub mod models;
pub mod token;

pub use models::{AuthContext, JwtClaims};
pub use token::generate_invitation_token;
