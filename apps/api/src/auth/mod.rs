//! Accounts, credentials and session tokens.
//!
//! Passwords are stored as argon2 PHC strings. Sessions are HS256 tokens
//! carrying `{user_id, role, exp}` and are presented as `Authorization: Bearer`.

pub mod extractor;
pub mod handlers;
pub mod oauth;
pub mod password;
pub mod token;

pub use extractor::AuthUser;
pub use oauth::GoogleOAuth;
pub use token::TokenService;
