//! Data models shared across database access and API handlers.

pub mod admin_user;
pub mod login_token;
pub mod session;

pub use admin_user::*;
pub use login_token::*;
pub use session::*;
