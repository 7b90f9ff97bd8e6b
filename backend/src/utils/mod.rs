pub mod cookies;
pub mod email;

pub use cookies::*;
pub use email::*;
