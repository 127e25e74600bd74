mod password;
mod token;
mod user;

pub use password::{hash_password, verify_password};
pub use token::{Claims, Tokens};
pub use user::{AuthUser, Role};
