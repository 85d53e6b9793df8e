// Password hashing and bearer tokens for staff

pub mod password;
pub mod token;

pub use password::*;
pub use token::*;
