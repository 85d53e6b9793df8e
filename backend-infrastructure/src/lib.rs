pub mod config;
pub mod db;
pub mod repositories;
pub mod services;

pub use config::*;
pub use db::*;
pub use repositories::*;
pub use services::*;
