// Domain entities

pub mod config;
pub mod event_staff;
pub mod record;

pub use config::*;
pub use event_staff::*;
pub use record::*;
