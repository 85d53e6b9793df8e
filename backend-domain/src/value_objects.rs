// Domain value objects
pub mod export_column;
pub mod record_code;
pub mod record_flag;

pub use export_column::*;
pub use record_code::*;
pub use record_flag::*;
