pub mod export_file_store;
pub mod smtp_relay;

pub use export_file_store::*;
pub use smtp_relay::*;
