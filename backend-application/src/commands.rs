pub mod export_commands;
pub mod record_commands;
pub mod staff_commands;
pub mod upload_commands;
