pub mod export_handlers;
pub mod ops_handlers;
pub mod record_handlers;
pub mod staff_handlers;

pub use export_handlers::*;
pub use ops_handlers::*;
pub use record_handlers::*;
pub use staff_handlers::*;
