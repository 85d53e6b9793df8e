pub mod sqlite_records;
pub mod sqlite_staff;

pub use sqlite_records::*;
pub use sqlite_staff::*;
