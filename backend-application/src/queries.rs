pub mod record_queries;
pub mod staff_queries;
