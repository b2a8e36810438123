pub mod csv_log;
pub mod result_store;

pub use csv_log::CsvLog;
pub use result_store::{AnalysisRecord, ResultStore};
