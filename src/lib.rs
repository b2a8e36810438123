pub mod color;
pub mod config;
pub mod error;
pub mod server;
pub mod storage;

pub use color::{ColorSummary, MeanHsv, MeanRgb, summarize};
pub use config::Settings;
pub use error::{AppError, SummarizeError};
