pub mod decode;
pub mod hsv;
pub mod summary;
pub mod summary_service;

pub use decode::{decode, summarize_bytes};
pub use summary::{ColorSummary, MeanHsv, MeanRgb, summarize};
pub use summary_service::{Analysis, SummaryService, Upload};
