use std::path::PathBuf;

use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::debug;

use super::result_store::AnalysisRecord;
use crate::error::AppError;

pub const CSV_HEADER: &str = "ts,filename,r,g,b,h_degrees,s,v,hex\n";

/// Append-only CSV copy of every stored analysis.
#[derive(Debug)]
pub struct CsvLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub async fn append(&self, record: &AnalysisRecord) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        self.ensure_exists().await?;

        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(csv_row(record).as_bytes()).await?;
        file.flush().await?;
        debug!("Appended {} to {}", record.filename, self.path.display());
        Ok(())
    }

    /// Full log contents; a missing log is created holding only the header.
    pub async fn contents(&self) -> Result<Vec<u8>, AppError> {
        let _guard = self.write_lock.lock().await;
        self.ensure_exists().await?;
        Ok(fs::read(&self.path).await?)
    }

    async fn ensure_exists(&self) -> Result<(), AppError> {
        if fs::try_exists(&self.path).await? {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, CSV_HEADER).await?;
        Ok(())
    }
}

fn csv_row(record: &AnalysisRecord) -> String {
    let fields = [
        escape(&record.ts),
        escape(&record.filename),
        record.mean_rgb.r.to_string(),
        record.mean_rgb.g.to_string(),
        record.mean_rgb.b.to_string(),
        record.mean_hsv.h_degrees.to_string(),
        record.mean_hsv.s.to_string(),
        record.mean_hsv.v.to_string(),
        escape(&record.hex),
    ];
    let mut row = fields.join(",");
    row.push('\n');
    row
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{MeanHsv, MeanRgb};

    fn record(filename: &str) -> AnalysisRecord {
        AnalysisRecord {
            ts: "2026-10-19T08:30:00Z".to_string(),
            filename: filename.to_string(),
            mean_rgb: MeanRgb {
                r: 127.5,
                g: 0.0,
                b: 0.0,
            },
            mean_hsv: MeanHsv {
                h_degrees: 0.0,
                s: 1.0,
                v: 0.5,
            },
            hex: "#7f0000".to_string(),
        }
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("color-summarizer-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain.png"), "plain.png");
        assert_eq!(escape("a,b.png"), "\"a,b.png\"");
        assert_eq!(escape("say \"hi\".png"), "\"say \"\"hi\"\".png\"");
    }

    #[test]
    fn test_row_layout() {
        assert_eq!(
            csv_row(&record("red.png")),
            "2026-10-19T08:30:00Z,red.png,127.5,0,0,0,1,0.5,#7f0000\n"
        );
    }

    #[tokio::test]
    async fn test_contents_creates_header_only_file() {
        let log = CsvLog::new(scratch_path("results.csv"));
        let contents = log.contents().await.unwrap();
        assert_eq!(contents, CSV_HEADER.as_bytes());
        assert!(log.path.exists());
    }

    #[tokio::test]
    async fn test_append_writes_header_once() {
        let log = CsvLog::new(scratch_path("results.csv"));
        log.append(&record("one.png")).await.unwrap();
        log.append(&record("two, three.png")).await.unwrap();

        let text = String::from_utf8(log.contents().await.unwrap()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER.trim_end());
        assert!(lines[1].contains(",one.png,"));
        assert!(lines[2].contains(",\"two, three.png\","));
    }
}
