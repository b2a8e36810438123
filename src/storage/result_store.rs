use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{
    FromRow, Sqlite, SqlitePool, Transaction,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::{debug, info};

use crate::{
    color::{ColorSummary, MeanHsv, MeanRgb},
    error::AppError,
};

const CREATE_ANALYSES: &str = "CREATE TABLE IF NOT EXISTS analyses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ts TEXT NOT NULL,
    filename TEXT NOT NULL,
    mean_rgb TEXT NOT NULL,
    mean_hsv TEXT NOT NULL,
    hex TEXT NOT NULL
)";

/// One stored analysis, as returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub ts: String,
    pub filename: String,
    pub mean_rgb: MeanRgb,
    pub mean_hsv: MeanHsv,
    pub hex: String,
}

/// Raw `analyses` row; the color columns hold JSON text.
#[derive(Debug, FromRow)]
struct AnalysisRow {
    ts: String,
    filename: String,
    mean_rgb: String,
    mean_hsv: String,
    hex: String,
}

impl TryFrom<AnalysisRow> for AnalysisRecord {
    type Error = AppError;

    fn try_from(row: AnalysisRow) -> Result<Self, Self::Error> {
        Ok(Self {
            ts: row.ts,
            filename: row.filename,
            mean_rgb: serde_json::from_str(&row.mean_rgb)?,
            mean_hsv: serde_json::from_str(&row.mean_hsv)?,
            hex: row.hex,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ResultStore {
    pool: SqlitePool,
}

impl ResultStore {
    pub async fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        info!("Opening result store at {}", path.display());
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::with_pool(pool).await
    }

    /// Single-connection in-memory store; every connection to `:memory:`
    /// would otherwise see its own empty database.
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::new().in_memory(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, AppError> {
        sqlx::query(CREATE_ANALYSES).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn save(
        &self,
        filename: &str,
        summary: &ColorSummary,
    ) -> Result<AnalysisRecord, AppError> {
        self.stage(filename, summary).await?.commit().await
    }

    /// Inserts the analysis inside an open transaction. Nothing is visible to
    /// `recent` until [`PendingAnalysis::commit`]; dropping it rolls back.
    pub async fn stage(
        &self,
        filename: &str,
        summary: &ColorSummary,
    ) -> Result<PendingAnalysis, AppError> {
        let record = AnalysisRecord {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            filename: filename.to_string(),
            mean_rgb: summary.mean_rgb,
            mean_hsv: summary.mean_hsv,
            hex: summary.hex.clone(),
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO analyses (ts, filename, mean_rgb, mean_hsv, hex) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.ts)
        .bind(&record.filename)
        .bind(serde_json::to_string(&record.mean_rgb)?)
        .bind(serde_json::to_string(&record.mean_hsv)?)
        .bind(&record.hex)
        .execute(&mut *tx)
        .await?;

        Ok(PendingAnalysis { tx, record })
    }

    /// Newest first.
    pub async fn recent(&self, limit: u32) -> Result<Vec<AnalysisRecord>, AppError> {
        let rows: Vec<AnalysisRow> = sqlx::query_as(
            "SELECT ts, filename, mean_rgb, mean_hsv, hex FROM analyses ORDER BY id DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AnalysisRecord::try_from).collect()
    }
}

/// An inserted but uncommitted analysis.
pub struct PendingAnalysis {
    tx: Transaction<'static, Sqlite>,
    record: AnalysisRecord,
}

impl PendingAnalysis {
    pub fn record(&self) -> &AnalysisRecord {
        &self.record
    }

    pub async fn commit(self) -> Result<AnalysisRecord, AppError> {
        self.tx.commit().await?;
        debug!("Stored analysis of {} ({})", self.record.filename, self.record.hex);
        Ok(self.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Rgb};

    fn summary_of(color: [u8; 3]) -> ColorSummary {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(2, 2, Rgb(color)));
        crate::color::summarize(&image).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_read_back() {
        let store = ResultStore::in_memory().await.unwrap();
        let summary = summary_of([255, 128, 0]);

        let saved = store.save("sunset.jpg", &summary).await.unwrap();
        assert_eq!(saved.hex, "#ff8000");
        assert_eq!(saved.ts.len(), "2026-01-01T00:00:00Z".len());
        assert!(saved.ts.ends_with('Z'));

        let recent = store.recent(50).await.unwrap();
        assert_eq!(recent, vec![saved]);
        assert_eq!(recent[0].mean_rgb, summary.mean_rgb);
        assert_eq!(recent[0].mean_hsv, summary.mean_hsv);
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let store = ResultStore::in_memory().await.unwrap();
        for (name, color) in [("a.png", [1, 1, 1]), ("b.png", [2, 2, 2]), ("c.png", [3, 3, 3])] {
            store.save(name, &summary_of(color)).await.unwrap();
        }

        let recent = store.recent(2).await.unwrap();
        let names: Vec<_> = recent.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, ["c.png", "b.png"]);
    }

    #[tokio::test]
    async fn test_staged_analysis_is_hidden_until_commit() {
        let store = ResultStore::in_memory().await.unwrap();

        let pending = store.stage("dropped.png", &summary_of([9, 9, 9])).await.unwrap();
        assert_eq!(pending.record().hex, "#090909");
        drop(pending);
        assert!(store.recent(10).await.unwrap().is_empty());

        let pending = store.stage("kept.png", &summary_of([9, 9, 9])).await.unwrap();
        let committed = pending.commit().await.unwrap();
        assert_eq!(store.recent(10).await.unwrap(), vec![committed]);
    }

    #[tokio::test]
    async fn test_empty_history() {
        let store = ResultStore::in_memory().await.unwrap();
        assert!(store.recent(10).await.unwrap().is_empty());
    }
}
