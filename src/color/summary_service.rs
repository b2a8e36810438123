use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;
use tracing::debug;
use uuid::Uuid;

use super::{decode::summarize_bytes, summary::ColorSummary};
use crate::error::AppError;

/// One uploaded file waiting to be summarized.
#[derive(Debug, Clone)]
pub struct Upload {
    pub id: Uuid,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename: filename.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub upload_id: Uuid,
    pub filename: String,
    pub summary: ColorSummary,
}

/// Decodes and summarizes uploads on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct SummaryService;

impl SummaryService {
    pub fn new() -> Self {
        Self
    }
}

impl Service<Upload> for SummaryService {
    type Response = Analysis;
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), AppError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, upload: Upload) -> Self::Future {
        Box::pin(async move {
            let Upload {
                id,
                filename,
                bytes,
            } = upload;
            debug!("Summarizing upload {:?} ({} bytes)", id, bytes.len());
            let summary = tokio::task::spawn_blocking(move || summarize_bytes(&bytes)).await??;
            Ok(Analysis {
                upload_id: id,
                filename,
                summary,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::decode::encode_png;
    use crate::error::SummarizeError;
    use image::{DynamicImage, ImageBuffer, Rgb};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_summary_service() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(10, 10, Rgb([0, 0, 255])));
        let upload = Upload::new("blue.png", encode_png(&image));
        let id = upload.id;

        let analysis = SummaryService::new().oneshot(upload).await.unwrap();
        assert_eq!(analysis.upload_id, id);
        assert_eq!(analysis.filename, "blue.png");
        assert_eq!(analysis.summary.hex, "#0000ff");
        assert_eq!(analysis.summary.mean_hsv.h_degrees, 240.0);
    }

    #[tokio::test]
    async fn test_summary_service_rejects_garbage() {
        let upload = Upload::new("notes.txt", b"hello".to_vec());
        let result = SummaryService::new().oneshot(upload).await;
        assert!(matches!(
            result,
            Err(AppError::Summarize(SummarizeError::Decode(_)))
        ));
    }
}
