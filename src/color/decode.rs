use image::DynamicImage;

use super::summary::{ColorSummary, summarize};
use crate::error::SummarizeError;

/// Decodes an uploaded file. The format is guessed from the content, not the
/// filename; multi-frame formats yield their first frame.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, SummarizeError> {
    Ok(image::load_from_memory(bytes)?)
}

pub fn summarize_bytes(bytes: &[u8]) -> Result<ColorSummary, SummarizeError> {
    let image = decode(bytes)?;
    summarize(&image)
}

#[cfg(test)]
pub(crate) fn encode_png(image: &DynamicImage) -> Vec<u8> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, image::ImageFormat::Png)
        .expect("png encoding");
    buffer.into_inner()
}
