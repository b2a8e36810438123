use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

use super::hsv::rgb_to_hsv;
use crate::error::SummarizeError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanRgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanHsv {
    pub h_degrees: f64,
    pub s: f64,
    pub v: f64,
}

/// Average color of one image, in RGB, HSV and hex form.
///
/// All three views come from the same mean. `hex` truncates the unrounded
/// channel means, so it can sit one step below a rounded `mean_rgb` channel
/// (127.5 shows as `127.5` but encodes as `7f`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSummary {
    pub mean_rgb: MeanRgb,
    pub mean_hsv: MeanHsv,
    pub hex: String,
}

/// Computes the mean color of `image`.
///
/// Fails with [`SummarizeError::InvalidImage`] when the image has no pixels.
pub fn summarize(image: &DynamicImage) -> Result<ColorSummary, SummarizeError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(SummarizeError::InvalidImage);
    }

    let converted;
    let rgb: &RgbImage = match image.as_rgb8() {
        Some(rgb) => rgb,
        None => {
            converted = image.to_rgb8();
            &converted
        }
    };

    let [r, g, b] = mean_channels(rgb);
    let (h, s, v) = rgb_to_hsv(r / 255.0, g / 255.0, b / 255.0);

    let mut h_degrees = round_to(h * 360.0, 2);
    if h_degrees >= 360.0 {
        h_degrees = 0.0;
    }

    Ok(ColorSummary {
        mean_rgb: MeanRgb {
            r: round_to(r, 2),
            g: round_to(g, 2),
            b: round_to(b, 2),
        },
        mean_hsv: MeanHsv {
            h_degrees,
            s: round_to(s, 3),
            v: round_to(v, 3),
        },
        hex: hex_code(r, g, b),
    })
}

fn mean_channels(image: &RgbImage) -> [f64; 3] {
    let mut sums = [0f64; 3];
    for pixel in image.pixels() {
        sums[0] += pixel[0] as f64;
        sums[1] += pixel[1] as f64;
        sums[2] += pixel[2] as f64;
    }

    let count = image.width() as f64 * image.height() as f64;
    sums.map(|sum| sum / count)
}

/// Rounds the exact binary value to `decimals` places.
///
/// A true decimal tie needs `value * 2^(decimals + 1)` to be an integer; those
/// go half-to-even (0.125 -> 0.12). Anything else is rounded from its exact
/// expansion, so 0.025 (stored slightly above) becomes 0.03.
fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    if (value * 2f64.powi(decimals + 1)).fract() == 0.0 {
        // exact product: value has at most decimals + 1 binary fraction digits
        return (value * scale).round_ties_even() / scale;
    }
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

fn hex_code(r: f64, g: f64, b: f64) -> String {
    // `as u8` truncates toward zero; means are never negative
    format!("#{:02x}{:02x}{:02x}", r as u8, g as u8, b as u8)
}
