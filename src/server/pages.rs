use crate::storage::AnalysisRecord;

pub const INDEX_PAGE: &str = r#"<html>
  <head><title>Image Color Extractor</title></head>
  <body style="font-family: Arial; margin: 40px;">
    <h1>Image Color Extractor</h1>
    <p>Upload an image to see its average color (RGB, HSV, and Hex).</p>
    <form action="/analyze" method="post" enctype="multipart/form-data">
      <input type="file" name="file" accept="image/*" required />
      <button type="submit">Analyze</button>
    </form>
    <p style="margin-top:20px;">
      <a href="/history">View recent results (JSON)</a> |
      <a href="/download/csv">Download CSV log</a>
    </p>
  </body>
</html>
"#;

pub fn result_page(record: &AnalysisRecord) -> String {
    let filename = escape_html(&record.filename);
    let color = escape_html(&record.hex);
    let rgb = format!(
        "r: {}, g: {}, b: {}",
        record.mean_rgb.r, record.mean_rgb.g, record.mean_rgb.b
    );
    let hsv = format!(
        "h: {}°, s: {}, v: {}",
        record.mean_hsv.h_degrees, record.mean_hsv.s, record.mean_hsv.v
    );

    format!(
        r#"<html>
  <head><title>Analysis Result</title></head>
  <body style="font-family: Arial; margin: 40px;">
    <h2>Analysis Result for {filename}</h2>
    <div style="display:flex; align-items:center; gap:20px;">
      <div style="width:150px; height:150px; background-color:{color}; border:1px solid #000;"></div>
      <div>
        <p><strong>Average Color (Hex):</strong> {color}</p>
        <p><strong>Average RGB:</strong> {rgb}</p>
        <p><strong>Average HSV:</strong> {hsv}</p>
      </div>
    </div>
    <br>
    <a href="/">Upload another image</a> |
    <a href="/history">View history</a>
  </body>
</html>
"#
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{MeanHsv, MeanRgb};

    #[test]
    fn test_filename_is_escaped() {
        let record = AnalysisRecord {
            ts: "2026-10-19T08:30:00Z".to_string(),
            filename: "<script>alert('x')</script>.png".to_string(),
            mean_rgb: MeanRgb {
                r: 12.5,
                g: 0.0,
                b: 255.0,
            },
            mean_hsv: MeanHsv {
                h_degrees: 243.53,
                s: 1.0,
                v: 1.0,
            },
            hex: "#0c00ff".to_string(),
        };
        let page = result_page(&record);
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;.png"));
        assert!(page.contains("background-color:#0c00ff;"));
        assert!(page.contains("r: 12.5, g: 0, b: 255"));
        assert!(page.contains("h: 243.53°"));
    }
}
