//! YOLO TXT line codec.
//!
//! One text line per shape, coordinates normalized to `[0, 1]` by the image
//! width and height:
//!
//! - Box: `<class> <cx> <cy> <w> <h>` (center and size)
//! - Polygon: `<class> <x1> <y1> <x2> <y2> ... <xn> <yn>`
//!
//! Values are written with six decimal places and read with any float syntax.

use super::error::{DecodeError, DecodeErrorKind};
use crate::constants::COORD_PRECISION;
use crate::model::{Annotation, Geometry, ImageSize, Point, Rect};

/// Number of coordinates in a box line.
const BOX_FIELDS: usize = 4;

/// Decode one non-blank line into an annotation with absolute coordinates.
///
/// `line_number` is 1-based and only used for error reporting. The returned
/// annotation carries a freshly encoded line for `image_size`.
pub fn decode_line(
    line: &str,
    line_number: usize,
    image_size: ImageSize,
) -> Result<Annotation, DecodeError> {
    let mut fields = line.split_whitespace();
    let Some(class_token) = fields.next() else {
        return Err(DecodeError::new(
            line_number,
            DecodeErrorKind::TooFewFields { found: 0 },
        ));
    };
    let tail: Vec<&str> = fields.collect();

    if tail.len() < BOX_FIELDS {
        return Err(DecodeError::new(
            line_number,
            DecodeErrorKind::TooFewFields { found: tail.len() },
        ));
    }
    if tail.len() > BOX_FIELDS && tail.len() % 2 != 0 {
        return Err(DecodeError::new(
            line_number,
            DecodeErrorKind::OddPolygonTail { found: tail.len() },
        ));
    }

    let class_id = parse_class_id(class_token)
        .ok_or_else(|| DecodeError::new(line_number, invalid_class(class_token)))?;
    let coords = tail
        .iter()
        .map(|token| {
            parse_coordinate(token)
                .ok_or_else(|| DecodeError::new(line_number, invalid_number(token)))
        })
        .collect::<Result<Vec<f64>, DecodeError>>()?;

    let w = image_size.width_f64();
    let h = image_size.height_f64();

    let geometry = if coords.len() == BOX_FIELDS {
        let (cx, cy, bw, bh) = (coords[0], coords[1], coords[2], coords[3]);
        // Negative sizes are tolerated but stored with ordered corners
        Geometry::Box(
            Rect::new(
                cx * w - bw * w / 2.0,
                cy * h - bh * h / 2.0,
                cx * w + bw * w / 2.0,
                cy * h + bh * h / 2.0,
            )
            .normalized(),
        )
    } else {
        Geometry::Polygon(
            coords
                .chunks_exact(2)
                .map(|pair| Point::new(pair[0] * w, pair[1] * h))
                .collect(),
        )
    };

    Ok(Annotation::encoded(class_id, geometry, image_size))
}

/// Encode a shape as a normalized line.
///
/// Returns an empty string when the image size is degenerate; callers must
/// not persist in that case.
pub fn encode(class_id: u32, geometry: &Geometry, image_size: ImageSize) -> String {
    if image_size.is_degenerate() {
        return String::new();
    }
    let w = image_size.width_f64();
    let h = image_size.height_f64();
    let p = COORD_PRECISION;

    match geometry {
        Geometry::Box(rect) => {
            let r = rect.normalized();
            let bw = r.x2 - r.x1;
            let bh = r.y2 - r.y1;
            let cx = r.x1 + bw / 2.0;
            let cy = r.y1 + bh / 2.0;
            format!(
                "{} {:.p$} {:.p$} {:.p$} {:.p$}",
                class_id,
                cx / w,
                cy / h,
                bw / w,
                bh / h
            )
        }
        Geometry::Polygon(vertices) => {
            let mut line = class_id.to_string();
            for v in vertices {
                line.push_str(&format!(" {:.p$} {:.p$}", v.x / w, v.y / h));
            }
            line
        }
    }
}

/// Decode a whole label file. Blank lines are skipped; the first bad line aborts.
pub fn decode_document(text: &str, image_size: ImageSize) -> Result<Vec<Annotation>, DecodeError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| decode_line(line, idx + 1, image_size))
        .collect()
}

/// Join encoded lines into file content (no header, no trailing newline).
pub fn encode_document<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Class ids are integers; whole-valued floats such as `1.0` are accepted too.
fn parse_class_id(token: &str) -> Option<u32> {
    if let Ok(id) = token.parse::<u32>() {
        return Some(id);
    }
    let value: f64 = token.parse().ok()?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Some(value as u32)
    } else {
        None
    }
}

fn parse_coordinate(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn invalid_class(token: &str) -> DecodeErrorKind {
    DecodeErrorKind::InvalidClassId {
        token: token.to_string(),
    }
}

fn invalid_number(token: &str) -> DecodeErrorKind {
    DecodeErrorKind::InvalidNumber {
        token: token.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_box_line() {
        let ann = decode_line("0 0.5 0.5 0.2 0.3", 1, ImageSize::new(1000, 1000)).unwrap();
        assert_eq!(ann.class_id(), 0);
        match ann.geometry() {
            Geometry::Box(r) => {
                assert!((r.x1 - 400.0).abs() < 1e-9);
                assert!((r.y1 - 350.0).abs() < 1e-9);
                assert!((r.x2 - 600.0).abs() < 1e-9);
                assert!((r.y2 - 650.0).abs() < 1e-9);
            }
            _ => panic!("Expected box"),
        }
    }

    #[test]
    fn test_class_id_forms() {
        assert_eq!(parse_class_id("3"), Some(3));
        assert_eq!(parse_class_id("2.0"), Some(2));
        assert_eq!(parse_class_id("2.5"), None);
        assert_eq!(parse_class_id("-1"), None);
        assert_eq!(parse_class_id("car"), None);
    }

    #[test]
    fn test_encode_document_has_no_trailing_newline() {
        assert_eq!(encode_document(&["a", "b"]), "a\nb");
        assert_eq!(encode_document::<&str>(&[]), "");
    }
}
