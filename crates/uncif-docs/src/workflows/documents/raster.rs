use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageResult, Rgb, RgbImage};

use super::layout::{PlacedLine, SheetLayout};
use crate::workflows::validation::ValidationError;

/// Reference resolution before the upscaling factor is applied.
pub const BASE_DPI: f32 = 96.0;

const PAPER: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([33, 37, 41]);
const ACCENT: Rgb<u8> = Rgb([20, 70, 140]);
const RULE: Rgb<u8> = Rgb([150, 156, 162]);

/// Longest edge both the PNG and JPEG encoders accept.
pub const MAX_EDGE_PX: u32 = 65_535;
/// Upper bound on one bitmap, about 144 MB of RGB.
pub const MAX_PIXELS: u64 = 48_000_000;

pub fn pixels_per_mm(scale: u32) -> f32 {
    BASE_DPI / 25.4 * scale.max(1) as f32
}

/// Bitmap dimensions `rasterize` would allocate for this sheet.
pub fn canvas_size(layout: &SheetLayout, scale: u32) -> (u32, u32) {
    let ppm = pixels_per_mm(scale);
    let width = (layout.geometry.width_mm * ppm).round().max(1.0) as u32;
    let height = (layout.content_height_mm * ppm).round().max(1.0) as u32;
    (width, height)
}

/// Reject sheets whose bitmap would exceed the encoder or memory limits.
pub fn check_canvas(layout: &SheetLayout, scale: u32) -> Result<(), ValidationError> {
    let (width, height) = canvas_size(layout, scale);
    let pixels = u64::from(width) * u64::from(height);
    if width > MAX_EDGE_PX || height > MAX_EDGE_PX || pixels > MAX_PIXELS {
        return Err(ValidationError::ImageTooLarge { width, height });
    }
    Ok(())
}

/// Paint the whole sheet into one bitmap at `scale` × 96 dpi. Callers check the size first.
pub fn rasterize(layout: &SheetLayout, scale: u32) -> RgbImage {
    let ppm = pixels_per_mm(scale);
    let (width, height) = canvas_size(layout, scale);
    let mut canvas = RgbImage::from_pixel(width, height, PAPER);

    for rule in &layout.rules {
        let x0 = (rule.x_mm * ppm).round() as i64;
        let y0 = (rule.y_mm * ppm).round() as i64;
        let w = (rule.width_mm * ppm).round() as i64;
        let h = (rule.thickness_mm * ppm).round().max(1.0) as i64;
        fill_rect(&mut canvas, x0, y0, w, h, RULE);
    }

    for line in &layout.lines {
        draw_line(&mut canvas, line, ppm);
    }

    canvas
}

fn draw_line(canvas: &mut RgbImage, line: &PlacedLine, ppm: f32) {
    let style = line.style;
    let glyph_w = (style.glyph_width_mm() * ppm).max(1.0);
    let glyph_h = (style.glyph_height_mm() * ppm).max(1.0);
    let leading = (style.line_height_mm() * ppm - glyph_h) / 2.0;
    let color = if style.accent() { ACCENT } else { INK };

    let top = (line.y_mm * ppm + leading).round() as i64;
    let mut left = line.x_mm * ppm;
    for ch in line.text.chars() {
        if let Some(glyph) = BASIC_FONTS.get(ch) {
            let x = left.round() as i64;
            let w = glyph_w.round() as i64;
            let h = glyph_h.round() as i64;
            draw_glyph(canvas, &glyph, x, top, w, h, color);
            if style.bold() {
                draw_glyph(canvas, &glyph, x + 1, top, w, h, color);
            }
        }
        left += glyph_w;
    }
}

/// Nearest-neighbour scale of an 8×8 glyph into a `w`×`h` box. Bit 0 is the leftmost pixel.
fn draw_glyph(
    canvas: &mut RgbImage,
    glyph: &[u8; 8],
    x0: i64,
    y0: i64,
    w: i64,
    h: i64,
    color: Rgb<u8>,
) {
    if w <= 0 || h <= 0 {
        return;
    }
    for py in 0..h {
        let row = glyph[((py * 8) / h) as usize];
        if row == 0 {
            continue;
        }
        for px in 0..w {
            let bit = (px * 8) / w;
            if row & (1 << bit) != 0 {
                put(canvas, x0 + px, y0 + py, color);
            }
        }
    }
}

fn fill_rect(canvas: &mut RgbImage, x0: i64, y0: i64, w: i64, h: i64, color: Rgb<u8>) {
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            put(canvas, x, y, color);
        }
    }
}

fn put(canvas: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
        canvas.put_pixel(x as u32, y as u32, color);
    }
}

pub fn encode_png(image: &RgbImage) -> ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(bytes)
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> ImageResult<Vec<u8>> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::documents::layout::{PageGeometry, TextStyle};

    fn single_line_layout(text: &str) -> SheetLayout {
        SheetLayout {
            geometry: PageGeometry::A4_PORTRAIT,
            lines: vec![PlacedLine {
                text: text.to_string(),
                style: TextStyle::Body,
                x_mm: 15.0,
                y_mm: 15.0,
            }],
            rules: Vec::new(),
            content_height_mm: 40.0,
        }
    }

    #[test]
    fn canvas_matches_sheet_geometry_at_scale() {
        let layout = single_line_layout("UNCIF");
        let bitmap = rasterize(&layout, 2);
        assert_eq!(bitmap.width(), (210.0 * pixels_per_mm(2)).round() as u32);
        assert_eq!(bitmap.height(), (40.0 * pixels_per_mm(2)).round() as u32);
    }

    #[test]
    fn oversized_canvas_is_rejected_without_allocating() {
        let mut layout = single_line_layout("UNCIF");
        assert!(check_canvas(&layout, 2).is_ok());

        // About 30 A4 pages tall at 2x exceeds the encoders' edge limit.
        layout.content_height_mm = 295.0 * 30.0;
        match check_canvas(&layout, 2) {
            Err(ValidationError::ImageTooLarge { width, height }) => {
                assert_eq!(width, 1587);
                assert!(height > MAX_EDGE_PX);
            }
            other => panic!("expected size error, got {other:?}"),
        }

        // Within the edge limit but over the pixel budget.
        layout.content_height_mm = 295.0;
        assert!(matches!(
            check_canvas(&layout, 12),
            Err(ValidationError::ImageTooLarge { .. })
        ));
    }

    #[test]
    fn text_leaves_ink_and_blank_sheet_does_not() {
        let inked = rasterize(&single_line_layout("Fee"), 1);
        let blank = rasterize(&single_line_layout("   "), 1);
        assert!(inked.pixels().any(|pixel| *pixel == INK));
        assert!(blank.pixels().all(|pixel| *pixel == PAPER));
    }

    #[test]
    fn encoders_emit_format_signatures() {
        let bitmap = rasterize(&single_line_layout("Rs. 980"), 1);
        let png = encode_png(&bitmap).expect("png encodes");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let jpeg = encode_jpeg(&bitmap, 90).expect("jpeg encodes");
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&png).expect("png decodes");
        assert_eq!(decoded.width(), bitmap.width());
    }
}
