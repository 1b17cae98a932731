use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use super::layout::{ascii_text, PageSlice, SheetLayout, TextStyle};

pub const PT_PER_MM: f32 = 72.0 / 25.4;
/// Baseline position inside a glyph box, as a fraction of the glyph height.
const BASELINE_RATIO: f32 = 0.8;

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("failed to encode page content: {0}")]
    Content(String),
    #[error("failed to serialize document: {0}")]
    Write(String),
}

fn pt(mm: f32) -> i64 {
    (mm * PT_PER_MM).round() as i64
}

/// Write one PDF page per sheet slice using the Courier base fonts.
pub fn write_pdf(layout: &SheetLayout, title: &str) -> Result<Vec<u8>, PdfError> {
    let width_pt = pt(layout.geometry.width_mm);
    let height_pt = pt(layout.geometry.height_mm);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for slice in layout.slices() {
        let content = Content {
            operations: page_operations(layout, &slice, height_pt),
        };
        let encoded = content
            .encode()
            .map_err(|err| PdfError::Content(err.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(width_pt),
            Object::Integer(height_pt),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(ascii_text(title)),
        "Producer" => Object::string_literal("uncif-docs"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|err| PdfError::Write(err.to_string()))?;
    Ok(bytes)
}

fn page_operations(layout: &SheetLayout, slice: &PageSlice, height_pt: i64) -> Vec<Operation> {
    let mut operations = Vec::new();

    for (rule, local_y) in layout.rules_on(slice) {
        let thickness = pt(rule.thickness_mm).max(1);
        operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "rg",
                vec![Object::Real(0.59), Object::Real(0.61), Object::Real(0.64)],
            ),
            Operation::new(
                "re",
                vec![
                    Object::Integer(pt(rule.x_mm)),
                    Object::Integer(height_pt - pt(local_y) - thickness),
                    Object::Integer(pt(rule.width_mm)),
                    Object::Integer(thickness),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    for (line, local_y) in layout.lines_on(slice) {
        if line.text.trim().is_empty() {
            continue;
        }
        let style = line.style;
        let leading = (style.line_height_mm() - style.glyph_height_mm()) / 2.0;
        let baseline = local_y + leading + style.glyph_height_mm() * BASELINE_RATIO;
        let font = if style.bold() { "F2" } else { "F1" };

        operations.push(Operation::new("BT", vec![]));
        operations.push(fill_color(style));
        operations.push(Operation::new(
            "Tf",
            vec![font.into(), Object::Integer(style.size_pt() as i64)],
        ));
        operations.push(Operation::new(
            "Td",
            vec![
                Object::Integer(pt(line.x_mm)),
                Object::Integer(height_pt - pt(baseline)),
            ],
        ));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(line.text.as_str())],
        ));
        operations.push(Operation::new("ET", vec![]));
    }

    operations
}

fn fill_color(style: TextStyle) -> Operation {
    let components = if style.accent() {
        vec![Object::Real(0.08), Object::Real(0.27), Object::Real(0.55)]
    } else {
        vec![Object::Real(0.13), Object::Real(0.15), Object::Real(0.16)]
    };
    Operation::new("rg", components)
}
