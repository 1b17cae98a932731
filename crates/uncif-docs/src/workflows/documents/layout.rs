//! Deterministic placement of a [`DocumentPreview`] on a continuous sheet.
//!
//! Content flows top to bottom on one tall sheet whose height is a whole number of page
//! heights at most. Exporters cut the sheet into [`PageSlice`]s: the PDF writer emits one page
//! per slice, the rasterizer paints the sheet in one piece. Lines never straddle a slice
//! boundary, so every slice can be written independently.

use serde::Serialize;

use super::generator::DocumentPreview;

pub const MM_PER_PT: f32 = 25.4 / 72.0;
/// Advance width of a monospaced glyph relative to its point size.
pub const GLYPH_ADVANCE_EM: f32 = 0.6;
const LINE_SPACING: f32 = 1.45;
const RULE_THICKNESS_MM: f32 = 0.4;
const LEADER_WIDTH: usize = 44;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
}

impl PageGeometry {
    pub const A4_PORTRAIT: PageGeometry = PageGeometry {
        width_mm: 210.0,
        height_mm: 295.0,
        margin_mm: 15.0,
    };

    pub fn content_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4_PORTRAIT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    Masthead,
    Title,
    Heading,
    Body,
    Small,
}

impl TextStyle {
    /// Whole points so PDF operators can carry integer sizes.
    pub const fn size_pt(self) -> f32 {
        match self {
            Self::Masthead => 10.0,
            Self::Title => 18.0,
            Self::Heading => 12.0,
            Self::Body => 10.0,
            Self::Small => 8.0,
        }
    }

    pub const fn bold(self) -> bool {
        matches!(self, Self::Masthead | Self::Title | Self::Heading)
    }

    pub const fn accent(self) -> bool {
        matches!(self, Self::Masthead | Self::Title)
    }

    pub fn glyph_height_mm(self) -> f32 {
        self.size_pt() * MM_PER_PT
    }

    pub fn glyph_width_mm(self) -> f32 {
        GLYPH_ADVANCE_EM * self.glyph_height_mm()
    }

    pub fn line_height_mm(self) -> f32 {
        self.glyph_height_mm() * LINE_SPACING
    }
}

/// A single line of text positioned on the sheet; `y_mm` is the top of the line box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    pub text: String,
    pub style: TextStyle,
    pub x_mm: f32,
    pub y_mm: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedRule {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub thickness_mm: f32,
}

/// One page-height window onto the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSlice {
    pub index: usize,
    /// Vertical offset applied to sheet coordinates to land on this page: `-(index * P)`.
    pub offset_mm: f32,
    /// `P` for every slice but the last, which may be shorter.
    pub height_mm: f32,
}

impl PageSlice {
    pub fn top_mm(&self) -> f32 {
        -self.offset_mm
    }

    pub fn contains(&self, sheet_y_mm: f32) -> bool {
        sheet_y_mm >= self.top_mm() && sheet_y_mm < self.top_mm() + self.height_mm
    }
}

/// Cut a sheet of `total_height` into page slices of `page_height`.
///
/// Produces `ceil(total_height / page_height)` slices (at least one). Offsets step down by
/// exactly `page_height`.
pub fn paginate(total_height: f32, page_height: f32) -> Vec<PageSlice> {
    let mut slices = Vec::new();
    if page_height <= 0.0 {
        return slices;
    }

    let mut remaining = total_height;
    let mut offset = 0.0;
    loop {
        slices.push(PageSlice {
            index: slices.len(),
            offset_mm: offset,
            height_mm: remaining.clamp(0.0, page_height),
        });
        remaining -= page_height;
        offset -= page_height;
        if remaining <= 0.0 {
            break;
        }
    }
    slices
}

/// Greedy word wrap to `max_chars` columns; words longer than a line are hard-split.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split = word
                .char_indices()
                .nth(max_chars)
                .map(|(index, _)| index)
                .unwrap_or(word.len());
            lines.push(word[..split].to_string());
            word = &word[split..];
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Map text onto the printable ASCII range the base fonts and bitmap glyphs cover.
pub fn ascii_text(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '₹' => output.push_str("Rs."),
            '\u{2018}' | '\u{2019}' => output.push('\''),
            '\u{201C}' | '\u{201D}' => output.push('"'),
            '\u{2013}' | '\u{2014}' => output.push('-'),
            '\u{2026}' => output.push_str("..."),
            '\t' | '\n' | '\r' => output.push(' '),
            ch if ch.is_ascii() && !ch.is_ascii_control() => output.push(ch),
            _ => output.push('?'),
        }
    }
    output
}

/// Composed document, independent of output format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetLayout {
    pub geometry: PageGeometry,
    pub lines: Vec<PlacedLine>,
    pub rules: Vec<PlacedRule>,
    pub content_height_mm: f32,
}

impl SheetLayout {
    pub fn compose(preview: &DocumentPreview, geometry: PageGeometry) -> Self {
        let mut writer = SheetWriter::new(geometry);

        writer.text(&preview.organization, TextStyle::Masthead);
        writer.rule();
        writer.gap(4.0);
        writer.paragraph(preview.title, TextStyle::Title);
        writer.text(
            &format!(
                "Ref: {}    Date: {}",
                preview.reference,
                preview.issued_on.format("%d %b %Y")
            ),
            TextStyle::Small,
        );
        writer.gap(6.0);

        for paragraph in &preview.paragraphs {
            writer.paragraph(paragraph, TextStyle::Body);
            writer.gap(3.0);
        }

        if !preview.fields.is_empty() {
            writer.gap(2.0);
            writer.text("Details", TextStyle::Heading);
            writer.rule();
            writer.gap(1.5);
            for field in &preview.fields {
                writer.paragraph(&format!("{}: {}", field.label, field.value), TextStyle::Body);
            }
        }

        if let Some(quote) = &preview.fee_quote {
            writer.gap(5.0);
            writer.text("Fee Summary", TextStyle::Heading);
            writer.rule();
            writer.gap(1.5);
            let rows = [
                ("Editing fee", quote.editing_fee.ascii()),
                ("Documentation fee", quote.documentation_fee.ascii()),
                ("Applicant pays (share)", quote.applicant_total.ascii()),
                ("Covered by UNCIF", quote.subsidized().ascii()),
                ("Application fee", quote.application_fee.ascii()),
            ];
            for (label, amount) in rows {
                writer.text(&leader_row(label, &amount), TextStyle::Body);
            }
            writer.text(
                &format!(
                    "{} pages | {} | {}",
                    quote.page_count,
                    quote.category.label(),
                    quote.project_type.label()
                ),
                TextStyle::Small,
            );
        }

        writer.gap(8.0);
        if !preview.closing.is_empty() {
            writer.paragraph(&preview.closing, TextStyle::Body);
        }

        writer.finish()
    }

    pub fn slices(&self) -> Vec<PageSlice> {
        paginate(self.content_height_mm, self.geometry.height_mm)
    }

    /// Lines on `slice` with their page-local top coordinate.
    pub fn lines_on<'a>(
        &'a self,
        slice: &'a PageSlice,
    ) -> impl Iterator<Item = (&'a PlacedLine, f32)> + 'a {
        self.lines
            .iter()
            .filter(move |line| slice.contains(line.y_mm))
            .map(move |line| (line, line.y_mm + slice.offset_mm))
    }

    pub fn rules_on<'a>(
        &'a self,
        slice: &'a PageSlice,
    ) -> impl Iterator<Item = (&'a PlacedRule, f32)> + 'a {
        self.rules
            .iter()
            .filter(move |rule| slice.contains(rule.y_mm))
            .map(move |rule| (rule, rule.y_mm + slice.offset_mm))
    }
}

fn leader_row(label: &str, amount: &str) -> String {
    let dots = LEADER_WIDTH.saturating_sub(label.len() + amount.len() + 2).max(2);
    format!("{label} {} {amount}", ".".repeat(dots))
}

/// Cursor that places boxes on the sheet and moves past page boundaries.
struct SheetWriter {
    geometry: PageGeometry,
    cursor_mm: f32,
    last_bottom_mm: f32,
    lines: Vec<PlacedLine>,
    rules: Vec<PlacedRule>,
}

impl SheetWriter {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            cursor_mm: geometry.margin_mm,
            last_bottom_mm: geometry.margin_mm,
            lines: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Reserve `height` and return the box top, starting a new page when the box would
    /// cross into the bottom margin.
    fn place(&mut self, height: f32) -> f32 {
        let page = self.geometry.height_mm;
        let margin = self.geometry.margin_mm;

        let index = (self.cursor_mm / page).floor();
        let page_top = index * page;
        if self.cursor_mm < page_top + margin {
            self.cursor_mm = page_top + margin;
        }
        if self.cursor_mm + height > page_top + page - margin {
            self.cursor_mm = page_top + page + margin;
        }

        let top = self.cursor_mm;
        self.cursor_mm += height;
        self.last_bottom_mm = self.cursor_mm;
        top
    }

    fn gap(&mut self, height: f32) {
        self.cursor_mm += height;
    }

    fn text(&mut self, text: &str, style: TextStyle) {
        let height = style.line_height_mm();
        let y_mm = self.place(height);
        self.lines.push(PlacedLine {
            text: ascii_text(text),
            style,
            x_mm: self.geometry.margin_mm,
            y_mm,
        });
    }

    fn paragraph(&mut self, text: &str, style: TextStyle) {
        let columns = (self.geometry.content_width_mm() / style.glyph_width_mm()).floor() as usize;
        for line in wrap(&ascii_text(text), columns) {
            self.text(&line, style);
        }
    }

    fn rule(&mut self) {
        let y_mm = self.place(RULE_THICKNESS_MM + 1.0);
        self.rules.push(PlacedRule {
            x_mm: self.geometry.margin_mm,
            y_mm,
            width_mm: self.geometry.content_width_mm(),
            thickness_mm: RULE_THICKNESS_MM,
        });
    }

    fn finish(self) -> SheetLayout {
        SheetLayout {
            geometry: self.geometry,
            lines: self.lines,
            rules: self.rules,
            content_height_mm: self.last_bottom_mm + self.geometry.margin_mm,
        }
    }
}
