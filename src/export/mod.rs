use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use fs_err as fs;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::cli::ExportFormat;
use crate::store::PlanStore;
use crate::wire::{PlanSections, Section};

pub const DOCUMENT_HEADER: &str = "Your TravelBuddy Itinerary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBlock {
    pub title: String,
    pub body: String,
}

/// The content handed to an exporter: one titled block per plan section, in
/// the fixed summary, budget, itinerary, accommodation, transport order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub blocks: Vec<ExportBlock>,
}

impl ExportDocument {
    pub fn from_sections(sections: &PlanSections, destination: &str) -> Self {
        let blocks = Section::ALL
            .iter()
            .map(|&s| ExportBlock { title: title(s, destination), body: sections.get(s).trim().to_string() })
            .collect();
        Self { blocks }
    }

    /// Uses the active itinerary, so replanned days are what gets exported.
    pub fn from_plan(store: &PlanStore, destination: &str) -> Self {
        let mut sections = store.sections().clone();
        sections.itinerary = store.active_itinerary();
        Self::from_sections(&sections, destination)
    }
}

fn title(section: Section, destination: &str) -> String {
    match section {
        Section::Summary => format!("Trip to {}", destination.trim()),
        Section::Budget => "Budget Allocation".into(),
        Section::Itinerary => "Day-by-Day Itinerary".into(),
        Section::Accommodation => "Accommodation Suggestions".into(),
        Section::Transport => "Transportation Tips".into(),
    }
}

/// Renders an [`ExportDocument`] into a file body.
pub trait Exporter {
    fn export(&self, doc: &ExportDocument) -> Result<Bytes>;
    fn extension(&self) -> &'static str;
}

pub fn make_exporter(format: ExportFormat, page_lines: usize, page_width: usize) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Pdf => Box::new(PdfExporter::new(page_lines, page_width)),
        ExportFormat::Text => Box::new(TextPageExporter::new(page_lines, page_width)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    text: String,
    heading: bool,
}

/// Word-wrapped, Latin-1-safe body lines cut into pages. Header and footer are
/// left to the renderer.
#[derive(Debug, Clone, Copy)]
struct PageLayout {
    page_lines: usize,
    page_width: usize,
}

impl PageLayout {
    fn new(page_lines: usize, page_width: usize) -> Self {
        Self { page_lines: page_lines.max(1), page_width: page_width.max(20) }
    }

    fn pages(&self, doc: &ExportDocument) -> Vec<Vec<Line>> {
        let mut lines = Vec::new();
        for block in &doc.blocks {
            let title = latin1_safe(&block.title);
            let rule = "-".repeat(title.chars().count().min(self.page_width));
            lines.push(Line { text: title, heading: true });
            lines.push(Line { text: rule, heading: false });
            for raw in block.body.lines() {
                lines.extend(
                    wrap(&latin1_safe(raw), self.page_width)
                        .into_iter()
                        .map(|text| Line { text, heading: false }),
                );
            }
            lines.push(Line { text: String::new(), heading: false });
        }
        lines.chunks(self.page_lines).map(<[Line]>::to_vec).collect()
    }
}

/// Paginated plain-text renderer with a header and a `Page N` footer on every
/// page, pages separated by form feeds. Output is Latin-1; anything outside it
/// becomes `?`.
#[derive(Debug, Clone)]
pub struct TextPageExporter {
    layout: PageLayout,
}

impl Default for TextPageExporter {
    fn default() -> Self {
        Self::new(48, 90)
    }
}

impl TextPageExporter {
    pub fn new(page_lines: usize, page_width: usize) -> Self {
        Self { layout: PageLayout::new(page_lines, page_width) }
    }

    fn centered(&self, s: &str) -> String {
        let pad = self.layout.page_width.saturating_sub(s.chars().count()) / 2;
        format!("{}{}", " ".repeat(pad), s)
    }
}

impl Exporter for TextPageExporter {
    fn export(&self, doc: &ExportDocument) -> Result<Bytes> {
        let mut pages: Vec<String> = Vec::new();
        for (i, lines) in self.layout.pages(doc).iter().enumerate() {
            let mut page = String::new();
            page.push_str(&self.centered(DOCUMENT_HEADER));
            page.push_str("\n\n");
            for l in lines {
                page.push_str(&l.text);
                page.push('\n');
            }
            page.push('\n');
            page.push_str(&self.centered(&format!("Page {}", i + 1)));
            page.push('\n');
            pages.push(page);
        }
        let bytes: Vec<u8> = pages.join("\u{000C}").chars().map(latin1_byte).collect();
        Ok(Bytes::from(bytes))
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}

// A4 portrait, millimetres.
const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 15.0;
const LINE_H: f32 = 5.0;

/// A4 PDF in the built-in Helvetica faces, same pages as [`TextPageExporter`].
#[derive(Debug, Clone)]
pub struct PdfExporter {
    layout: PageLayout,
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::new(48, 90)
    }
}

impl PdfExporter {
    pub fn new(page_lines: usize, page_width: usize) -> Self {
        Self { layout: PageLayout::new(page_lines, page_width) }
    }
}

fn builtin(doc: &printpdf::PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef> {
    doc.add_builtin_font(font).map_err(|e| anyhow!("loading pdf font: {e:?}"))
}

impl Exporter for PdfExporter {
    fn export(&self, doc: &ExportDocument) -> Result<Bytes> {
        let pages = self.layout.pages(doc);
        let (pdf, first_page, first_layer) = PdfDocument::new(DOCUMENT_HEADER, Mm(PAGE_W), Mm(PAGE_H), "text");
        let regular = builtin(&pdf, BuiltinFont::Helvetica)?;
        let bold = builtin(&pdf, BuiltinFont::HelveticaBold)?;

        for (i, lines) in pages.iter().enumerate() {
            let (page, layer) = if i == 0 {
                (first_page, first_layer)
            } else {
                pdf.add_page(Mm(PAGE_W), Mm(PAGE_H), "text")
            };
            let layer = pdf.get_page(page).get_layer(layer);

            layer.use_text(DOCUMENT_HEADER, 14.0, Mm(MARGIN), Mm(PAGE_H - MARGIN), &bold);
            let mut y = PAGE_H - MARGIN - 3.0 * LINE_H;
            for l in lines {
                let font = if l.heading { &bold } else { &regular };
                layer.use_text(l.text.as_str(), 10.0, Mm(MARGIN), Mm(y), font);
                y -= LINE_H;
            }
            layer.use_text(format!("Page {}", i + 1), 9.0, Mm(PAGE_W / 2.0 - 6.0), Mm(MARGIN / 2.0), &regular);
        }

        let bytes = pdf.save_to_bytes().map_err(|e| anyhow!("writing pdf: {e:?}"))?;
        Ok(Bytes::from(bytes))
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }
}

/// Word-wrap one line; words longer than `width` are split.
fn wrap(line: &str, width: usize) -> Vec<String> {
    if line.trim().is_empty() {
        return vec![String::new()];
    }
    let mut out = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            out.push(word.into_iter().collect());
            word = rest;
        }
        let len = current.chars().count();
        if len > 0 && len + 1 + word.len() > width {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn latin1_byte(c: char) -> u8 {
    u8::try_from(u32::from(c)).unwrap_or(b'?')
}

fn latin1_safe(s: &str) -> String {
    s.chars().map(|c| char::from(latin1_byte(c))).collect()
}

pub fn file_name(destination: &str, exporter: &dyn Exporter) -> String {
    let dest: String = destination
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("TravelBuddy_Itinerary_{}.{}", dest, exporter.extension())
}

/// Write via a temp file in the target directory, then rename over `path`.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir).with_context(|| format!("creating temp file in {}", dir.display()))?;
    tmp.write_all(data)?;
    tmp.persist(path).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::DayChunk;

    fn sections() -> PlanSections {
        PlanSections {
            summary: "\n  A calm week in Goa.  \n".into(),
            budget: "| Stay | 2000 |".into(),
            itinerary: "**Day 1** beach\n\n**Day 2** fort".into(),
            accommodation: "Taj".into(),
            transport: "Scooter".into(),
        }
    }

    #[test]
    fn five_blocks_in_fixed_order() {
        let doc = ExportDocument::from_sections(&sections(), "Goa");
        let titles: Vec<&str> = doc.blocks.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Trip to Goa", "Budget Allocation", "Day-by-Day Itinerary", "Accommodation Suggestions", "Transportation Tips"]
        );
        assert_eq!(doc.blocks[0].body, "A calm week in Goa.");
    }

    #[test]
    fn plan_export_uses_replanned_days() {
        let store = PlanStore::new(sections());
        store.set_override(DayChunk { day: 2, text: "**Day 2** museum".into() });
        let doc = ExportDocument::from_plan(&store, "Goa");
        assert_eq!(doc.blocks[2].body, "**Day 1** beach\n\n**Day 2** museum");
    }

    #[test]
    fn plan_export_keeps_preamble_and_headerless_text() {
        let mut s = sections();
        s.itinerary = "Arrive at **Goa Airport** (day: 1, lat: 15.3800, lon: 73.8314)\n**Day 1**\nBeach.".into();
        let doc = ExportDocument::from_plan(&PlanStore::new(s.clone()), "Goa");
        assert!(doc.blocks[2].body.starts_with("Arrive at **Goa Airport**"));
        assert!(doc.blocks[2].body.ends_with("**Day 1**\nBeach."));

        s.itinerary = "### Day 1\nSwim at **Baga Beach**.".into();
        let doc = ExportDocument::from_plan(&PlanStore::new(s), "Goa");
        assert_eq!(doc.blocks[2].body, "### Day 1\nSwim at **Baga Beach**.");
    }

    #[test]
    fn paginates_with_header_and_footer() {
        let doc = ExportDocument::from_sections(&sections(), "Goa");
        let out = TextPageExporter::new(5, 40).export(&doc).unwrap();
        let text = String::from_utf8(out.to_vec()).unwrap();
        let pages: Vec<&str> = text.split('\u{000C}').collect();
        assert!(pages.len() > 1);
        for (i, p) in pages.iter().enumerate() {
            assert!(p.contains(DOCUMENT_HEADER));
            assert!(p.trim_end().ends_with(&format!("Page {}", i + 1)));
        }
        let pos = |s: &str| text.find(s).unwrap();
        assert!(pos("Trip to Goa") < pos("Budget Allocation"));
        assert!(pos("Accommodation Suggestions") < pos("Transportation Tips"));
    }

    #[test]
    fn unrepresentable_text_is_substituted() {
        let mut s = sections();
        s.summary = "Namaste नमस्ते café".into();
        let doc = ExportDocument::from_sections(&s, "Goa");
        let out = TextPageExporter::default().export(&doc).unwrap();
        let line = out
            .split(|b| *b == b'\n')
            .find(|l| l.starts_with(b"Namaste"))
            .unwrap();
        assert_eq!(line, b"Namaste ?????? caf\xE9");
    }

    #[test]
    fn layout_is_shared_and_latin1_safe() {
        let mut s = sections();
        s.summary = "दिन 1".into();
        let doc = ExportDocument::from_sections(&s, "Goa");
        let pages = PageLayout::new(4, 40).pages(&doc);
        assert!(pages.iter().all(|p| p.len() <= 4));
        assert_eq!(pages[0][0], Line { text: "Trip to Goa".into(), heading: true });
        assert_eq!(pages[0][2].text, "??? 1");
    }

    #[test]
    fn pdf_export_is_a_pdf() {
        let doc = ExportDocument::from_sections(&sections(), "Goa");
        let exporter = PdfExporter::new(5, 40);
        let out = exporter.export(&doc).unwrap();
        assert!(out.starts_with(b"%PDF-"));
        assert_eq!(file_name("Goa", &exporter), "TravelBuddy_Itinerary_Goa.pdf");
    }

    #[test]
    fn pdf_is_the_default_format() {
        let exporter = make_exporter(ExportFormat::default(), 48, 90);
        assert_eq!(exporter.extension(), "pdf");
        assert_eq!(make_exporter(ExportFormat::Text, 48, 90).extension(), "txt");
    }

    #[test]
    fn wraps_long_lines() {
        assert_eq!(wrap("aaa bbb ccc", 7), vec!["aaa bbb", "ccc"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("   ", 4), vec![""]);
    }

    #[test]
    fn atomic_write_and_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(file_name("Goa", &TextPageExporter::default()));
        write_atomic(&path, b"hello").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello");
        assert!(path.ends_with("TravelBuddy_Itinerary_Goa.txt"));
    }
}
