// fitagent — Document export (responses -> PDF, plain text fallback)

pub mod pdf;

use crate::config::ExportConfig;
use pdf::{Align, Font, PdfWriter};
use thiserror::Error;

/// Section headers are cut to this many characters.
pub const HEADER_MAX_CHARS: usize = 40;
/// Paragraphs are fed to the renderer in slices of this many characters.
pub const CHUNK_CHARS: usize = 80;
/// Written in place of a chunk the renderer refused.
pub const PLACEHOLDER: &str = "[...]";

const MARGIN_MM: f64 = 20.0;
const BODY_LINE_MM: f64 = 5.0;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("character {0:?} cannot be encoded")]
    Unencodable(char),
    #[error("document exceeds the {0}-page limit")]
    PageLimit(usize),
    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    pub fn mime(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::PlainText => "text/plain; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::PlainText => "txt",
        }
    }
}

/// Rendered bytes plus what they are.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub kind: DocumentKind,
    file_name: String,
}

impl ExportedDocument {
    fn new(bytes: Vec<u8>, kind: DocumentKind, file_stem: &str) -> Self {
        Self {
            bytes,
            kind,
            file_name: format!("{}.{}", file_stem, kind.extension()),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> &'static str {
        self.kind.mime()
    }
}

#[derive(Debug, Clone)]
pub struct DocumentExporter {
    file_stem: String,
    max_pages: usize,
}

impl Default for DocumentExporter {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

impl DocumentExporter {
    pub fn new(file_stem: impl Into<String>, max_pages: usize) -> Self {
        Self {
            file_stem: file_stem.into(),
            max_pages,
        }
    }

    pub fn from_config(cfg: &ExportConfig) -> Self {
        Self::new(cfg.file_stem.clone(), cfg.max_pages)
    }

    /// Render `sections` under `title`. Never fails: if the PDF cannot be
    /// produced the same content comes back as plain text.
    pub fn render(&self, title: &str, sections: &[(String, String)]) -> ExportedDocument {
        match self.try_render_rich(title, sections) {
            Ok(bytes) => {
                tracing::info!(
                    sections = sections.len(),
                    bytes = bytes.len(),
                    "Rendered PDF export"
                );
                ExportedDocument::new(bytes, DocumentKind::Pdf, &self.file_stem)
            }
            Err(e) => {
                tracing::warn!(error = %e, "PDF rendering failed, exporting plain text");
                ExportedDocument::new(
                    render_plain(title, sections),
                    DocumentKind::PlainText,
                    &self.file_stem,
                )
            }
        }
    }

    /// A4 PDF with the title centered and one block per section.
    pub fn try_render_rich(
        &self,
        title: &str,
        sections: &[(String, String)],
    ) -> Result<Vec<u8>, RenderError> {
        let mut pdf = PdfWriter::new(self.max_pages);
        pdf.set_margins(MARGIN_MM, MARGIN_MM, MARGIN_MM);
        pdf.set_auto_page_break(MARGIN_MM);
        pdf.set_title(title);
        pdf.add_page()?;

        pdf.set_font(Font::HelveticaBold, 14.0);
        pdf.cell(0.0, 10.0, &clean_line(title), Align::Center)?;
        pdf.ln(5.0);

        for (header, body) in sections {
            pdf.set_font(Font::HelveticaBold, 12.0);
            let header: String = header.chars().take(HEADER_MAX_CHARS).collect();
            pdf.cell(0.0, 8.0, &clean_line(&header), Align::Left)?;

            pdf.set_font(Font::Helvetica, 10.0);
            for paragraph in body.split('\n').map(|p| p.trim_end_matches('\r')) {
                if paragraph.trim().is_empty() {
                    continue;
                }
                write_paragraph(&mut pdf, paragraph)?;
            }

            pdf.ln(5.0);
        }

        pdf.finish()
    }
}

/// Feed one paragraph to the writer in fixed-size chunks. A chunk the
/// writer cannot encode becomes [`PLACEHOLDER`]; any other failure aborts.
fn write_paragraph(pdf: &mut PdfWriter, paragraph: &str) -> Result<(), RenderError> {
    let chunks = chunk(paragraph, CHUNK_CHARS);
    let last = chunks.len().saturating_sub(1);

    for (i, piece) in chunks.iter().enumerate() {
        match pdf.write(BODY_LINE_MM, &sanitize(piece)) {
            Ok(()) if i < last => pdf.write(BODY_LINE_MM, " ")?,
            Ok(()) => pdf.ln(BODY_LINE_MM),
            Err(RenderError::Unencodable(c)) => {
                tracing::debug!(chunk = i, character = ?c, "Skipping unrenderable chunk");
                pdf.write(BODY_LINE_MM, PLACEHOLDER)?;
                pdf.ln(BODY_LINE_MM);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Plain text rendering of the same content, UTF-8.
pub fn render_plain(title: &str, sections: &[(String, String)]) -> Vec<u8> {
    let mut text = format!("{}\n\n", title);
    for (header, body) in sections {
        text.push_str(&format!("--- {} ---\n{}\n\n", header, body));
    }
    text.into_bytes()
}

/// Replace non-ASCII characters with `?` and tabs with a space. Other
/// control characters are left for the renderer to reject.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' => ' ',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}

/// Single-line variant of [`sanitize`] for titles and headers.
fn clean_line(text: &str) -> String {
    sanitize(text).chars().filter(|c| !c.is_control()).collect()
}

/// Split `text` into slices of at most `size` characters.
fn chunk(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size.max(1)).map(|c| c.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_render_never_empty() {
        let exporter = DocumentExporter::default();
        let long_line = "a".repeat(500);
        let cases = vec![
            ("", vec![]),
            ("Title", vec![]),
            ("Title", sections(&[("Workout Planner", long_line.as_str())])),
            ("Title", sections(&[("Nutritionist", "Café au lait — 200 kcal 💪")])),
            ("Ünïcödé title", sections(&[("", "")])),
        ];

        for (title, secs) in cases {
            let doc = exporter.render(title, &secs);
            assert!(!doc.bytes.is_empty());
            assert_eq!(doc.kind, DocumentKind::Pdf);
        }
    }

    #[test]
    fn test_pdf_output_shape() {
        let exporter = DocumentExporter::default();
        let doc = exporter.render(
            "AI Fitness Assistant Responses",
            &sections(&[("Workout Planner", "Day 1: squats\n\nDay 2: rest")]),
        );
        let text = as_text(&doc.bytes);
        assert!(doc.bytes.starts_with(b"%PDF-"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("(Workout Planner) Tj"));
        assert!(text.contains("(Day 1: squats) Tj"));
        assert!(text.contains("(Day 2: rest) Tj"));
        assert_eq!(doc.file_name(), "fitness_agent_responses.pdf");
        assert_eq!(doc.mime(), "application/pdf");
    }

    #[test]
    fn test_non_ascii_becomes_question_mark() {
        let exporter = DocumentExporter::default();
        let doc = exporter.render("t", &sections(&[("Nutritionist", "Caf\u{e9} \u{1F957}")]));
        assert!(as_text(&doc.bytes).contains("(Caf? ?) Tj"));
    }

    #[test]
    fn test_header_truncated() {
        let exporter = DocumentExporter::default();
        let header = "H".repeat(60);
        let doc = exporter.render("t", &sections(&[(header.as_str(), "body")]));
        let text = as_text(&doc.bytes);
        assert!(text.contains(&format!("({}) Tj", "H".repeat(40))));
        assert!(!text.contains(&"H".repeat(41)));
    }

    #[test]
    fn test_control_chars_replaced_by_placeholder() {
        let exporter = DocumentExporter::default();
        let doc = exporter.render(
            "t",
            &sections(&[("Workout Planner", "fine line\n\u{1b}[1mbold\u{1b}[0m")]),
        );
        let text = as_text(&doc.bytes);
        assert_eq!(doc.kind, DocumentKind::Pdf);
        assert!(text.contains("(fine line) Tj"));
        assert!(text.contains("([...]) Tj"));
    }

    #[test]
    fn test_page_limit_falls_back_to_plain_text() {
        let exporter = DocumentExporter::new("out", 1);
        let body = vec!["line"; 200].join("\n");
        let secs = sections(&[("Rehab Advisor", body.as_str())]);

        assert!(matches!(
            exporter.try_render_rich("Title", &secs),
            Err(RenderError::PageLimit(1))
        ));

        let doc = exporter.render("Title", &secs);
        assert_eq!(doc.kind, DocumentKind::PlainText);
        assert_eq!(doc.file_name(), "out.txt");
        let text = as_text(&doc.bytes);
        assert!(text.starts_with("Title\n\n--- Rehab Advisor ---\nline\n"));
    }

    #[test]
    fn test_render_plain_format() {
        let out = render_plain("T", &sections(&[("A", "x"), ("B", "y")]));
        assert_eq!(as_text(&out), "T\n\n--- A ---\nx\n\n--- B ---\ny\n\n");
        assert_eq!(render_plain("", &[]), b"\n\n".to_vec());
    }

    #[test]
    fn test_chunk_and_sanitize() {
        let chunks = chunk(&"é".repeat(170), 80);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 80);
        assert_eq!(chunks[2].chars().count(), 10);
        assert!(chunk("", 80).is_empty());
        assert_eq!(sanitize("a\tb\u{2019}c"), "a b?c");
        assert_eq!(clean_line("a\u{7}b"), "ab");
    }
}
