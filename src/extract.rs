// fitagent — Plain text from uploaded workout plan PDFs

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("not a readable PDF: {0}")]
    Pdf(String),
}

/// Extract the text of every page, in page order.
pub fn pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    if !bytes.starts_with(b"%PDF") {
        return Err(ExtractError::Pdf("missing %PDF header".into()));
    }
    let text =
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;
    tracing::debug!(bytes = bytes.len(), chars = text.len(), "Extracted PDF text");
    Ok(text)
}

pub fn pdf_text_from_file(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Read {
        path: path.display().to_string(),
        source,
    })?;
    pdf_text(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentExporter, DocumentKind};

    #[test]
    fn test_rejects_non_pdf() {
        let err = pdf_text(b"hello world").unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn test_reads_back_rendered_export() {
        let sections = vec![
            (
                "Workout Planner".to_string(),
                "Day 1: squats and lunges\nDay 2: rest".to_string(),
            ),
            ("Nutritionist".to_string(), "Eat more protein.".to_string()),
        ];
        let doc = DocumentExporter::default().render("AI Fitness Assistant Responses", &sections);
        assert_eq!(doc.kind, DocumentKind::Pdf);

        let text = pdf_text(&doc.bytes).unwrap();
        for needle in [
            "AI Fitness Assistant Responses",
            "Workout Planner",
            "Day 1: squats",
            "Nutritionist",
            "protein",
        ] {
            assert!(text.contains(needle), "missing {:?} in {:?}", needle, text);
        }
    }

    #[test]
    fn test_plan_file_round_trip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("plan.pdf");
        let sections = vec![("Week 1".to_string(), "Run 5k twice".to_string())];
        let doc = DocumentExporter::default().render("My Plan", &sections);
        std::fs::write(&path, &doc.bytes).unwrap();

        let text = pdf_text_from_file(&path).unwrap();
        assert!(text.contains("Run 5k twice"));
    }

    #[test]
    fn test_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = pdf_text_from_file(&tmp.path().join("plan.pdf")).unwrap_err();
        assert!(err.to_string().contains("plan.pdf"));
    }
}
