use lopdf::Document;

use caseline_core::{PdfError, PdfTextBackend};

/// lopdf-based implementation of [`PdfTextBackend`].
///
/// Extraction is page by page: a page that fails to yield text (malformed
/// content stream, unsupported encoding) is logged and skipped, and
/// extraction continues with the remaining pages. Only a document that
/// cannot be parsed at all produces an error.
#[derive(Default)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfTextBackend for LopdfBackend {
    fn extract_text(&self, data: &[u8]) -> Result<String, PdfError> {
        let document = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;

        let mut pages_text = Vec::new();
        for (page_number, _) in document.get_pages() {
            match document.extract_text(&[page_number]) {
                Ok(text) => pages_text.push(text),
                Err(e) => {
                    tracing::warn!(page = page_number, error = %e, "skipping unreadable page");
                }
            }
        }

        Ok(pages_text.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    /// Build a single-page PDF containing `text`, in memory.
    fn pdf_with_text(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).expect("save pdf");
        buffer
    }

    #[test]
    fn extracts_text_from_a_valid_pdf() {
        let data = pdf_with_text("Motion granted on Jan 5");
        let text = LopdfBackend::new().extract_text(&data).unwrap();
        assert!(text.contains("Motion granted on Jan 5"));
    }

    #[test]
    fn corrupt_bytes_are_an_open_error() {
        let result = LopdfBackend::new().extract_text(b"this is not a pdf");
        assert!(matches!(result, Err(PdfError::OpenError(_))));
    }

    #[test]
    fn corrupt_bytes_degrade_to_empty_via_best_effort() {
        let text = caseline_core::extract_text_best_effort(&LopdfBackend::new(), b"%PDF-garbage");
        assert_eq!(text, "");
    }
}
