use axum::extract::Multipart;

/// The type of uploaded file, from the {txt, pdf} allowlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Outline,
    Pdf,
}

/// An uploaded file with its data and metadata.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Parsed form fields from the multipart upload.
#[derive(Default)]
pub struct UploadFields {
    pub outline: Option<UploadedFile>,
    pub supporting: Vec<UploadedFile>,
}

/// Parse a multipart form upload into structured form fields.
///
/// Field `outline` carries the case outline (one `.txt` file); field
/// `supporting` may repeat, one `.pdf` per occurrence. Any invalid file
/// rejects the whole request.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadFields, String> {
    let mut fields = UploadFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read form field: {}", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "outline" => {
                let filename = sanitize_filename(field.file_name().unwrap_or("outline.txt"))?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read file data: {}", e))?
                    .to_vec();
                validate_file(&filename, &data, FileType::Outline)?;
                fields.outline = Some(UploadedFile { filename, data });
            }
            "supporting" => {
                let filename = sanitize_filename(field.file_name().unwrap_or("document.pdf"))?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Failed to read file data: {}", e))?
                    .to_vec();
                validate_file(&filename, &data, FileType::Pdf)?;
                fields.supporting.push(UploadedFile { filename, data });
            }
            _ => {
                // Ignore unknown fields
                let _ = field.bytes().await;
            }
        }
    }

    if fields.outline.is_none() && fields.supporting.is_empty() {
        return Err("No file uploaded".to_string());
    }

    Ok(fields)
}

/// Reduce a client-supplied filename to a safe storage-key component.
pub fn sanitize_filename(filename: &str) -> Result<String, String> {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        return Err("Invalid filename".to_string());
    }
    Ok(cleaned)
}

/// Enforce the extension allowlist and, for PDFs, the magic bytes.
fn validate_file(filename: &str, data: &[u8], expected: FileType) -> Result<(), String> {
    let lower = filename.to_lowercase();
    match expected {
        FileType::Outline => {
            if !lower.ends_with(".txt") {
                return Err(format!("Invalid file: {filename} (outline must be .txt)"));
            }
        }
        FileType::Pdf => {
            if !lower.ends_with(".pdf") {
                return Err(format!(
                    "Invalid file: {filename} (supporting documents must be .pdf)"
                ));
            }
            if !data.starts_with(b"%PDF-") {
                return Err(format!(
                    "Invalid file: {filename} doesn't appear to be a valid PDF"
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("brief (final).pdf").unwrap(), "brief__final_.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd").unwrap(), "_.._etc_passwd");
        assert!(sanitize_filename("...").is_err());
    }

    #[test]
    fn extension_allowlist_is_enforced() {
        assert!(validate_file("case.txt", b"anything", FileType::Outline).is_ok());
        assert!(validate_file("case.doc", b"anything", FileType::Outline).is_err());
        assert!(validate_file("brief.pdf", b"%PDF-1.5 ...", FileType::Pdf).is_ok());
        assert!(validate_file("brief.pdf", b"not a pdf", FileType::Pdf).is_err());
        assert!(validate_file("brief.txt", b"%PDF-1.5", FileType::Pdf).is_err());
    }
}
