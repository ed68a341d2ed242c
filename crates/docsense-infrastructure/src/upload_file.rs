use docsense_core::document::UploadFile;
use docsense_core::error::{DocsenseError, Result};
use std::path::Path;

/// Reads a local file into an [`UploadFile`].
///
/// The MIME type is guessed from the extension and falls back to
/// `application/octet-stream`.
///
/// # Errors
///
/// Returns `DocsenseError::Io` if the file cannot be read and
/// `DocsenseError::Config` if the path has no file name.
pub async fn load_upload_file(path: impl AsRef<Path>) -> Result<UploadFile> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| DocsenseError::config(format!("Not a file path: {}", path.display())))?;

    let bytes = tokio::fs::read(path).await?;
    let mime_type = mime_guess::from_path(path).first_or_octet_stream();

    tracing::debug!(
        "[UploadFile] Loaded {} ({} bytes, {})",
        file_name,
        bytes.len(),
        mime_type
    );

    Ok(UploadFile::new(file_name, mime_type.essence_str(), bytes))
}
