use crate::record::RawFile;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

/// Decode an in-memory preview for image files as a `data:` URI.
///
/// Non-image files have no preview. The URI is shared, so copies of a record
/// never duplicate it. Encoding runs on the blocking pool so a
/// batch of large images can be previewed side by side.
pub async fn build_preview(file: &RawFile) -> Option<Arc<str>> {
    if !file.is_image() {
        return None;
    }

    let data = file.data.clone();
    let mime_type = file.mime_type.clone();

    match tokio::task::spawn_blocking(move || {
        format!("data:{mime_type};base64,{}", STANDARD.encode(&data))
    })
    .await
    {
        Ok(uri) => Some(Arc::from(uri)),
        Err(e) => {
            tracing::warn!("Preview decoding failed for {}: {}", file.name, e);
            None
        }
    }
}
