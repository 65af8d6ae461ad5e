use crate::record::FileRecord;
use crate::transport::error::{DescriptionError, DescriptionResult};
use crate::transport::types::{DescriptionRequest, DescriptionResponse};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Stored on the record when no description could be obtained
pub const DESCRIPTION_PLACEHOLDER: &str = "Image description unavailable";

/// External collaborator that turns image bytes into a short text description.
#[async_trait]
pub trait DescriptionService: Send + Sync {
    async fn describe(&self, request: DescriptionRequest) -> DescriptionResult<DescriptionResponse>;
}

/// Ask the service about an uploaded image, degrading to the placeholder on
/// any error or unsuccessful response.
pub async fn describe_image(
    service: Option<&dyn DescriptionService>,
    record: &FileRecord,
) -> String {
    let Some(service) = service else {
        return DESCRIPTION_PLACEHOLDER.to_string();
    };

    let request = DescriptionRequest {
        image_base64: STANDARD.encode(&record.data),
        mime_type: record.mime_type.clone(),
        filename: record.name.clone(),
    };

    let outcome = service
        .describe(request)
        .await
        .and_then(|response| match response {
            DescriptionResponse {
                success: true,
                description,
            } if !description.trim().is_empty() => Ok(description),
            DescriptionResponse { success: true, .. } => {
                Err(DescriptionError::Malformed("empty description".into()))
            }
            DescriptionResponse { success: false, .. } => Err(DescriptionError::Unavailable(
                "service reported failure".into(),
            )),
        });

    match outcome {
        Ok(description) => description,
        Err(e) => {
            tracing::warn!("Description for {} unavailable: {}", record.name, e);
            DESCRIPTION_PLACEHOLDER.to_string()
        }
    }
}
