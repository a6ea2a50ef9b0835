//! Submission endpoints
//!
//! Submissions are sent at most once: nothing here retries, so a failed call
//! leaves the decision to resubmit with the caller.

use aurax_core::dto::image_generation::ImageGenerationRequest;
use aurax_core::dto::product_description::ProductDescriptionRequest;
use aurax_core::dto::task::TaskResponse;
use aurax_core::dto::vto::VtoRequest;
use aurax_core::validation::ValidationError;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use crate::AuraxClient;
use crate::error::{ClientError, Result};

impl AuraxClient {
    // =============================================================================
    // Asynchronous Jobs
    // =============================================================================

    /// Start a virtual try-on task
    ///
    /// # Arguments
    /// * `req` - Person and garment images (base64) and try-on options
    ///
    /// # Returns
    /// The identifier of the new task
    ///
    /// # Example
    /// ```no_run
    /// # use aurax_client::{AuraxClient, ClientConfig};
    /// # use aurax_core::domain::product::ProductType;
    /// # use aurax_core::dto::vto::{GarmentStrength, VtoRequest};
    /// # async fn example() -> aurax_client::Result<()> {
    /// let client = AuraxClient::new(ClientConfig::new("key", "key-id"))?;
    /// let request = VtoRequest::new(
    ///     "base64-person",
    ///     "base64-garment",
    ///     ProductType::Garment,
    ///     GarmentStrength::Low,
    /// );
    /// let task = client.vto(request).await?;
    /// println!("submitted {}", task.task_id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn vto(&self, req: VtoRequest) -> Result<TaskResponse> {
        req.validate()?;
        let url = format!("{}/api/ai/vto", self.base_url);
        debug!(product_type = %req.product_type, "submitting virtual try-on task");
        let response = self.post(&url).json(&req).send().await?;

        Self::accept_task(Self::handle_response(response).await?, "vto")
    }

    /// Start an image generation task
    ///
    /// # Arguments
    /// * `req` - Prompt, product type and optional size
    ///
    /// # Returns
    /// The identifier of the new task
    pub async fn image_generation(&self, req: ImageGenerationRequest) -> Result<TaskResponse> {
        req.validate()?;
        let url = format!("{}/api/ai/image-generation", self.base_url);
        debug!(product_type = %req.product_type, "submitting image generation task");
        let response = self.post(&url).json(&req).send().await?;

        Self::accept_task(Self::handle_response(response).await?, "image-generation")
    }

    // =============================================================================
    // Synchronous Jobs
    // =============================================================================

    /// Describe a product image
    ///
    /// Unlike the other jobs this endpoint answers directly, so no task is
    /// created.
    ///
    /// # Returns
    /// The generated description text
    pub async fn product_description(&self, req: ProductDescriptionRequest) -> Result<String> {
        req.validate()?;
        let url = format!("{}/api/ai/product-description", self.base_url);

        let mut image = Part::bytes(req.image).file_name(req.file_name);
        if let Some(mime) = &req.mime_type {
            image = image
                .mime_str(mime)
                .map_err(|_| ValidationError::InvalidMimeType(mime.clone()))?;
        }
        let form = Form::new()
            .part("image", image)
            .text("productType", req.product_type.as_str());

        debug!(product_type = %req.product_type, "requesting product description");
        let response = self.post(&url).multipart(form).send().await?;

        Self::handle_text_response(response).await
    }

    /// Check that a submission response names a task
    fn accept_task(task: TaskResponse, kind: &str) -> Result<TaskResponse> {
        if task.task_id.is_empty() {
            return Err(ClientError::Parse(format!(
                "{} submission returned an empty taskId",
                kind
            )));
        }
        info!(task_id = %task.task_id, kind, "task submitted");
        Ok(task)
    }
}
