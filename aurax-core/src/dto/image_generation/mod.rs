//! Image generation DTOs

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductType;
use crate::validation::{MAX_IMAGE_DIMENSION, ValidationError, require_non_empty};

/// Request to start an image generation task
///
/// Width and height default to 1024 on the service when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationRequest {
    pub prompt: String,
    pub product_type: ProductType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl ImageGenerationRequest {
    pub fn new(prompt: impl Into<String>, product_type: ProductType) -> Self {
        Self {
            prompt: prompt.into(),
            product_type,
            mask_base64: None,
            width: None,
            height: None,
        }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_size(self, width: u32, height: u32) -> Self {
        self.with_width(width).with_height(height)
    }

    pub fn with_mask(mut self, mask_base64: impl Into<String>) -> Self {
        self.mask_base64 = Some(mask_base64.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("prompt", &self.prompt)?;
        for (field, value) in [("width", self.width), ("height", self.height)] {
            if let Some(value) = value {
                if value == 0 || value > MAX_IMAGE_DIMENSION {
                    return Err(ValidationError::OutOfRange {
                        field,
                        value,
                        max: MAX_IMAGE_DIMENSION,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialization_omits_unset_size() {
        let req = ImageGenerationRequest::new("red sneakers on marble", ProductType::Footwear);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "prompt": "red sneakers on marble", "productType": "FOOTWEAR" })
        );
    }

    #[test]
    fn test_validate_dimensions() {
        let req = ImageGenerationRequest::new("bag", ProductType::Bag).with_size(1024, 4096);
        assert_eq!(
            req.validate(),
            Err(ValidationError::OutOfRange {
                field: "height",
                value: 4096,
                max: 2048
            })
        );

        let req = ImageGenerationRequest::new("bag", ProductType::Bag).with_size(2048, 512);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_width_and_height_are_independent() {
        let req = ImageGenerationRequest::new("tote", ProductType::Bag).with_width(768);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "prompt": "tote", "productType": "BAG", "width": 768 })
        );
        assert!(req.validate().is_ok());

        let req = ImageGenerationRequest::new("tote", ProductType::Bag).with_height(0);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "prompt": "tote", "productType": "BAG", "height": 0 })
        );
        assert_eq!(
            req.validate(),
            Err(ValidationError::OutOfRange {
                field: "height",
                value: 0,
                max: 2048
            })
        );
    }

    #[test]
    fn test_validate_prompt() {
        let req = ImageGenerationRequest::new("   ", ProductType::Other);
        assert_eq!(req.validate(), Err(ValidationError::EmptyField("prompt")));
    }
}
