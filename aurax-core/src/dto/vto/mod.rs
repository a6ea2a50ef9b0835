//! Virtual try-on DTOs

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductType;
use crate::validation::{ValidationError, require_non_empty};

/// How strongly the garment replaces what the person is wearing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GarmentStrength {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl TryFrom<u8> for GarmentStrength {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            other => Err(ValidationError::InvalidGarmentStrength(other)),
        }
    }
}

impl From<GarmentStrength> for u8 {
    fn from(strength: GarmentStrength) -> Self {
        strength as u8
    }
}

/// Request to start a virtual try-on task
///
/// Images are base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VtoRequest {
    pub person_image: String,
    pub garment_image: String,
    pub product_type: ProductType,
    pub garment_strength: GarmentStrength,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_with_prompt: Option<bool>,
}

impl VtoRequest {
    pub fn new(
        person_image: impl Into<String>,
        garment_image: impl Into<String>,
        product_type: ProductType,
        garment_strength: GarmentStrength,
    ) -> Self {
        Self {
            person_image: person_image.into(),
            garment_image: garment_image.into(),
            product_type,
            garment_strength,
            mask_base64: None,
            prompt: None,
            run_with_prompt: None,
        }
    }

    pub fn with_mask(mut self, mask_base64: impl Into<String>) -> Self {
        self.mask_base64 = Some(mask_base64.into());
        self
    }

    /// Sets a prompt and asks the service to use it
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self.run_with_prompt = Some(true);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("personImage", &self.person_image)?;
        require_non_empty("garmentImage", &self.garment_image)?;
        if let Some(prompt) = &self.prompt {
            require_non_empty("prompt", prompt)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_request_omits_optional_fields() {
        let req = VtoRequest::new(
            "cGVyc29u",
            "Z2FybWVudA==",
            ProductType::Garment,
            GarmentStrength::Medium,
        );

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "personImage": "cGVyc29u",
                "garmentImage": "Z2FybWVudA==",
                "productType": "GARMENT",
                "garmentStrength": 2
            })
        );
    }

    #[test]
    fn test_prompt_enables_run_with_prompt() {
        let req = VtoRequest::new("p", "g", ProductType::Dress, GarmentStrength::High)
            .with_prompt("studio lighting")
            .with_mask("bWFzaw==");

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["prompt"], "studio lighting");
        assert_eq!(value["runWithPrompt"], true);
        assert_eq!(value["maskBase64"], "bWFzaw==");
        assert_eq!(value["garmentStrength"], 3);
    }

    #[test]
    fn test_garment_strength_rejects_out_of_range() {
        let err = serde_json::from_value::<GarmentStrength>(json!(4)).unwrap_err();
        assert!(err.to_string().contains("garment strength"));
        assert_eq!(GarmentStrength::try_from(1u8), Ok(GarmentStrength::Low));
    }

    #[test]
    fn test_validate_requires_images() {
        let req = VtoRequest::new("", "g", ProductType::Garment, GarmentStrength::Low);
        assert_eq!(req.validate(), Err(ValidationError::EmptyField("personImage")));

        let req = VtoRequest::new("p", "g", ProductType::Garment, GarmentStrength::Low);
        assert!(req.validate().is_ok());
    }
}
