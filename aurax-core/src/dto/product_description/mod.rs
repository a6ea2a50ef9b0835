//! Product description DTOs

use crate::domain::product::ProductType;
use crate::validation::{ValidationError, require_non_empty};

/// Request to describe a product image
///
/// Sent as a multipart form, so this type is not serialized as JSON.
#[derive(Debug, Clone)]
pub struct ProductDescriptionRequest {
    pub image: Vec<u8>,
    pub file_name: String,
    /// MIME type of the image, e.g. `image/png`
    pub mime_type: Option<String>,
    pub product_type: ProductType,
}

impl ProductDescriptionRequest {
    pub fn new(image: Vec<u8>, file_name: impl Into<String>, product_type: ProductType) -> Self {
        Self {
            image,
            file_name: file_name.into(),
            mime_type: None,
            product_type,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.image.is_empty() {
            return Err(ValidationError::EmptyField("image"));
        }
        require_non_empty("fileName", &self.file_name)?;
        if let Some(mime) = &self.mime_type {
            let well_formed = mime
                .split_once('/')
                .is_some_and(|(kind, sub)| !kind.is_empty() && !sub.is_empty())
                && !mime.contains(char::is_whitespace);
            if !well_formed {
                return Err(ValidationError::InvalidMimeType(mime.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_image() {
        let req = ProductDescriptionRequest::new(Vec::new(), "shoe.png", ProductType::Footwear);
        assert_eq!(req.validate(), Err(ValidationError::EmptyField("image")));

        let req =
            ProductDescriptionRequest::new(vec![0x89, 0x50], "shoe.png", ProductType::Footwear)
                .with_mime_type("image/png");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_malformed_mime_type() {
        let req = ProductDescriptionRequest::new(vec![1], "shoe.png", ProductType::Footwear)
            .with_mime_type("png");
        assert_eq!(
            req.validate(),
            Err(ValidationError::InvalidMimeType("png".to_string()))
        );
    }
}
