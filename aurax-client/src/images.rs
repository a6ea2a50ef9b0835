//! Image retrieval

use bytes::Bytes;
use tracing::debug;

use crate::error::Result;
use crate::{AuraxClient, path_segment};

impl AuraxClient {
    /// Download a result image
    ///
    /// Typically called with the image identifier carried by a completed
    /// task's output.
    ///
    /// # Returns
    /// The raw image bytes
    pub async fn get_image(&self, image_id: &str) -> Result<Bytes> {
        let url = format!("{}/images/{}", self.base_url, path_segment(image_id));
        debug!(image_id, "downloading image");
        let response = self.get(&url).send().await?;
        let response = Self::check_status(response).await?;

        Ok(response.bytes().await?)
    }
}

#[cfg(test)]
mod tests {
    use crate::{AuraxClient, ClientConfig};

    fn client(server: &mockito::ServerGuard) -> AuraxClient {
        AuraxClient::new(ClientConfig::new("test-key", "test-key-id").with_base_url(server.url()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_image_returns_raw_bytes() {
        let mut server = mockito::Server::new_async().await;
        let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];
        let mock = server
            .mock("GET", "/images/img-42")
            .match_header("x-api-key", "test-key")
            .match_header("x-key-id", "test-key-id")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(png.clone())
            .create_async()
            .await;

        let bytes = client(&server).get_image("img-42").await.unwrap();

        assert_eq!(bytes.as_ref(), png.as_slice());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_missing_image() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/images/nope")
            .with_status(404)
            .with_body("image not found")
            .create_async()
            .await;

        let err = client(&server).get_image("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
