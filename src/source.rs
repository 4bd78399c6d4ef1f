//! Frame sources
//!
//! A frame source hands over one complete frame for a single scan. Whatever
//! produced the frame (an upload, a remote camera snapshot) stays on the
//! caller's side; the scanner only ever sees the decoded pixels.

use async_trait::async_trait;
use image::RgbImage;
use reqwest::Client;

use crate::error::AppError;
use crate::image_processing;

/// Something that can produce one frame to scan
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Short description for logs
    fn describe(&self) -> String;

    /// Acquire and decode one frame
    async fn acquire(&self) -> Result<RgbImage, AppError>;
}

/// Frame bytes uploaded with the request
pub struct UploadedFrame {
    bytes: Vec<u8>,
}

impl UploadedFrame {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

#[async_trait]
impl FrameSource for UploadedFrame {
    fn describe(&self) -> String {
        format!("upload ({} bytes)", self.bytes.len())
    }

    async fn acquire(&self) -> Result<RgbImage, AppError> {
        if self.bytes.is_empty() {
            return Err(AppError::ImageProcessing("Empty upload".to_string()));
        }
        image_processing::decode_frame(&self.bytes)
    }
}

/// Frame fetched from a URL, e.g. a network camera snapshot endpoint
pub struct RemoteFrame {
    client: Client,
    url: String,
}

impl RemoteFrame {
    pub fn new(client: Client, url: impl Into<String>) -> Result<Self, AppError> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::InvalidPath(format!("unsupported frame URL: {}", url)));
        }
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FrameSource for RemoteFrame {
    fn describe(&self) -> String {
        format!("remote {}", self.url())
    }

    async fn acquire(&self) -> Result<RgbImage, AppError> {
        tracing::info!("Fetching frame from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header("Accept", "image/*")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Failed to fetch frame: {}",
                response.status()
            )));
        }

        let image_data = response.bytes().await?;
        image_processing::decode_frame(&image_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_uploaded_frame_decodes() {
        let img = RgbImage::from_pixel(8, 6, image::Rgb([1, 2, 3]));
        let mut png = Cursor::new(Vec::new());
        img.write_to(&mut png, image::ImageFormat::Png).unwrap();

        let source = UploadedFrame::new(png.into_inner());
        let frame = source.acquire().await.unwrap();
        assert_eq!(frame.dimensions(), (8, 6));
        assert_eq!(frame.get_pixel(3, 3).0, [1, 2, 3]);
    }

    #[tokio::test]
    async fn test_empty_upload_is_rejected() {
        let source = UploadedFrame::new(Vec::new());
        assert!(matches!(
            source.acquire().await,
            Err(AppError::ImageProcessing(_))
        ));
    }

    #[test]
    fn test_remote_frame_requires_http() {
        assert!(RemoteFrame::new(Client::new(), "file:///etc/passwd").is_err());
        let source = RemoteFrame::new(Client::new(), "https://cam.local/snapshot.jpg").unwrap();
        assert_eq!(source.url(), "https://cam.local/snapshot.jpg");
    }
}
