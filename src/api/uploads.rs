//! Image upload API.

use crate::client::PosterClient;
use crate::error::Result;
use crate::types::UploadResponse;

/// Uploads API client.
pub struct UploadsApi {
    client: PosterClient,
}

impl UploadsApi {
    pub(crate) fn new(client: PosterClient) -> Self {
        Self { client }
    }

    /// Upload an image, returning its stored URL.
    ///
    /// The file is sent as the `image` field of a multipart form.
    pub async fn image(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadResponse> {
        self.client.post_image("upload/image", file_name, bytes).await
    }
}
