//! Extracted image resources.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;

/// An image pulled out of the package, ready for inline embedding.
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    /// MIME type inferred from the part's extension
    pub mime_type: String,

    /// Binary payload
    #[serde(skip)]
    pub data: Vec<u8>,

    /// Size in bytes
    pub size: usize,
}

impl Resource {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        let size = data.len();
        Self {
            mime_type: mime_type.into(),
            data,
            size,
        }
    }

    /// Encode as a `data:` URI for inline embedding.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.data))
    }
}

/// Infer an image MIME type from a part path's extension.
pub fn mime_from_path(path: &str) -> Option<&'static str> {
    let ext = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())?
        .to_lowercase();

    Some(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tiff" | "tif" => "image/tiff",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        _ => return None,
    })
}
