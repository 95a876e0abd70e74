//! Photo preparation for export
//!
//! Stored photos may be in any format the `image` crate decodes. Each one is
//! decoded once, flattened to RGB and re-encoded as JPEG at a fixed quality
//! so the PDF can embed it with `DCTDecode`.

use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, warn};

use super::layout::ImageSize;

/// A photo ready to embed
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub size: ImageSize,
    pub jpeg: Vec<u8>,
}

/// Decode and re-encode one stored photo
///
/// Returns `None` when the bytes are not a decodable image or the image
/// has no area.
pub fn prepare_image(bytes: &[u8], quality: u8) -> Option<PreparedImage> {
    let decoded = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            debug!("Skipping undecodable image ({} bytes): {}", bytes.len(), e);
            return None;
        }
    };

    let size = ImageSize {
        width: decoded.width(),
        height: decoded.height(),
    };
    if size.width == 0 || size.height == 0 {
        warn!("Skipping image with degenerate size {}x{}", size.width, size.height);
        return None;
    }

    let rgb = decoded.to_rgb8();
    let mut jpeg = Vec::new();
    if let Err(e) = JpegEncoder::new_with_quality(&mut jpeg, quality).encode_image(&rgb) {
        warn!("Failed to re-encode image: {}", e);
        return None;
    }

    Some(PreparedImage { size, jpeg })
}

/// Prepare every photo of a moment, keeping positions aligned
pub fn prepare_all(images: &[Vec<u8>], quality: u8) -> Vec<Option<PreparedImage>> {
    images
        .iter()
        .map(|bytes| prepare_image(bytes, quality))
        .collect()
}
