//! Image encoding: preview `DynamicImage` → PNG bytes.
//!
//! PNG is lossless, so the one-pixel cut lines and small poster text stay
//! crisp in the preview; JPEG artefacts would smear exactly the detail the
//! user is checking.

use crate::error::PosterError;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode `img` as PNG.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, PosterError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PosterError::EncodeFailed {
            detail: e.to_string(),
        })?;

    debug!(
        "Encoded {}x{} px preview → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}
