//! Turns an uploaded venue photo into a reference the front-end can render.

use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const SUPPORTED_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("image is empty")]
    Empty,

    #[error("image is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("photo must be an image data URI or an http(s) URL")]
    InvalidReference,
}

/// Encodes raw image bytes as a `data:` URI.
pub fn to_data_uri(content_type: &str, bytes: &[u8]) -> Result<String, ImageError> {
    let mime = normalize_mime(content_type);
    if !SUPPORTED_TYPES.contains(&mime.as_str()) {
        return Err(ImageError::UnsupportedType(mime));
    }
    check_size(bytes.len())?;

    Ok(format!(
        "data:{mime};base64,{}",
        general_purpose::STANDARD.encode(bytes)
    ))
}

/// Accepts a stored photo reference: an image data URI we could have produced
/// ourselves, or a plain http(s) URL.
pub fn ensure_renderable(reference: &str) -> Result<(), ImageError> {
    if reference.starts_with("https://") || reference.starts_with("http://") {
        return Ok(());
    }

    let rest = reference
        .strip_prefix("data:")
        .ok_or(ImageError::InvalidReference)?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or(ImageError::InvalidReference)?;

    let mime = normalize_mime(mime);
    if !SUPPORTED_TYPES.contains(&mime.as_str()) {
        return Err(ImageError::UnsupportedType(mime));
    }

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| ImageError::InvalidReference)?;
    check_size(bytes.len())
}

fn normalize_mime(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn check_size(size: usize) -> Result<(), ImageError> {
    match size {
        0 => Err(ImageError::Empty),
        s if s > MAX_IMAGE_BYTES => Err(ImageError::TooLarge {
            size: s,
            limit: MAX_IMAGE_BYTES,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn png_becomes_data_uri() {
        let uri = to_data_uri("image/png", &PNG_HEADER).expect("encodes");
        assert_eq!(uri, "data:image/png;base64,iVBORw0KGgo=");
        ensure_renderable(&uri).expect("own output is renderable");
    }

    #[test]
    fn content_type_parameters_are_ignored() {
        let uri = to_data_uri("Image/JPEG; charset=binary", b"jpeg").expect("encodes");
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn non_image_is_rejected() {
        assert_eq!(
            to_data_uri("application/pdf", b"%PDF"),
            Err(ImageError::UnsupportedType("application/pdf".to_string()))
        );
    }

    #[test]
    fn empty_upload_is_rejected() {
        assert_eq!(to_data_uri("image/png", &[]), Err(ImageError::Empty));
    }

    #[test]
    fn oversized_upload_is_rejected() {
        let big = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert!(matches!(
            to_data_uri("image/png", &big),
            Err(ImageError::TooLarge { .. })
        ));
    }

    #[test]
    fn urls_are_renderable() {
        ensure_renderable("https://images.example.com/court.jpg").expect("url");
    }

    #[test]
    fn garbage_references_are_rejected() {
        assert_eq!(ensure_renderable("court.jpg"), Err(ImageError::InvalidReference));
        assert_eq!(
            ensure_renderable("data:image/png;base64,@@@"),
            Err(ImageError::InvalidReference)
        );
        assert_eq!(
            ensure_renderable("data:text/html;base64,PGgxPg=="),
            Err(ImageError::UnsupportedType("text/html".to_string()))
        );
    }
}
