//! Image uploads to S3-compatible storage for product and portfolio photos.

use std::io::Cursor;

use aws_sdk_s3::primitives::ByteStream;
use axum::extract::Multipart;
use bytes::Bytes;
use image::{ImageFormat, ImageReader};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Multipart field names accepted as the image payload.
const IMAGE_FIELDS: &[&str] = &["image", "file"];

#[derive(Debug)]
pub struct ImageUpload {
    pub content_type: &'static str,
    pub extension: &'static str,
    pub bytes: Bytes,
}

/// Maps an accepted upload format to `(content_type, extension)`.
pub fn accepted_format(format: ImageFormat) -> Option<(&'static str, &'static str)> {
    match format {
        ImageFormat::Jpeg => Some(("image/jpeg", "jpg")),
        ImageFormat::Png => Some(("image/png", "png")),
        ImageFormat::WebP => Some(("image/webp", "webp")),
        _ => None,
    }
}

pub fn object_key(scope: &str, owner: Uuid, extension: &str) -> String {
    format!("{scope}/{owner}/{}.{extension}", Uuid::new_v4())
}

/// Validates size, format and that the payload actually decodes. The declared
/// content type is ignored in favour of the detected one.
pub fn validate_image(bytes: Bytes) -> Result<ImageUpload, AppError> {
    if bytes.is_empty() {
        return Err(AppError::Validation("image is empty".to_string()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::Validation(format!(
            "image exceeds {} MiB",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }
    let unsupported =
        || AppError::Validation("only JPEG, PNG and WebP images are accepted".to_string());
    let format = image::guess_format(&bytes).map_err(|_| unsupported())?;
    let (content_type, extension) = accepted_format(format).ok_or_else(unsupported)?;

    ImageReader::with_format(Cursor::new(&bytes[..]), format)
        .decode()
        .map_err(|e| AppError::Validation(format!("image could not be decoded: {e}")))?;

    Ok(ImageUpload {
        content_type,
        extension,
        bytes,
    })
}

/// Reads the first `image`/`file` field from a multipart body.
pub async fn read_image_field(multipart: &mut Multipart) -> Result<ImageUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let is_image = field
            .name()
            .is_some_and(|name| IMAGE_FIELDS.contains(&name));
        if !is_image {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read image: {e}")))?;
        return validate_image(bytes);
    }
    Err(AppError::Validation(
        "multipart body must contain an 'image' field".to_string(),
    ))
}

/// Uploads the image and returns its object key.
pub async fn upload_image(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    scope: &str,
    owner: Uuid,
    upload: ImageUpload,
) -> Result<String, AppError> {
    let key = object_key(scope, owner, upload.extension);
    let size = upload.bytes.len();

    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(upload.bytes))
        .content_type(upload.content_type)
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

    info!("Uploaded {size} bytes to s3://{bucket}/{key}");
    Ok(key)
}

/// Removes an object whose key never made it into the database. Failures are
/// logged and otherwise ignored.
pub async fn discard_image(s3: &aws_sdk_s3::Client, bucket: &str, key: &str) {
    match s3.delete_object().bucket(bucket).key(key).send().await {
        Ok(_) => info!("Discarded unreferenced object s3://{bucket}/{key}"),
        Err(e) => warn!("Failed to discard s3://{bucket}/{key}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([180, 60, 20])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_accepts_real_images() {
        let png = validate_image(Bytes::from(encoded(ImageFormat::Png))).unwrap();
        assert_eq!((png.content_type, png.extension), ("image/png", "png"));

        let jpeg = validate_image(Bytes::from(encoded(ImageFormat::Jpeg))).unwrap();
        assert_eq!((jpeg.content_type, jpeg.extension), ("image/jpeg", "jpg"));

        let webp = validate_image(Bytes::from(encoded(ImageFormat::WebP))).unwrap();
        assert_eq!((webp.content_type, webp.extension), ("image/webp", "webp"));
    }

    #[test]
    fn test_rejects_other_formats() {
        assert!(validate_image(Bytes::from_static(b"GIF89a\x01\x00\x01\x00")).is_err());
        assert!(validate_image(Bytes::from_static(b"<svg></svg>")).is_err());
        assert!(validate_image(Bytes::from_static(b"RIFF")).is_err());
        assert_eq!(accepted_format(ImageFormat::Gif), None);
    }

    #[test]
    fn test_rejects_signature_followed_by_junk() {
        let mut fake = vec![0xFF, 0xD8, 0xFF, 0xE0];
        fake.extend_from_slice(b"<script>alert(1)</script>");
        let err = validate_image(Bytes::from(fake)).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("decoded")));

        let mut truncated = encoded(ImageFormat::Png);
        truncated.truncate(24);
        assert!(validate_image(Bytes::from(truncated)).is_err());
    }

    #[test]
    fn test_validate_image_limits() {
        assert!(validate_image(Bytes::new()).is_err());

        let mut oversized = encoded(ImageFormat::Png);
        oversized.resize(MAX_IMAGE_BYTES + 1, 0);
        let err = validate_image(Bytes::from(oversized)).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("MiB")));
    }

    #[test]
    fn test_object_key_layout() {
        let owner = Uuid::new_v4();
        let key = object_key("products", owner, "webp");
        assert!(key.starts_with(&format!("products/{owner}/")));
        assert!(key.ends_with(".webp"));
    }
}
