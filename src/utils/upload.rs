use std::path::Path;

use axum::body::Bytes;
use image::ImageFormat;

use crate::error::AppResult;

/// Sub-directory of the media root holding post images.
pub const POST_IMAGE_DIR: &str = "posts";

pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// File name extensions accepted for post images.
pub const ALLOWED_EXTENSIONS: &[&str] = &["gif", "jpg", "jpeg", "png", "webp"];

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ImageUpload {
    /// Browsers send an empty part when no file was picked.
    pub fn is_empty(&self) -> bool {
        self.file_name.is_empty() && self.bytes.is_empty()
    }

    fn declared_extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase)
    }

    /// Extension to store the file under, or `None` when the upload is not
    /// a complete image of a supported format. Decodes the whole payload,
    /// so call it off the async runtime.
    pub fn extension(&self) -> Option<&'static str> {
        if let Some(content_type) = &self.content_type {
            if !content_type.starts_with("image/") && content_type != "application/octet-stream" {
                return None;
            }
        }

        let declared = self.declared_extension()?;
        if !ALLOWED_EXTENSIONS.contains(&declared.as_str()) {
            return None;
        }

        let format = image::guess_format(&self.bytes).ok()?;
        let extension = match format {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
            _ => return None,
        };

        if let Err(err) = image::load_from_memory_with_format(&self.bytes, format) {
            tracing::debug!(file = %self.file_name, error = %err, "undecodable image upload");
            return None;
        }
        Some(extension)
    }
}

/// Runs [`ImageUpload::extension`] on the blocking pool.
pub async fn check_image(upload: ImageUpload) -> AppResult<Option<&'static str>> {
    let extension = tokio::task::spawn_blocking(move || upload.extension())
        .await
        .map_err(|err| anyhow::anyhow!(err))?;
    Ok(extension)
}

/// Writes the upload under `<media_root>/posts/` with a fresh name and
/// returns the path relative to the media root.
pub async fn store_image(media_root: &Path, upload: &ImageUpload, extension: &str) -> AppResult<String> {
    let dir = media_root.join(POST_IMAGE_DIR);
    tokio::fs::create_dir_all(&dir).await?;

    let name = format!("{}.{extension}", uuid::Uuid::new_v4().simple());
    tokio::fs::write(dir.join(&name), &upload.bytes).await?;

    tracing::debug!(file = %name, original = %upload.file_name, size = upload.bytes.len(), "stored post image");
    Ok(format!("{POST_IMAGE_DIR}/{name}"))
}

/// Deletes a stored image. A missing file is not an error.
pub async fn remove_image(media_root: &Path, relative: &str) {
    match tokio::fs::remove_file(media_root.join(relative)).await {
        Ok(()) => tracing::debug!(file = %relative, "removed post image"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => tracing::warn!(file = %relative, error = %err, "failed to remove post image"),
    }
}
