use std::fmt;

use shared::FileMetadata;
use thiserror::Error;

/// Images may be at most 5 MiB.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;
/// Videos may be at most 50 MiB.
pub const MAX_VIDEO_BYTES: u64 = 50 * 1024 * 1024;

/// The six MIME types a submission may carry.
const ACCEPTED_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "video/mp4",
    "video/avi",
    "video/mov",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => f.write_str("image"),
            MediaKind::Video => f.write_str("video"),
        }
    }
}

/// Why a candidate upload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("Unsupported file type: {0}. Use a JPEG, PNG or GIF image, or an MP4, AVI or MOV video.")]
    UnsupportedType(String),
    #[error("File too large: {kind} files must be {limit_mb} MB or smaller.")]
    TooLarge { kind: MediaKind, limit_mb: u64 },
}

/// Decide accept/reject for a candidate upload from its declared MIME type
/// and byte size. Side-effect free; staging consequences (clearing a staged
/// URL) belong to the submission workflow.
pub fn validate(metadata: &FileMetadata) -> Result<MediaKind, MediaError> {
    if !ACCEPTED_TYPES.contains(&metadata.mime_type.as_str()) {
        return Err(MediaError::UnsupportedType(metadata.mime_type.clone()));
    }

    let kind = if metadata.mime_type.starts_with("image/") {
        MediaKind::Image
    } else {
        MediaKind::Video
    };
    let limit = match kind {
        MediaKind::Image => MAX_IMAGE_BYTES,
        MediaKind::Video => MAX_VIDEO_BYTES,
    };
    if metadata.size_bytes > limit {
        return Err(MediaError::TooLarge {
            kind,
            limit_mb: limit / (1024 * 1024),
        });
    }

    Ok(kind)
}

/// Guess the media kind of a plain URL from its extension, for rendering
/// submissions that carry a link instead of an uploaded file.
pub fn media_kind_from_url(url: &str) -> Option<MediaKind> {
    let extension = url.rsplit('.').next()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "webp" => Some(MediaKind::Image),
        "mp4" | "avi" | "mov" | "wmv" => Some(MediaKind::Video),
        _ => None,
    }
}
