use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD};
use tracing::{Level, instrument};

use crate::{error::ReadError, extensions::AudioExtension};

/// MIME tag every playable data URL carries, whatever the container.
pub const PLAYBACK_MIME: &str = "audio/mpeg";

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Loads the whole file and returns it as a `data:audio/mpeg;base64,...` URL.
#[instrument(level = Level::DEBUG, err)]
pub async fn read_file_as_data_url(path: &Path) -> Result<String, ReadError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(encode_data_url(PLAYBACK_MIME, &bytes))
}

/// Like [`read_file_as_data_url`], but tags the URL with the MIME type of the
/// file's extension, falling back to `audio/mpeg`.
pub async fn read_file_as_typed_data_url(path: &Path) -> Result<String, ReadError> {
    let mime = AudioExtension::from_path(path)
        .map(|ext| ext.mime_type())
        .unwrap_or(PLAYBACK_MIME);
    let bytes = tokio::fs::read(path).await.map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(encode_data_url(mime, &bytes))
}
