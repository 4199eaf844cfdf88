use std::{collections::HashSet, ffi::OsStr, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

/// Audio containers the library knows how to recognize by file extension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AudioExtension {
    Mp3,
    Aac,
    M4a,
    Ogg,
    Opus,
    Wav,
    Flac,
}

impl AudioExtension {
    pub const ALL: &'static [AudioExtension] = &[
        AudioExtension::Mp3,
        AudioExtension::Aac,
        AudioExtension::M4a,
        AudioExtension::Ogg,
        AudioExtension::Opus,
        AudioExtension::Wav,
        AudioExtension::Flac,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioExtension::Mp3 => "mp3",
            AudioExtension::Aac => "aac",
            AudioExtension::M4a => "m4a",
            AudioExtension::Ogg => "ogg",
            AudioExtension::Opus => "opus",
            AudioExtension::Wav => "wav",
            AudioExtension::Flac => "flac",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioExtension::Mp3 => "audio/mpeg",
            AudioExtension::Aac => "audio/aac",
            AudioExtension::M4a => "audio/mp4",
            AudioExtension::Ogg => "audio/ogg",
            AudioExtension::Opus => "audio/opus",
            AudioExtension::Wav => "audio/wav",
            AudioExtension::Flac => "audio/flac",
        }
    }

    /// Case-insensitive lookup of a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(OsStr::to_str)
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for AudioExtension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim_start_matches('.').to_ascii_lowercase();
        AudioExtension::ALL
            .iter()
            .find(|ext| ext.as_str() == lower)
            .copied()
            .ok_or_else(|| format!("Extension not supported: {}", s))
    }
}

impl std::fmt::Display for AudioExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The subset of extensions a scan accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet(HashSet<AudioExtension>);

impl ExtensionSet {
    pub fn new(extensions: impl IntoIterator<Item = AudioExtension>) -> Self {
        ExtensionSet(extensions.into_iter().collect())
    }

    pub fn matches(&self, path: &Path) -> bool {
        AudioExtension::from_path(path).is_some_and(|ext| self.0.contains(&ext))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        ExtensionSet::new([AudioExtension::Mp3])
    }
}
