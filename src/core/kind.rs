//! Dialog type and media classification
//!
//! A dialog is classified two ways: by its declared [`DialogType`] and by the
//! mimetype of its content. Video detection uses both, so a `recording` that
//! carries `video/webm` content still counts as video.

use crate::error::{DialogError, Result};
use std::fmt;
use std::str::FromStr;

/// Declared kind of a dialog fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogType {
    Recording,
    Text,
    Transfer,
    Incomplete,
    Audio,
    Video,
}

impl DialogType {
    /// Every valid type, in wire order
    pub const ALL: [DialogType; 6] = [
        DialogType::Recording,
        DialogType::Text,
        DialogType::Transfer,
        DialogType::Incomplete,
        DialogType::Audio,
        DialogType::Video,
    ];

    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogType::Recording => "recording",
            DialogType::Text => "text",
            DialogType::Transfer => "transfer",
            DialogType::Incomplete => "incomplete",
            DialogType::Audio => "audio",
            DialogType::Video => "video",
        }
    }

    fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for DialogType {
    type Err = DialogError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DialogError::InvalidType {
                value: s.to_string(),
                valid: Self::valid_names(),
            })
    }
}

impl fmt::Display for DialogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mimetypes recognised for audio content
pub const AUDIO_MIMETYPES: &[&str] = &[
    "audio/x-wav",
    "audio/wav",
    "audio/wave",
    "audio/mpeg",
    "audio/mp3",
    "audio/ogg",
    "audio/webm",
    "audio/x-m4a",
    "audio/aac",
];

/// Mimetypes recognised for video content
pub const VIDEO_MIMETYPES: &[&str] = &[
    "video/x-mp4",
    "video/ogg",
    "video/mp4",
    "video/quicktime",
    "video/webm",
    "video/x-msvideo",
    "video/x-matroska",
    "video/mpeg",
    "video/x-flv",
    "video/3gpp",
    "video/x-m4v",
];

/// Email content mimetype
pub const EMAIL_MIMETYPE: &str = "message/rfc822";

/// Fallback when a video extension is missing or unknown
pub const DEFAULT_VIDEO_MIMETYPE: &str = "video/mp4";

/// Every mimetype a vCon dialog is expected to carry
pub const SUPPORTED_MIMETYPES: &[&str] = &[
    "text/plain",
    "audio/x-wav",
    "audio/wav",
    "audio/wave",
    "audio/mpeg",
    "audio/mp3",
    "audio/ogg",
    "audio/webm",
    "audio/x-m4a",
    "audio/aac",
    "video/x-mp4",
    "video/ogg",
    "video/mp4",
    "video/quicktime",
    "video/webm",
    "video/x-msvideo",
    "video/x-matroska",
    "video/mpeg",
    "video/x-flv",
    "video/3gpp",
    "video/x-m4v",
    "multipart/mixed",
    "message/rfc822",
    "application/json",
];

/// Lowercase file extension to video mimetype
pub const VIDEO_EXTENSIONS: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("mkv", "video/x-matroska"),
    ("mpg", "video/mpeg"),
    ("mpeg", "video/mpeg"),
    ("flv", "video/x-flv"),
    ("3gp", "video/3gpp"),
    ("m4v", "video/x-m4v"),
];

pub fn is_audio_mimetype(mimetype: &str) -> bool {
    AUDIO_MIMETYPES.contains(&mimetype)
}

pub fn is_video_mimetype(mimetype: &str) -> bool {
    VIDEO_MIMETYPES.contains(&mimetype)
}

pub fn is_supported_mimetype(mimetype: &str) -> bool {
    SUPPORTED_MIMETYPES.contains(&mimetype)
}

/// Infer a video mimetype from a filename
///
/// The extension is everything after the last `.`, compared case-insensitively.
/// Missing filenames, missing extensions and unknown extensions all resolve to
/// [`DEFAULT_VIDEO_MIMETYPE`].
///
/// # Examples
///
/// ```
/// use vcon_dialog::core::kind::video_mimetype_for_filename;
///
/// assert_eq!(video_mimetype_for_filename(Some("clip.mkv")), "video/x-matroska");
/// assert_eq!(video_mimetype_for_filename(Some("CLIP.MOV")), "video/quicktime");
/// assert_eq!(video_mimetype_for_filename(Some("clip.xyz")), "video/mp4");
/// assert_eq!(video_mimetype_for_filename(None), "video/mp4");
/// ```
pub fn video_mimetype_for_filename(filename: Option<&str>) -> &'static str {
    let Some(ext) = filename.and_then(|name| name.rsplit_once('.')).map(|(_, ext)| ext) else {
        return DEFAULT_VIDEO_MIMETYPE;
    };

    let ext = ext.to_ascii_lowercase();
    VIDEO_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mimetype)| *mimetype)
        .unwrap_or(DEFAULT_VIDEO_MIMETYPE)
}

/// Classification predicates shared by anything that has a type and a mimetype
pub trait Classify {
    fn dialog_type(&self) -> DialogType;

    fn mimetype(&self) -> Option<&str>;

    fn is_text(&self) -> bool {
        self.dialog_type() == DialogType::Text
    }

    fn is_recording(&self) -> bool {
        self.dialog_type() == DialogType::Recording
    }

    fn is_transfer(&self) -> bool {
        self.dialog_type() == DialogType::Transfer
    }

    fn is_incomplete(&self) -> bool {
        self.dialog_type() == DialogType::Incomplete
    }

    fn is_audio(&self) -> bool {
        self.mimetype().is_some_and(is_audio_mimetype)
    }

    /// Declared video type, or video content under any type
    fn is_video(&self) -> bool {
        self.dialog_type() == DialogType::Video || self.mimetype().is_some_and(is_video_mimetype)
    }

    fn is_email(&self) -> bool {
        self.mimetype() == Some(EMAIL_MIMETYPE)
    }
}
