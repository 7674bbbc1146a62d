//! Video attributes and metadata helpers
//!
//! Nothing here decodes media. [`Dialog::extract_video_metadata`] aggregates
//! what is already stored and [`Dialog::generate_thumbnail`] is a stub whose
//! real implementation belongs to an external media-processing service.

use super::content::filename_from_url;
use super::dialog::{Dialog, Metadata};
use super::kind::{video_mimetype_for_filename, DialogType};
use super::validation::{validate_extension_key, validate_finite};
use crate::error::Result;
use crate::fetch::Fetcher;
use serde_json::Value;
use tracing::{debug, warn};

/// Returned by [`Dialog::generate_thumbnail`] when no thumbnail is stored
pub const THUMBNAIL_PLACEHOLDER: &str = "Generated thumbnail would be returned here";

/// Metadata keys promoted to dialog attributes by [`Dialog::update_video_metadata`]
pub const PROMOTED_KEYS: &[&str] = &[
    "resolution",
    "frame_rate",
    "codec",
    "bitrate",
    "duration",
    "thumbnail",
];

/// Where video content comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// URL to reference (HEAD only)
    External(String),
    /// Data to embed and sign
    Inline(String),
}

/// Optional attributes applied by [`Dialog::add_video_data`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoOptions {
    pub filename: Option<String>,
    pub mimetype: Option<String>,
    pub resolution: Option<String>,
    pub frame_rate: Option<f64>,
    pub codec: Option<String>,
    pub bitrate: Option<u64>,
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
    /// Extension fields set on the dialog after attaching
    pub extra: Metadata,
}

impl VideoOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn with_frame_rate(mut self, fps: f64) -> Self {
        self.frame_rate = Some(fps);
        self
    }

    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = Some(codec.into());
        self
    }

    pub fn with_bitrate(mut self, kbps: u64) -> Self {
        self.bitrate = Some(kbps);
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl Dialog {
    /// Turn this dialog into a video dialog and attach its content
    ///
    /// Sets the type to `video`, merges `metadata` into the metadata map,
    /// derives a filename from the URL for external sources, and infers the
    /// mimetype from the filename extension when none is given. Remaining
    /// options become dialog attributes once the content is attached.
    ///
    /// # Errors
    ///
    /// Returns `InvalidField` for a reserved key in `options.extra` or a
    /// non-finite `duration` or `frame_rate`, and
    /// whatever [`Dialog::attach_external`] returns for external sources. On
    /// error the dialog is left unchanged.
    pub fn add_video_data<F: Fetcher + ?Sized>(
        &mut self,
        fetcher: &F,
        source: VideoSource,
        metadata: Option<Metadata>,
        options: VideoOptions,
    ) -> Result<()> {
        for key in options.extra.keys() {
            validate_extension_key(key)?;
        }
        validate_finite("duration", options.duration)?;
        validate_finite("frame_rate", options.frame_rate)?;

        let filename = match (&options.filename, &source) {
            (Some(name), _) => Some(name.clone()),
            (None, VideoSource::External(url)) => Some(filename_from_url(url)),
            (None, VideoSource::Inline(_)) => None,
        };
        let mimetype = options
            .mimetype
            .clone()
            .unwrap_or_else(|| video_mimetype_for_filename(filename.as_deref()).to_string());

        let previous_kind = self.kind;
        let previous_metadata = self.metadata.clone();

        self.kind = DialogType::Video;
        if let Some(metadata) = metadata {
            self.metadata.extend(metadata);
        }

        match &source {
            VideoSource::External(url) => {
                if let Err(e) =
                    self.attach_external(fetcher, url, filename.as_deref(), Some(mimetype.as_str()))
                {
                    self.kind = previous_kind;
                    self.metadata = previous_metadata;
                    return Err(e);
                }
            }
            VideoSource::Inline(data) => {
                self.attach_inline(data.as_str(), filename.as_deref(), Some(mimetype.as_str()));
            }
        }

        let VideoOptions {
            resolution,
            frame_rate,
            codec,
            bitrate,
            duration,
            thumbnail,
            extra,
            ..
        } = options;

        if resolution.is_some() {
            self.resolution = resolution;
        }
        if frame_rate.is_some() {
            self.frame_rate = frame_rate;
        }
        if codec.is_some() {
            self.codec = codec;
        }
        if bitrate.is_some() {
            self.bitrate = bitrate;
        }
        if duration.is_some() {
            self.duration = duration;
        }
        if thumbnail.is_some() {
            self.thumbnail = thumbnail;
        }
        for (key, value) in extra {
            if !value.is_null() {
                self.extensions.insert(key, value);
            }
        }

        debug!("Added video data ({})", mimetype);
        Ok(())
    }

    /// Merge `metadata` and promote recognised keys to attributes
    ///
    /// `resolution`, `codec` and `thumbnail` need strings, `frame_rate` and
    /// `duration` numbers, `bitrate` a non-negative integer. Values of the
    /// wrong shape stay in the map but are not promoted.
    pub fn update_video_metadata(&mut self, metadata: Metadata) {
        for (key, value) in &metadata {
            if !PROMOTED_KEYS.contains(&key.as_str()) {
                continue;
            }
            if !self.promote(key, value) {
                warn!("Not promoting video metadata '{}': unexpected value {}", key, value);
            }
        }
        self.metadata.extend(metadata);
    }

    fn promote(&mut self, key: &str, value: &Value) -> bool {
        match key {
            "resolution" => assign(&mut self.resolution, value.as_str().map(str::to_string)),
            "codec" => assign(&mut self.codec, value.as_str().map(str::to_string)),
            "thumbnail" => assign(&mut self.thumbnail, value.as_str().map(str::to_string)),
            "frame_rate" => assign(&mut self.frame_rate, value.as_f64()),
            "duration" => assign(&mut self.duration, value.as_f64()),
            "bitrate" => assign(&mut self.bitrate, value.as_u64()),
            _ => false,
        }
    }

    /// Stored video attributes overlaid with the metadata map
    ///
    /// Read-only aggregation; no media analysis happens.
    pub fn extract_video_metadata(&self) -> Metadata {
        let mut result = Metadata::new();

        if let Some(resolution) = &self.resolution {
            result.insert("resolution".to_string(), Value::from(resolution.as_str()));
        }
        if let Some(frame_rate) = self.frame_rate {
            result.insert("frame_rate".to_string(), Value::from(frame_rate));
        }
        if let Some(codec) = &self.codec {
            result.insert("codec".to_string(), Value::from(codec.as_str()));
        }
        if let Some(bitrate) = self.bitrate {
            result.insert("bitrate".to_string(), Value::from(bitrate));
        }
        if let Some(duration) = self.duration {
            result.insert("duration".to_string(), Value::from(duration));
        }

        result.extend(self.metadata.clone());
        result
    }

    /// Stored thumbnail, or a placeholder
    ///
    /// Frame extraction is not implemented here; `timestamp` (seconds into the
    /// video) is accepted for the external service that will do it.
    pub fn generate_thumbnail(&self, timestamp: Option<f64>) -> String {
        match &self.thumbnail {
            Some(thumbnail) => thumbnail.clone(),
            None => {
                debug!("No stored thumbnail (requested at {:?}s)", timestamp);
                THUMBNAIL_PLACEHOLDER.to_string()
            }
        }
    }
}

fn assign<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(value) => {
            *slot = Some(value);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kind::Classify;
    use crate::core::locator::CONTENT_LENGTH_KEY;
    use crate::error::DialogError;
    use crate::fetch::FetchResponse;
    use serde_json::json;

    struct Head(u16);

    impl Fetcher for Head {
        fn head(&self, _url: &str) -> Result<FetchResponse> {
            Ok(FetchResponse::new(self.0)
                .with_header("Content-Type", "application/octet-stream")
                .with_header("Content-Length", "2048"))
        }

        fn get(&self, _url: &str) -> Result<FetchResponse> {
            Ok(FetchResponse::new(self.0))
        }
    }

    fn object(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    fn video_dialog() -> Dialog {
        Dialog::new("video", "2024-01-01T00:00:00Z", vec![0]).unwrap()
    }

    #[test]
    fn test_add_external_video() -> Result<()> {
        let mut dialog = video_dialog();
        dialog.add_video_data(
            &Head(200),
            VideoSource::External("https://x/clip.mov".to_string()),
            None,
            VideoOptions::new(),
        )?;

        assert_eq!(dialog.mimetype(), Some("video/quicktime"));
        assert_eq!(dialog.filename.as_deref(), Some("clip.mov"));
        assert!(dialog.is_video());
        assert!(dialog.is_external());
        assert_eq!(dialog.metadata()[CONTENT_LENGTH_KEY], 2048);
        Ok(())
    }

    #[test]
    fn test_add_inline_video_with_attributes() -> Result<()> {
        let mut dialog = Dialog::new("recording", "2024-01-01T00:00:00Z", vec![0])?;
        dialog.add_video_data(
            &Head(200),
            VideoSource::Inline("AAAAIGZ0eXBpc29t".to_string()),
            Some(object(json!({"camera": "front"}))),
            VideoOptions::new()
                .with_filename("selfie.webm")
                .with_resolution("1280x720")
                .with_codec("VP9")
                .with_frame_rate(30.0)
                .with_extra("x_device", json!("phone")),
        )?;

        assert!(dialog.is_video());
        assert!(dialog.is_inline());
        assert_eq!(dialog.mimetype(), Some("video/webm"));
        assert_eq!(dialog.resolution.as_deref(), Some("1280x720"));
        assert_eq!(dialog.codec.as_deref(), Some("VP9"));
        assert_eq!(dialog.frame_rate, Some(30.0));
        assert_eq!(dialog.meta()["camera"], "front");
        assert_eq!(dialog.extension("x_device"), Some(&json!("phone")));
        assert!(dialog.verify().is_verified());
        Ok(())
    }

    #[test]
    fn test_inline_video_without_filename_defaults_to_mp4() -> Result<()> {
        let mut dialog = video_dialog();
        dialog.add_video_data(
            &Head(200),
            VideoSource::Inline("data".to_string()),
            None,
            VideoOptions::new(),
        )?;
        assert_eq!(dialog.mimetype(), Some("video/mp4"));
        assert_eq!(dialog.filename, None);
        Ok(())
    }

    #[test]
    fn test_failed_attach_rolls_back() {
        let mut dialog = Dialog::new("text", "2024-01-01T00:00:00Z", vec![0]).unwrap();
        let before = dialog.clone();

        let err = dialog
            .add_video_data(
                &Head(403),
                VideoSource::External("https://x/private.mp4".to_string()),
                Some(object(json!({"k": "v"}))),
                VideoOptions::new(),
            )
            .unwrap_err();

        assert!(err.is_fetch());
        assert_eq!(dialog, before);
        assert!(dialog.is_text());
    }

    #[test]
    fn test_reserved_extra_rejected() {
        let mut dialog = video_dialog();
        let err = dialog
            .add_video_data(
                &Head(200),
                VideoSource::Inline("x".to_string()),
                None,
                VideoOptions::new().with_extra("url", json!("https://evil")),
            )
            .unwrap_err();
        assert!(matches!(err, DialogError::InvalidField { .. }));
        assert!(dialog.body().is_none());
    }

    #[test]
    fn test_non_finite_option_rejected() {
        let mut dialog = video_dialog();
        let before = dialog.clone();
        let err = dialog
            .add_video_data(
                &Head(200),
                VideoSource::Inline("x".to_string()),
                None,
                VideoOptions::new().with_duration(f64::NAN),
            )
            .unwrap_err();
        assert!(matches!(err, DialogError::InvalidField { ref field, .. } if field == "duration"));
        assert_eq!(dialog, before);
    }

    #[test]
    fn test_update_video_metadata_promotes() {
        let mut dialog = video_dialog();
        dialog.update_video_metadata(object(json!({
            "resolution": "1920x1080",
            "frame_rate": 29.97,
            "codec": "H.264",
            "bitrate": 5000,
            "duration": 61.5,
            "thumbnail": "iVBORw0KGgo=",
            "scene": "lobby",
        })));

        assert_eq!(dialog.resolution.as_deref(), Some("1920x1080"));
        assert_eq!(dialog.frame_rate, Some(29.97));
        assert_eq!(dialog.codec.as_deref(), Some("H.264"));
        assert_eq!(dialog.bitrate, Some(5000));
        assert_eq!(dialog.duration, Some(61.5));
        assert_eq!(dialog.thumbnail.as_deref(), Some("iVBORw0KGgo="));
        assert_eq!(dialog.metadata()["scene"], "lobby");
        assert_eq!(dialog.meta(), dialog.metadata());
    }

    #[test]
    fn test_update_video_metadata_skips_wrong_shapes() {
        let mut dialog = video_dialog();
        dialog.update_video_metadata(object(json!({"bitrate": "fast", "codec": 7})));

        assert_eq!(dialog.bitrate, None);
        assert_eq!(dialog.codec, None);
        assert_eq!(dialog.metadata()["bitrate"], "fast");
    }

    #[test]
    fn test_extract_video_metadata_overlays_map() {
        let mut dialog = video_dialog();
        dialog.resolution = Some("640x480".to_string());
        dialog.bitrate = Some(800);
        dialog
            .metadata_mut()
            .insert("bitrate".to_string(), json!(900));

        let extracted = dialog.extract_video_metadata();
        assert_eq!(extracted["resolution"], "640x480");
        assert_eq!(extracted["bitrate"], 900);
        assert!(!extracted.contains_key("codec"));
    }

    #[test]
    fn test_generate_thumbnail() {
        let mut dialog = video_dialog();
        assert_eq!(dialog.generate_thumbnail(Some(3.0)), THUMBNAIL_PLACEHOLDER);

        dialog.thumbnail = Some("thumb".to_string());
        assert_eq!(dialog.generate_thumbnail(None), "thumb");
    }
}
