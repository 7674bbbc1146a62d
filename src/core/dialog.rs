//! Dialog entity and its validating builder
//!
//! A [`Dialog`] is one communication fragment of a vCon conversation record:
//! a text turn, a recording, a transfer, an incomplete call attempt, and so
//! on. Construction goes through [`DialogBuilder`], which validates the type,
//! normalizes the start time, assembles the content location and enforces
//! that `incomplete` dialogs carry a disposition.
//!
//! # Dictionary form
//!
//! Dialogs serialize to a flat JSON object using the vCon field names. Unset
//! fields are omitted entirely, never written as `null`. The single internal
//! metadata map is written under both `meta` and `metadata`, and either name
//! is accepted when reading.

use super::content::{Content, Encoding};
use super::integrity::Verification;
use super::kind::{video_mimetype_for_filename, Classify, DialogType};
use super::party_history::PartyHistory;
use super::validation::{validate_extension_key, validate_finite, DialogStart, StartInput};
use crate::error::{DialogError, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

/// Key/value map used for `meta`/`metadata` and structured sub-objects
pub type Metadata = Map<String, Value>;

/// One communication fragment within a conversation record
#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    pub(crate) kind: DialogType,
    pub(crate) start: Option<DialogStart>,
    pub(crate) content: Content,
    pub(crate) metadata: Metadata,
    pub(crate) extensions: Map<String, Value>,

    /// Indices into the envelope's party list
    pub parties: Vec<u32>,
    /// Party that produced this fragment
    pub originator: Option<u32>,
    pub mimetype: Option<String>,
    pub filename: Option<String>,
    /// Reason code; required for `incomplete` dialogs
    pub disposition: Option<String>,
    pub party_history: Option<Vec<PartyHistory>>,

    pub transferee: Option<u32>,
    pub transferor: Option<u32>,
    pub transfer_target: Option<u32>,
    pub original: Option<u32>,
    pub consultation: Option<u32>,
    pub target_dialog: Option<u32>,

    pub campaign: Option<String>,
    pub interaction: Option<String>,
    pub skill: Option<String>,
    /// Length in seconds
    pub duration: Option<f64>,

    /// Structured transfer details
    pub transfer: Option<Metadata>,
    /// Signaling data (SIP headers and the like)
    pub signaling: Option<Metadata>,

    /// Video resolution, e.g. "1920x1080"
    pub resolution: Option<String>,
    /// Frames per second
    pub frame_rate: Option<f64>,
    /// Codec name, e.g. "H.264"
    pub codec: Option<String>,
    /// Bitrate in kbps
    pub bitrate: Option<u64>,
    /// Base64-encoded thumbnail image
    pub thumbnail: Option<String>,
}

impl Dialog {
    /// Build a dialog from the three fields every fragment needs
    ///
    /// # Examples
    ///
    /// ```
    /// use vcon_dialog::Dialog;
    ///
    /// let dialog = Dialog::new("text", "2024-01-01T00:00:00Z", vec![0, 1]).unwrap();
    /// assert!(dialog.is_inline());
    ///
    /// assert!(Dialog::new("fax", "2024-01-01T00:00:00Z", vec![0]).is_err());
    /// ```
    pub fn new(
        kind: impl Into<String>,
        start: impl Into<StartInput>,
        parties: Vec<u32>,
    ) -> Result<Self> {
        DialogBuilder::new(kind).start(start).parties(parties).build()
    }

    pub fn builder(kind: impl Into<String>) -> DialogBuilder {
        DialogBuilder::new(kind)
    }

    pub fn start(&self) -> Option<&DialogStart> {
        self.start.as_ref()
    }

    pub fn set_start(&mut self, start: impl Into<StartInput>) -> Result<()> {
        self.start = Some(DialogStart::new(start)?);
        Ok(())
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn body(&self) -> Option<&str> {
        self.content.body()
    }

    pub fn url(&self) -> Option<&str> {
        self.content.url()
    }

    pub fn encoding(&self) -> Option<Encoding> {
        self.content.encoding()
    }

    pub fn alg(&self) -> Option<&str> {
        self.content.alg()
    }

    pub fn signature(&self) -> Option<&str> {
        self.content.signature()
    }

    /// True when content is referenced by URL
    pub fn is_external(&self) -> bool {
        self.content.is_external()
    }

    /// True when content is embedded (or the dialog has no content)
    pub fn is_inline(&self) -> bool {
        self.content.is_inline()
    }

    /// Legacy name for the metadata map
    pub fn meta(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Mutable access to the metadata map; `meta` sees the same writes
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    pub fn extensions(&self) -> &Map<String, Value> {
        &self.extensions
    }

    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    /// Set an opaque caller-defined field; `null` removes it
    ///
    /// # Errors
    ///
    /// Returns `InvalidField` if `key` is empty or a reserved field name.
    pub fn set_extension(&mut self, key: impl Into<String>, value: Value) -> Result<()> {
        let key = key.into();
        validate_extension_key(&key)?;
        if value.is_null() {
            self.extensions.remove(&key);
        } else {
            self.extensions.insert(key, value);
        }
        Ok(())
    }

    /// Check inline content against its signature
    pub fn verify(&self) -> Verification {
        self.content.verify()
    }

    /// True unless the content verifies
    ///
    /// Tampered content, external references, unsigned bodies and malformed
    /// signatures all report `true`: whatever cannot be shown intact is
    /// treated as changed. Use [`Dialog::verify`] to tell these apart.
    pub fn is_content_changed(&self) -> bool {
        let outcome = self.verify();
        debug!("Content verification: {:?}", outcome);
        !outcome.is_verified()
    }

    /// Dictionary form with every set field
    ///
    /// A dialog without a start time gets the current time assigned here,
    /// before serializing.
    pub fn to_dict(&mut self) -> Result<Map<String, Value>> {
        if self.start.is_none() {
            debug!("Backfilling missing start time before serialization");
            self.start = Some(DialogStart::now());
        }

        match serde_json::to_value(&*self)? {
            Value::Object(map) => Ok(map),
            other => Err(DialogError::invalid_field(
                "dialog",
                format!("serialized to a non-object value: {other}"),
            )),
        }
    }

    /// Pretty JSON of [`Dialog::to_dict`]
    pub fn to_json(&mut self) -> Result<String> {
        let dict = self.to_dict()?;
        Ok(serde_json::to_string_pretty(&dict)?)
    }

    /// Rebuild a dialog from its dictionary form
    ///
    /// Runs the same validation as [`DialogBuilder::build`]. Keys that are not
    /// vCon dialog fields are kept as extensions.
    pub fn from_dict(mut map: Map<String, Value>) -> Result<Self> {
        let kind = take_string(&mut map, "type")?
            .ok_or_else(|| DialogError::invalid_field("type", "missing required field"))?;

        let mut builder = DialogBuilder::new(kind);

        if let Some(start) = take_string(&mut map, "start")? {
            builder = builder.start(start);
        }
        if let Some(parties) = map.remove("parties") {
            builder = builder.parties(from_field("parties", parties)?);
        }

        builder.originator = take_index(&mut map, "originator")?;
        builder.mimetype = take_string(&mut map, "mimetype")?;
        builder.filename = take_string(&mut map, "filename")?;
        builder.body = take_string(&mut map, "body")?;
        builder.encoding = take_string(&mut map, "encoding")?;
        builder.url = take_string(&mut map, "url")?;
        builder.alg = take_string(&mut map, "alg")?;
        builder.signature = take_string(&mut map, "signature")?;
        builder.disposition = take_string(&mut map, "disposition")?;
        if let Some(history) = map.remove("party_history") {
            builder.party_history = from_field("party_history", history)?;
        }

        builder.transferee = take_index(&mut map, "transferee")?;
        builder.transferor = take_index(&mut map, "transferor")?;
        builder.transfer_target = take_index(&mut map, "transfer_target")?;
        builder.original = take_index(&mut map, "original")?;
        builder.consultation = take_index(&mut map, "consultation")?;
        builder.target_dialog = take_index(&mut map, "target_dialog")?;

        builder.campaign = take_string(&mut map, "campaign")?;
        builder.interaction = take_string(&mut map, "interaction")?;
        builder.skill = take_string(&mut map, "skill")?;
        builder.duration = take_field(&mut map, "duration")?;
        builder.transfer = take_field(&mut map, "transfer")?;
        builder.signaling = take_field(&mut map, "signaling")?;
        builder.meta = take_field(&mut map, "meta")?;
        builder.metadata = take_field(&mut map, "metadata")?;

        builder.resolution = take_string(&mut map, "resolution")?;
        builder.frame_rate = take_field(&mut map, "frame_rate")?;
        builder.codec = take_string(&mut map, "codec")?;
        builder.bitrate = take_field(&mut map, "bitrate")?;
        builder.thumbnail = take_string(&mut map, "thumbnail")?;

        // Whatever is left is caller-defined
        for (key, value) in map {
            if !value.is_null() {
                builder.extensions.insert(key, value);
            }
        }

        builder.build()
    }

    /// Parse JSON text produced by [`Dialog::to_json`]
    pub fn from_json(text: &str) -> Result<Self> {
        let map: Map<String, Value> = serde_json::from_str(text)?;
        Self::from_dict(map)
    }
}

impl Classify for Dialog {
    fn dialog_type(&self) -> DialogType {
        self.kind
    }

    fn mimetype(&self) -> Option<&str> {
        self.mimetype.as_deref()
    }
}

fn from_field<T: serde::de::DeserializeOwned>(field: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| DialogError::invalid_field(field, e.to_string()))
}

/// Remove `key`, treating `null` as absent
fn take_field<T: serde::de::DeserializeOwned>(
    map: &mut Map<String, Value>,
    key: &str,
) -> Result<Option<T>> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => from_field(key, value).map(Some),
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Result<Option<String>> {
    take_field(map, key)
}

fn take_index(map: &mut Map<String, Value>, key: &str) -> Result<Option<u32>> {
    take_field(map, key)
}

impl Serialize for Dialog {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry("type", self.kind.as_str())?;
        if let Some(start) = &self.start {
            map.serialize_entry("start", start.as_str())?;
        }
        map.serialize_entry("parties", &self.parties)?;
        if let Some(originator) = self.originator {
            map.serialize_entry("originator", &originator)?;
        }
        if let Some(mimetype) = &self.mimetype {
            map.serialize_entry("mimetype", mimetype)?;
        }
        if let Some(filename) = &self.filename {
            map.serialize_entry("filename", filename)?;
        }
        if let Some(body) = self.content.body() {
            map.serialize_entry("body", body)?;
        }
        if let Some(encoding) = self.content.encoding() {
            map.serialize_entry("encoding", encoding.as_str())?;
        }
        if let Some(url) = self.content.url() {
            map.serialize_entry("url", url)?;
        }
        if let Some(alg) = self.content.alg() {
            map.serialize_entry("alg", alg)?;
        }
        if let Some(signature) = self.content.signature() {
            map.serialize_entry("signature", signature)?;
        }
        if let Some(disposition) = &self.disposition {
            map.serialize_entry("disposition", disposition)?;
        }
        if let Some(history) = &self.party_history {
            let entries: Vec<Value> = history.iter().map(PartyHistory::to_dict).collect();
            map.serialize_entry("party_history", &entries)?;
        }

        let indices = [
            ("transferee", self.transferee),
            ("transferor", self.transferor),
            ("transfer_target", self.transfer_target),
            ("original", self.original),
            ("consultation", self.consultation),
            ("target_dialog", self.target_dialog),
        ];
        for (key, value) in indices {
            if let Some(value) = value {
                map.serialize_entry(key, &value)?;
            }
        }

        let labels = [
            ("campaign", &self.campaign),
            ("interaction", &self.interaction),
            ("skill", &self.skill),
        ];
        for (key, value) in labels {
            if let Some(value) = value {
                map.serialize_entry(key, value)?;
            }
        }
        // Non-finite floats would serialize as null
        if let Some(duration) = self.duration.filter(|d| d.is_finite()) {
            map.serialize_entry("duration", &duration)?;
        }
        if let Some(transfer) = &self.transfer {
            map.serialize_entry("transfer", transfer)?;
        }
        if let Some(signaling) = &self.signaling {
            map.serialize_entry("signaling", signaling)?;
        }

        map.serialize_entry("meta", &self.metadata)?;
        map.serialize_entry("metadata", &self.metadata)?;

        if let Some(resolution) = &self.resolution {
            map.serialize_entry("resolution", resolution)?;
        }
        if let Some(frame_rate) = self.frame_rate.filter(|f| f.is_finite()) {
            map.serialize_entry("frame_rate", &frame_rate)?;
        }
        if let Some(codec) = &self.codec {
            map.serialize_entry("codec", codec)?;
        }
        if let Some(bitrate) = self.bitrate {
            map.serialize_entry("bitrate", &bitrate)?;
        }
        if let Some(thumbnail) = &self.thumbnail {
            map.serialize_entry("thumbnail", thumbnail)?;
        }

        for (key, value) in &self.extensions {
            map.serialize_entry(key, value)?;
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for Dialog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Dialog::from_dict(map).map_err(serde::de::Error::custom)
    }
}

/// Validating builder for [`Dialog`]
///
/// # Examples
///
/// ```
/// use vcon_dialog::{Classify, DialogBuilder};
///
/// let dialog = DialogBuilder::new("video")
///     .start("2024-01-01T00:00:00Z")
///     .parties(vec![0])
///     .filename("clip.mkv")
///     .build()
///     .unwrap();
///
/// assert_eq!(dialog.mimetype(), Some("video/x-matroska"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DialogBuilder {
    kind: String,
    start: Option<StartInput>,
    parties: Vec<u32>,
    originator: Option<u32>,
    mimetype: Option<String>,
    filename: Option<String>,
    body: Option<String>,
    encoding: Option<String>,
    url: Option<String>,
    alg: Option<String>,
    signature: Option<String>,
    disposition: Option<String>,
    party_history: Option<Vec<PartyHistory>>,
    transferee: Option<u32>,
    transferor: Option<u32>,
    transfer_target: Option<u32>,
    original: Option<u32>,
    consultation: Option<u32>,
    target_dialog: Option<u32>,
    campaign: Option<String>,
    interaction: Option<String>,
    skill: Option<String>,
    duration: Option<f64>,
    transfer: Option<Metadata>,
    signaling: Option<Metadata>,
    meta: Option<Metadata>,
    metadata: Option<Metadata>,
    resolution: Option<String>,
    frame_rate: Option<f64>,
    codec: Option<String>,
    bitrate: Option<u64>,
    thumbnail: Option<String>,
    extensions: Map<String, Value>,
}

macro_rules! builder_setters {
    ($($(#[$doc:meta])* $name:ident: $ty:ty),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(mut self, value: impl Into<$ty>) -> Self {
                self.$name = Some(value.into());
                self
            }
        )*
    };
}

impl DialogBuilder {
    /// Start a builder for a dialog of the given type (validated in `build`)
    pub fn new(kind: impl Into<String>) -> Self {
        DialogBuilder {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Native timestamp or parsable text
    pub fn start(mut self, start: impl Into<StartInput>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn parties(mut self, parties: Vec<u32>) -> Self {
        self.parties = parties;
        self
    }

    pub fn originator(mut self, originator: u32) -> Self {
        self.originator = Some(originator);
        self
    }

    builder_setters! {
        mimetype: String,
        filename: String,
        /// Inline body; cannot be combined with `url`
        body: String,
        /// One of "none", "base64url", "json"
        encoding: String,
        /// External reference; cannot be combined with `body`
        url: String,
        alg: String,
        signature: String,
        disposition: String,
        campaign: String,
        interaction: String,
        skill: String,
        resolution: String,
        codec: String,
        thumbnail: String,
    }

    pub fn party_history(mut self, history: Vec<PartyHistory>) -> Self {
        self.party_history = Some(history);
        self
    }

    pub fn transferee(mut self, party: u32) -> Self {
        self.transferee = Some(party);
        self
    }

    pub fn transferor(mut self, party: u32) -> Self {
        self.transferor = Some(party);
        self
    }

    pub fn transfer_target(mut self, party: u32) -> Self {
        self.transfer_target = Some(party);
        self
    }

    pub fn original(mut self, dialog: u32) -> Self {
        self.original = Some(dialog);
        self
    }

    pub fn consultation(mut self, dialog: u32) -> Self {
        self.consultation = Some(dialog);
        self
    }

    pub fn target_dialog(mut self, dialog: u32) -> Self {
        self.target_dialog = Some(dialog);
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn frame_rate(mut self, fps: f64) -> Self {
        self.frame_rate = Some(fps);
        self
    }

    pub fn bitrate(mut self, kbps: u64) -> Self {
        self.bitrate = Some(kbps);
        self
    }

    pub fn transfer(mut self, transfer: Metadata) -> Self {
        self.transfer = Some(transfer);
        self
    }

    pub fn signaling(mut self, signaling: Metadata) -> Self {
        self.signaling = Some(signaling);
        self
    }

    /// Legacy metadata map
    pub fn meta(mut self, meta: Metadata) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Caller-defined field, kept opaque; `null` clears it
    pub fn extension(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if value.is_null() {
            self.extensions.remove(&key);
        } else {
            self.extensions.insert(key, value);
        }
        self
    }

    /// Validate and build the dialog
    ///
    /// # Errors
    ///
    /// - `InvalidType` for a type outside the closed set
    /// - `InvalidStart` for an unparsable start time
    /// - `InvalidField` for inconsistent content fields, reserved extension
    ///   names, or a non-finite `duration` or `frame_rate`
    /// - `MissingDisposition` for an `incomplete` dialog without a disposition
    pub fn build(self) -> Result<Dialog> {
        let kind: DialogType = self.kind.parse()?;
        let start = self.start.map(DialogStart::new).transpose()?;
        let content = Content::from_parts(
            self.body,
            self.url,
            self.encoding,
            self.alg,
            self.signature,
        )?;

        // One map backs both names; on conflicting keys `metadata` wins
        let metadata = match (self.meta, self.metadata) {
            (Some(mut meta), Some(metadata)) => {
                meta.extend(metadata);
                meta
            }
            (Some(only), None) | (None, Some(only)) => only,
            (None, None) => Metadata::new(),
        };

        for key in self.extensions.keys() {
            validate_extension_key(key)?;
        }
        validate_finite("duration", self.duration)?;
        validate_finite("frame_rate", self.frame_rate)?;

        let mut dialog = Dialog {
            kind,
            start,
            content,
            metadata,
            extensions: self.extensions,
            parties: self.parties,
            originator: self.originator,
            mimetype: self.mimetype,
            filename: self.filename,
            disposition: self.disposition,
            party_history: self.party_history,
            transferee: self.transferee,
            transferor: self.transferor,
            transfer_target: self.transfer_target,
            original: self.original,
            consultation: self.consultation,
            target_dialog: self.target_dialog,
            campaign: self.campaign,
            interaction: self.interaction,
            skill: self.skill,
            duration: self.duration,
            transfer: self.transfer,
            signaling: self.signaling,
            resolution: self.resolution,
            frame_rate: self.frame_rate,
            codec: self.codec,
            bitrate: self.bitrate,
            thumbnail: self.thumbnail,
        };

        if dialog.kind == DialogType::Incomplete && dialog.disposition.is_none() {
            return Err(DialogError::MissingDisposition);
        }

        if dialog.kind == DialogType::Video && dialog.mimetype.is_none() {
            let inferred = video_mimetype_for_filename(dialog.filename.as_deref());
            debug!("Inferred video mimetype {} from filename", inferred);
            dialog.mimetype = Some(inferred.to_string());
        }

        Ok(dialog)
    }
}
