//! # vcon-dialog - Dialog fragments for vCon conversation records
//!
//! A vCon records a conversation as parties, dialogs, attachments and
//! analysis. This crate implements the dialog: one communication fragment
//! such as a text turn, a call recording, a video, a transfer or an
//! incomplete call attempt.
//!
//! - **Classification** by declared type and by content mimetype
//! - **Inline content** embedded in the dialog and signed with SHA-256
//! - **External content** referenced by URL and checked with a HEAD request
//! - **Promotion** of external content to inline content, signed over the
//!   downloaded bytes
//! - **Video metadata** helpers that keep `meta` and `metadata` in step
//!
//! ## Quick Start
//!
//! ```rust
//! use vcon_dialog::{Classify, Dialog, Result, Verification};
//!
//! # fn main() -> Result<()> {
//! let mut dialog = Dialog::new("text", "2024-01-01T00:00:00Z", vec![0, 1])?;
//! dialog.attach_inline("hello", Some("a.txt"), Some("text/plain"));
//!
//! assert!(dialog.is_inline());
//! assert!(dialog.is_text());
//! assert_eq!(dialog.verify(), Verification::Verified);
//!
//! let dict = dialog.to_dict()?;
//! assert!(!dict.contains_key("url"));
//! # Ok(())
//! # }
//! ```
//!
//! ## External Content
//!
//! ```rust,no_run
//! use vcon_dialog::{Dialog, FetchConfig, HttpFetcher, Result};
//!
//! # fn main() -> Result<()> {
//! let fetcher = HttpFetcher::new(FetchConfig::default())?;
//!
//! let mut dialog = Dialog::new("recording", "2024-01-01T00:00:00Z", vec![0, 1])?;
//! dialog.attach_external(&fetcher, "https://media.example.com/call.wav", None, None)?;
//!
//! // Later: download, embed and sign
//! dialog.to_inline_data(&fetcher)?;
//! assert!(dialog.is_inline());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod fetch;

pub use crate::config::{Config, FetchConfig};
pub use crate::core::{
    content::{filename_from_url, Content, Encoding, ExternalRef, InlineBody, Seal},
    dialog::{Dialog, DialogBuilder, Metadata},
    integrity::Verification,
    kind::{video_mimetype_for_filename, Classify, DialogType},
    locator::CONTENT_LENGTH_KEY,
    party_history::PartyHistory,
    validation::{DialogStart, StartInput},
    video::{VideoOptions, VideoSource, THUMBNAIL_PLACEHOLDER},
};
pub use crate::error::{DialogError, Result};
pub use crate::fetch::{FetchResponse, Fetcher, HttpFetcher};
