//! Attaching content to a dialog, inline or by reference

use super::content::{filename_from_url, Content, ExternalRef, InlineBody};
use super::dialog::Dialog;
use super::kind::Classify;
use crate::error::{DialogError, Result};
use crate::fetch::Fetcher;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Metadata key holding the discovered size of external video content
pub const CONTENT_LENGTH_KEY: &str = "content_length";

impl Dialog {
    /// Embed `body` and sign it
    ///
    /// Sets `alg` to "sha256", `encoding` to "base64url" and `signature` to the
    /// URL-safe base64 SHA-256 digest of the body text. Any external reference
    /// is dropped.
    pub fn attach_inline(
        &mut self,
        body: impl Into<String>,
        filename: Option<&str>,
        mimetype: Option<&str>,
    ) {
        let inline = InlineBody::signed_text(body.into());
        debug!("Attaching {} inline bytes", inline.body.len());

        self.content = Content::Inline(Some(inline));
        self.filename = filename.map(str::to_string);
        self.mimetype = mimetype.map(str::to_string);
    }

    /// Reference content at `url` after checking it exists
    ///
    /// Issues a HEAD request only. `filename` falls back to the last URL path
    /// segment and `mimetype` to the response `Content-Type`. For video
    /// dialogs a numeric `Content-Length` is stored under
    /// `metadata["content_length"]`.
    ///
    /// # Errors
    ///
    /// Returns `Fetch` on a non-success status, leaving the dialog untouched.
    /// Transport failures and malformed URLs propagate from the fetcher.
    pub fn attach_external<F: Fetcher + ?Sized>(
        &mut self,
        fetcher: &F,
        url: &str,
        filename: Option<&str>,
        mimetype: Option<&str>,
    ) -> Result<()> {
        let response = fetcher.head(url)?;
        if !response.is_success() {
            warn!("HEAD {} returned {}", url, response.status);
            return Err(DialogError::Fetch {
                method: "HEAD",
                url: url.to_string(),
                status: response.status,
            });
        }

        self.content = Content::External(ExternalRef::resolved(url));
        self.mimetype = mimetype
            .or(response.content_type())
            .map(str::to_string);
        self.filename = Some(
            filename
                .map(str::to_string)
                .unwrap_or_else(|| filename_from_url(url)),
        );

        if self.is_video() {
            if let Some(length) = response.content_length() {
                self.metadata
                    .insert(CONTENT_LENGTH_KEY.to_string(), Value::from(length));
            }
        }

        info!(
            "Attached external content {} ({})",
            url,
            self.mimetype.as_deref().unwrap_or("unknown type")
        );
        Ok(())
    }
}
