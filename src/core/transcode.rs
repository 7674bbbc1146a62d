//! Promotion of externally referenced content to inline content
//!
//! ```text
//! External { url }  --GET-->  raw bytes  --encode-->  Inline { body, encoding }
//!                                 |
//!                                 +--sha256--> signature (over the raw bytes)
//! ```

use super::content::{filename_from_url, Content, Encoding, InlineBody, Seal};
use super::dialog::Dialog;
use super::integrity;
use super::kind::Classify;
use crate::error::{DialogError, Result};
use crate::fetch::Fetcher;
use tracing::{debug, info, warn};

/// Choose body text and encoding for fetched bytes
///
/// Media is always base64url. Anything else is kept as text when it is valid
/// UTF-8 and base64url otherwise.
pub(crate) fn encode_body(raw: &[u8], is_media: bool) -> (String, Encoding) {
    if !is_media {
        if let Ok(text) = std::str::from_utf8(raw) {
            return (text.to_string(), Encoding::None);
        }
        debug!("Fetched content is not UTF-8, falling back to base64url");
    }
    (integrity::encode_base64url(raw), Encoding::Base64Url)
}

impl Dialog {
    /// Fetch external content and embed it
    ///
    /// Does nothing for a dialog that is already inline. Otherwise the content
    /// is downloaded, encoded, signed over the raw bytes, and installed in
    /// place of the URL. `mimetype` and `filename` are backfilled from the
    /// response and URL when unset.
    ///
    /// Whether the content is audio or video is decided from the dialog as it
    /// was before the call, not from the backfilled mimetype. Media is always
    /// base64url; other content stays text when it is valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns `Fetch` on a non-success status. On any error the dialog is
    /// left exactly as it was.
    pub fn to_inline_data<F: Fetcher + ?Sized>(&mut self, fetcher: &F) -> Result<()> {
        let Content::External(external) = &self.content else {
            debug!("Dialog already inline, nothing to convert");
            return Ok(());
        };
        let url = external.url.clone();

        let response = fetcher.get(&url)?;
        if !response.is_success() {
            warn!("GET {} returned {}", url, response.status);
            return Err(DialogError::Fetch {
                method: "GET",
                url,
                status: response.status,
            });
        }

        // Everything below is computed before the dialog is touched
        let is_media = self.is_audio() || self.is_video();
        let (body, encoding) = encode_body(&response.body, is_media);
        let mimetype = self
            .mimetype
            .clone()
            .filter(|existing| !existing.is_empty())
            .or_else(|| response.content_type().map(str::to_string));
        let seal = Seal::sha256(&response.body);
        let filename = self
            .filename
            .clone()
            .unwrap_or_else(|| filename_from_url(&url));

        info!(
            "Converted {} to inline ({} bytes, {})",
            url,
            response.body.len(),
            encoding
        );

        self.content = Content::Inline(Some(InlineBody {
            body,
            encoding: Some(encoding),
            seal: Some(seal),
        }));
        self.mimetype = mimetype;
        self.filename = Some(filename);

        Ok(())
    }
}
