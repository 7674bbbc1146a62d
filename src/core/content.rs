//! Content location: inline bodies versus external references
//!
//! A dialog is always in exactly one of two states. [`Content::Inline`] holds
//! an embedded body (possibly none, for fragments such as transfers), and
//! [`Content::External`] holds a URL. Transitions replace the whole variant.

use crate::core::integrity::{self, Verification};
use crate::error::{DialogError, Result};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Body encoding written to `encoding`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Body is plain text
    None,
    /// Body is URL-safe base64
    Base64Url,
    /// Body is a JSON document
    Json,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::None => "none",
            Encoding::Base64Url => "base64url",
            Encoding::Json => "json",
        }
    }
}

impl FromStr for Encoding {
    type Err = DialogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Encoding::None),
            "base64url" => Ok(Encoding::Base64Url),
            "json" => Ok(Encoding::Json),
            other => Err(DialogError::invalid_field(
                "encoding",
                format!("'{other}' (must be one of: none, base64url, json)"),
            )),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Algorithm and signature over an inline body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seal {
    pub alg: String,
    pub signature: String,
}

impl Seal {
    /// SHA-256 seal over `content`
    pub fn sha256(content: &[u8]) -> Self {
        Seal {
            alg: integrity::SHA256_ALG.to_string(),
            signature: integrity::sign(content),
        }
    }
}

/// Embedded body with its encoding and optional seal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineBody {
    pub body: String,
    pub encoding: Option<Encoding>,
    pub seal: Option<Seal>,
}

impl InlineBody {
    /// Body signed over its own text bytes, as written by the inline attach path
    pub fn signed_text(body: String) -> Self {
        let seal = Seal::sha256(body.as_bytes());
        InlineBody {
            body,
            encoding: Some(Encoding::Base64Url),
            seal: Some(seal),
        }
    }

    /// Check the seal against the body
    ///
    /// The digest is compared against the body text. When the body is
    /// base64url encoded its decoded payload is accepted too, since fetched
    /// binary content is signed before encoding.
    pub fn verify(&self) -> Verification {
        let Some(seal) = &self.seal else {
            return Verification::Unverifiable;
        };

        let decoded = match self.encoding {
            Some(Encoding::Base64Url) => integrity::decode_base64url(&self.body),
            _ => None,
        };

        let mut candidates = vec![self.body.as_bytes()];
        if let Some(bytes) = decoded.as_deref() {
            candidates.push(bytes);
        }

        integrity::verify(&seal.alg, &seal.signature, candidates)
    }
}

/// Reference to content stored elsewhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRef {
    pub url: String,
    /// `external-reference` once head metadata has been retrieved
    pub alg: Option<String>,
    pub encoding: Option<Encoding>,
}

impl ExternalRef {
    pub fn new(url: impl Into<String>) -> Self {
        ExternalRef {
            url: url.into(),
            alg: None,
            encoding: None,
        }
    }

    /// Reference whose head metadata has been retrieved
    pub fn resolved(url: impl Into<String>) -> Self {
        ExternalRef {
            url: url.into(),
            alg: Some(integrity::EXTERNAL_REFERENCE_ALG.to_string()),
            encoding: Some(Encoding::None),
        }
    }
}

/// Where a dialog's content lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Embedded content; `None` for fragments without a body
    Inline(Option<InlineBody>),
    /// Content behind a URL
    External(ExternalRef),
}

impl Default for Content {
    fn default() -> Self {
        Content::Inline(None)
    }
}

impl Content {
    pub fn is_external(&self) -> bool {
        matches!(self, Content::External(_))
    }

    pub fn is_inline(&self) -> bool {
        !self.is_external()
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            Content::Inline(Some(inline)) => Some(&inline.body),
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Content::External(external) => Some(&external.url),
            Content::Inline(_) => None,
        }
    }

    pub fn encoding(&self) -> Option<Encoding> {
        match self {
            Content::Inline(Some(inline)) => inline.encoding,
            Content::Inline(None) => None,
            Content::External(external) => external.encoding,
        }
    }

    pub fn alg(&self) -> Option<&str> {
        match self {
            Content::Inline(Some(InlineBody {
                seal: Some(seal), ..
            })) => Some(&seal.alg),
            Content::Inline(_) => None,
            Content::External(external) => external.alg.as_deref(),
        }
    }

    pub fn signature(&self) -> Option<&str> {
        match self {
            Content::Inline(Some(InlineBody {
                seal: Some(seal), ..
            })) => Some(&seal.signature),
            _ => None,
        }
    }

    /// Verify inline content; external content has no local body to hash
    pub fn verify(&self) -> Verification {
        match self {
            Content::Inline(Some(inline)) => inline.verify(),
            _ => Verification::Unverifiable,
        }
    }

    /// Assemble content from explicitly supplied wire fields
    pub(crate) fn from_parts(
        body: Option<String>,
        url: Option<String>,
        encoding: Option<String>,
        alg: Option<String>,
        signature: Option<String>,
    ) -> Result<Self> {
        let encoding = encoding.as_deref().map(str::parse::<Encoding>).transpose()?;

        match (body, url) {
            (Some(_), Some(_)) => Err(DialogError::invalid_field(
                "url",
                "a dialog cannot carry both an inline body and an external url",
            )),
            (None, Some(url)) => {
                if signature.is_some() {
                    return Err(DialogError::invalid_field(
                        "signature",
                        "external references carry no signature",
                    ));
                }
                Ok(Content::External(ExternalRef { url, alg, encoding }))
            }
            (Some(body), None) => {
                let seal = match (alg, signature) {
                    (Some(alg), Some(signature)) => Some(Seal { alg, signature }),
                    (None, None) => None,
                    (Some(_), None) => {
                        return Err(DialogError::invalid_field(
                            "signature",
                            "alg supplied without a signature",
                        ))
                    }
                    (None, Some(_)) => {
                        return Err(DialogError::invalid_field(
                            "alg",
                            "signature supplied without an alg",
                        ))
                    }
                };
                Ok(Content::Inline(Some(InlineBody {
                    body,
                    encoding,
                    seal,
                })))
            }
            (None, None) => {
                if encoding.is_some() || alg.is_some() || signature.is_some() {
                    return Err(DialogError::invalid_field(
                        "body",
                        "encoding, alg and signature require a body or url",
                    ));
                }
                Ok(Content::Inline(None))
            }
        }
    }
}

/// Last path segment of a URL, without query string or fragment
///
/// Absolute URLs go through [`Url`]; anything that does not parse is split
/// on `?`, `#` and `/` directly.
///
/// # Examples
///
/// ```
/// use vcon_dialog::core::content::filename_from_url;
///
/// assert_eq!(filename_from_url("https://x/media/clip.mov?sig=abc"), "clip.mov");
/// assert_eq!(filename_from_url("https://x/clip.mov#t=5"), "clip.mov");
/// assert_eq!(filename_from_url("clip.mov"), "clip.mov");
/// ```
pub fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = Url::parse(url) {
        if let Some(last) = parsed.path_segments().and_then(|segments| segments.last()) {
            return last.to_string();
        }
    }

    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path).to_string()
}
