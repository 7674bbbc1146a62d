//! Dialog model: classification, content location, integrity and video metadata

pub mod content;
pub mod dialog;
pub mod integrity;
pub mod kind;
pub mod locator;
pub mod party_history;
pub mod transcode;
pub mod validation;
pub mod video;

pub use dialog::{Dialog, DialogBuilder, Metadata};
