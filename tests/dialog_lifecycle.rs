//! End-to-end dialog workflows: attach, promote, verify, serialize

mod common;

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use common::MemoryFetcher;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use vcon_dialog::{
    Classify, Dialog, DialogError, Metadata, Result, Verification, VideoOptions, VideoSource,
};

fn assert_single_location(dialog: &Dialog) {
    assert_ne!(dialog.is_inline(), dialog.is_external());
}

#[test]
fn test_hello_inline_scenario() -> Result<()> {
    let mut dialog = Dialog::new("text", "2024-01-01T00:00:00Z", vec![0, 1])?;
    dialog.attach_inline("hello", Some("a.txt"), Some("text/plain"));

    let decoded = URL_SAFE
        .decode(dialog.signature().unwrap())
        .expect("signature is base64url");
    assert_eq!(decoded, Sha256::digest(b"hello").to_vec());
    assert!(dialog.is_inline());
    assert!(!dialog.is_content_changed());
    Ok(())
}

#[test]
fn test_clip_mov_scenario() -> Result<()> {
    let fetcher = MemoryFetcher::new().serve("https://x/clip.mov", "video/quicktime", vec![0u8; 64]);
    let mut dialog = Dialog::new("video", chrono::Utc::now(), vec![0])?;

    dialog.add_video_data(
        &fetcher,
        VideoSource::External("https://x/clip.mov".to_string()),
        None,
        VideoOptions::new(),
    )?;

    assert_eq!(dialog.mimetype(), Some("video/quicktime"));
    assert_eq!(dialog.filename.as_deref(), Some("clip.mov"));
    assert!(dialog.is_video());
    assert_eq!(*fetcher.requests.borrow(), vec!["HEAD https://x/clip.mov"]);
    Ok(())
}

#[test]
fn test_external_recording_promoted_to_inline() -> Result<()> {
    let audio = b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec();
    let fetcher = MemoryFetcher::new().serve("https://media/call-17.wav", "audio/wav", audio.clone());

    let mut dialog = Dialog::new("recording", "2024-03-05T10:00:00Z", vec![0, 1])?;
    dialog.attach_external(&fetcher, "https://media/call-17.wav", None, None)?;
    assert_single_location(&dialog);
    assert!(dialog.is_external());
    assert!(dialog.is_audio());
    assert_eq!(dialog.verify(), Verification::Unverifiable);
    assert!(dialog.is_content_changed());

    let external = dialog.to_dict()?;
    assert!(!external.contains_key("body"));
    assert!(!external.contains_key("signature"));
    assert_eq!(external["alg"], "external-reference");

    dialog.to_inline_data(&fetcher)?;
    assert_single_location(&dialog);
    assert_eq!(dialog.encoding().map(|e| e.as_str()), Some("base64url"));
    assert_eq!(dialog.verify(), Verification::Verified);

    let inline = dialog.to_dict()?;
    assert!(!inline.contains_key("url"));
    assert_eq!(inline["alg"], "sha256");
    assert_eq!(inline["filename"], "call-17.wav");

    // Second conversion is a no-op and does not hit the network
    let requests = fetcher.requests.borrow().len();
    let before = dialog.clone();
    dialog.to_inline_data(&fetcher)?;
    assert_eq!(dialog, before);
    assert_eq!(fetcher.requests.borrow().len(), requests);
    Ok(())
}

#[test]
fn test_missing_resource_reports_status() -> Result<()> {
    let fetcher = MemoryFetcher::new();
    let mut dialog = Dialog::new("recording", "2024-03-05T10:00:00Z", vec![0])?;

    let err = dialog
        .attach_external(&fetcher, "https://media/gone.wav", None, None)
        .unwrap_err();
    assert!(matches!(err, DialogError::Fetch { status: 404, .. }));
    assert!(dialog.is_inline());
    assert_eq!(dialog.body(), None);
    Ok(())
}

#[test]
fn test_tampered_body_detected() -> Result<()> {
    let mut dialog = Dialog::new("text", "2024-01-01T00:00:00Z", vec![0, 1])?;
    dialog.attach_inline("original words", None, Some("text/plain"));

    let mut dict = dialog.to_dict()?;
    dict.insert("body".to_string(), Value::from("altered words"));
    let tampered = Dialog::from_dict(dict)?;

    assert_eq!(tampered.verify(), Verification::Tampered);
    assert!(tampered.is_content_changed());
    Ok(())
}

#[test]
fn test_json_round_trip_keeps_everything() -> Result<()> {
    let mut meta = Metadata::new();
    meta.insert("source".to_string(), json!("ivr"));

    let mut dialog = Dialog::builder("transfer")
        .start("2024-06-01 09:30:00")
        .parties(vec![0, 1, 2])
        .originator(0)
        .transferee(0)
        .transferor(1)
        .transfer_target(2)
        .campaign("spring")
        .metadata(meta)
        .extension("x-queue", json!("billing"))
        .build()?;

    let text = dialog.to_json()?;
    let mut restored = Dialog::from_json(&text)?;

    assert_eq!(restored, dialog);
    assert!(restored.is_transfer());
    assert_eq!(restored.start().map(|s| s.as_str()), Some("2024-06-01T09:30:00Z"));
    assert_eq!(restored.extension("x-queue"), Some(&json!("billing")));

    let dict = restored.to_dict()?;
    assert_eq!(dict["meta"], dict["metadata"]);
    Ok(())
}

#[test]
fn test_incomplete_needs_disposition() {
    let err = Dialog::builder("incomplete")
        .start("2024-01-01T00:00:00Z")
        .build()
        .unwrap_err();
    assert!(matches!(err, DialogError::MissingDisposition));

    let dialog = Dialog::builder("incomplete")
        .start("2024-01-01T00:00:00Z")
        .disposition("no-answer")
        .build()
        .unwrap();
    assert!(dialog.is_incomplete());
}

#[test]
fn test_video_metadata_workflow() -> Result<()> {
    let mut dialog = Dialog::new("video", "2024-01-01T00:00:00Z", vec![0, 1])?;
    dialog.add_video_data(
        &MemoryFetcher::new(),
        VideoSource::Inline("AAAAGGZ0eXBtcDQy".to_string()),
        None,
        VideoOptions::new()
            .with_filename("screen.webm")
            .with_resolution("1920x1080"),
    )?;
    assert_eq!(dialog.mimetype(), Some("video/webm"));
    assert_single_location(&dialog);

    let mut update = Metadata::new();
    update.insert("codec".to_string(), json!("vp9"));
    update.insert("frame_rate".to_string(), json!(30.0));
    dialog.update_video_metadata(update);

    let extracted = dialog.extract_video_metadata();
    assert_eq!(extracted["resolution"], "1920x1080");
    assert_eq!(extracted["codec"], "vp9");
    assert_eq!(extracted["frame_rate"], 30.0);
    assert_eq!(dialog.meta(), dialog.metadata());
    Ok(())
}
