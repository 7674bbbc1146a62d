//! vCon dialog tool
//!
//! Inspect, sign and inline dialog fragments stored as JSON files

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use vcon_dialog::{Classify, Config, Dialog, HttpFetcher};

#[derive(Parser, Debug)]
#[command(name = "vcon-dialog")]
#[command(about = "Inspect and transform vCon dialog fragments")]
struct Args {
    /// Fetch settings (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print classification and integrity status
    Inspect {
        /// Dialog JSON file
        file: PathBuf,
    },

    /// Download external content and embed it
    Inline {
        /// Dialog JSON file
        file: PathBuf,

        /// Output path [default: overwrite input]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Attach a local file as signed inline content
    Sign {
        /// Dialog JSON file
        file: PathBuf,

        /// File whose text becomes the dialog body
        #[arg(short, long)]
        body: PathBuf,

        #[arg(long)]
        filename: Option<String>,

        #[arg(long)]
        mimetype: Option<String>,
    },
}

fn load_dialog(path: &Path) -> anyhow::Result<Dialog> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    Dialog::from_json(&text).with_context(|| format!("parsing dialog {:?}", path))
}

fn save_dialog(dialog: &mut Dialog, path: &Path) -> anyhow::Result<()> {
    let json = dialog.to_json()?;
    fs::write(path, json).with_context(|| format!("writing {:?}", path))?;
    info!("Wrote {:?}", path);
    Ok(())
}

fn fetcher(config: Option<&Path>) -> anyhow::Result<HttpFetcher> {
    let config = match config {
        Some(path) => Config::load(path).with_context(|| format!("loading config {:?}", path))?,
        None => Config::default(),
    };
    Ok(HttpFetcher::new(config.fetch)?)
}

fn inspect(dialog: &Dialog) {
    println!("type:        {}", dialog.dialog_type());
    println!("start:       {}", dialog.start().map(|s| s.as_str()).unwrap_or("-"));
    println!("parties:     {:?}", dialog.parties);
    println!("mimetype:    {}", dialog.mimetype().unwrap_or("-"));
    println!("filename:    {}", dialog.filename.as_deref().unwrap_or("-"));
    println!(
        "location:    {}",
        if dialog.is_external() { "external" } else { "inline" }
    );
    if let Some(url) = dialog.url() {
        println!("url:         {}", url);
    }
    println!("text:        {}", dialog.is_text());
    println!("recording:   {}", dialog.is_recording());
    println!("audio:       {}", dialog.is_audio());
    println!("video:       {}", dialog.is_video());
    println!("email:       {}", dialog.is_email());
    println!("integrity:   {:?}", dialog.verify());
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Inspect { file } => {
            let dialog = load_dialog(&file)?;
            inspect(&dialog);
        }
        Command::Inline { file, output } => {
            let mut dialog = load_dialog(&file)?;
            if !dialog.is_external() {
                info!("{:?} is already inline", file);
            }
            let fetcher = fetcher(args.config.as_deref())?;
            dialog.to_inline_data(&fetcher)?;
            save_dialog(&mut dialog, output.as_deref().unwrap_or(&file))?;
        }
        Command::Sign {
            file,
            body,
            filename,
            mimetype,
        } => {
            if args.config.is_some() {
                info!("--config has no effect on sign");
            }
            let text = fs::read_to_string(&body)
                .with_context(|| format!("reading body {:?}", body))?;
            if text.is_empty() {
                bail!("body file {:?} is empty", body);
            }
            let mut dialog = load_dialog(&file)?;
            let filename = filename.or_else(|| {
                body.file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_string)
            });
            dialog.attach_inline(text, filename.as_deref(), mimetype.as_deref());
            info!("Signed {:?}: {}", file, dialog.signature().unwrap_or(""));
            save_dialog(&mut dialog, &file)?;
        }
    }

    Ok(())
}
