use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use toc_tracker::config::Config;
use toc_tracker::outline::{render_markdown, Outline};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

mod app;
mod ui;

use app::App;

/// Largest document the reader will open (10 MB).
const MAX_DOCUMENT_SIZE: u64 = 10 * 1024 * 1024;

/// Get the config directory path (~/.config/toc-reader/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("toc-reader"))
}

#[derive(Parser, Debug)]
#[command(
    name = "toc-reader",
    about = "Terminal markdown reader with a live table of contents"
)]
struct Args {
    /// Markdown file to open
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Config file (default: ~/.config/toc-reader/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the extracted outline as JSON and exit
    #[arg(long)]
    outline: bool,
}

fn read_document(path: &Path) -> Result<String> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to open '{}'", path.display()))?;
    if !metadata.is_file() {
        anyhow::bail!("'{}' is not a regular file", path.display());
    }
    if metadata.len() > MAX_DOCUMENT_SIZE {
        anyhow::bail!(
            "'{}' is {} bytes (max {} bytes)",
            path.display(),
            metadata.len(),
            MAX_DOCUMENT_SIZE
        );
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}' as UTF-8 text", path.display()))
}

/// Pick the log destination.
///
/// `--outline` logs to stderr next to the JSON on stdout. The TUI owns the
/// terminal, so it logs to `~/.config/toc-reader/toc-reader.log`, or nowhere
/// if that file cannot be opened.
fn log_writer(outline: bool) -> BoxMakeWriter {
    if outline {
        return BoxMakeWriter::new(std::io::stderr);
    }
    match open_log_file() {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(_) => BoxMakeWriter::new(std::io::sink),
    }
}

fn log_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("toc-reader.log"))
}

fn open_log_file() -> Result<File> {
    let path = log_path()?;
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create '{}'", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file '{}'", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(log_writer(args.outline))
        .with_ansi(args.outline)
        .init();

    let markdown = read_document(&args.file)?;

    if args.outline {
        let document = render_markdown(&markdown);
        let outline = Outline::extract(Some(&document));
        let json = serde_json::to_string_pretty(outline.entries())
            .context("Failed to serialize outline")?;
        println!("{}", json);
        return Ok(());
    }

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path.display()))?;

    let source = args.file.display().to_string();
    let title = args
        .file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.clone());

    let mut app = App::new(config, title, source, &markdown);
    tracing::info!(
        headings = app.tracker.outline().len(),
        file = %args.file.display(),
        "Opened document"
    );

    ui::run(&mut app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_sits_beside_config() {
        let Ok(dir) = get_config_dir() else {
            return;
        };
        assert_eq!(log_path().unwrap(), dir.join("toc-reader.log"));
    }

    #[test]
    fn test_outline_args_parse() {
        let args = Args::try_parse_from(["toc-reader", "notes.md", "--outline"]).unwrap();
        assert!(args.outline);
        assert_eq!(args.file, PathBuf::from("notes.md"));

        let args = Args::try_parse_from(["toc-reader", "notes.md"]).unwrap();
        assert!(!args.outline);
    }
}
