//! Export a page's persisted ink as PNG.

use clap::Parser;
use pageink_app::{EditorError, export_page};
use pageink_core::config::EditorConfig;
use pageink_core::storage::{FileStorage, PageKey};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, thiserror::Error)]
enum ExportError {
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Parser, Debug)]
#[command(name = "pageink-export", about = "Render a page's saved ink layer to PNG")]
struct Args {
    /// Directory holding the page records.
    storage_dir: PathBuf,
    /// Document identifier.
    document: String,
    /// Page number, starting at 1.
    page: u32,
    /// Output width in pixels.
    width: u32,
    /// Output height in pixels.
    height: u32,
    /// Destination PNG file.
    out: PathBuf,
}

fn run(args: &Args) -> Result<(), ExportError> {
    let key = PageKey::new(args.document.as_str(), args.page);
    let storage = FileStorage::new(args.storage_dir.clone()).map_err(EditorError::from)?;
    let png = export_page(&storage, &key, args.width, args.height, &EditorConfig::default())?;
    std::fs::write(&args.out, &png).map_err(|source| ExportError::Write {
        path: args.out.clone(),
        source,
    })?;
    log::info!("wrote {} ({} bytes)", args.out.display(), png.len());
    Ok(())
}

fn main() -> ExitCode {
    #[cfg(feature = "native")]
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
