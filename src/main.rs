// src/main.rs

use anyhow::Result;
use clipcanvas::storage::{self, operations};
use clipcanvas::{
    list_workspace, reference, ClassificationCache, Classifier, ClassifyInput, ClipboardSnapshot, ErrorResult,
    Outcome, Settings, StorageItem,
};
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage:
  clipcanvas classify <path>...
  clipcanvas link <target> <dir>
  clipcanvas copy <source> <destination>
  clipcanvas paste-text <text>
  clipcanvas ls <workspace.infinitecanvas>
  clipcanvas rm <path>
  clipcanvas mv <path> <new name>";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        eprintln!("{}", USAGE);
        return Ok(());
    };

    let settings = Settings::load().await;
    let classifier = Classifier::new(settings.classifier_settings());
    tracing::debug!("Settings: {:?}", settings);

    let status = match (command.as_str(), rest) {
        ("classify", paths) if !paths.is_empty() => {
            for path in paths {
                let content_type = classifier.classify_path(&PathBuf::from(path)).await;
                println!("{}\t{}", path, content_type);
            }
            ErrorResult::SUCCESS
        }
        ("link", [target, dir]) => match StorageItem::from_path(target).await {
            Outcome::Success(item) => match reference::create_reference(&PathBuf::from(dir), &item).await {
                Outcome::Success(marker) => {
                    println!("{}", marker.path().display());
                    ErrorResult::SUCCESS
                }
                Outcome::Failure(details) => details,
            },
            Outcome::Failure(details) => details,
        },
        ("copy", [source, destination]) => copy(source, destination, settings.copy_block_size).await,
        ("paste-text", [text]) => {
            let snapshot = ClipboardSnapshot::new().with_text(text.clone());
            println!("{}", classifier.classify(ClassifyInput::Clipboard(&snapshot), None).await);
            ErrorResult::SUCCESS
        }
        ("ls", [folder]) => {
            let cache = ClassificationCache::new();
            match list_workspace(&PathBuf::from(folder), &classifier, Some(&cache)).await {
                Outcome::Success(entries) => {
                    for entry in entries {
                        println!("{}\t{}", entry.item.name(), entry.content_type);
                    }
                    ErrorResult::SUCCESS
                }
                Outcome::Failure(details) => details,
            }
        }
        ("rm", [path]) => remove(path, &settings).await,
        ("mv", [path, new_name]) => rename(path, new_name, &settings).await,
        _ => {
            eprintln!("{}", USAGE);
            return Ok(());
        }
    };

    if status.is_failure() {
        tracing::error!("{}", status);
        std::process::exit(1);
    }
    Ok(())
}

async fn copy(source: &str, destination: &str, block_size: usize) -> ErrorResult {
    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, cancelling copy");
            ctrl_c_token.cancel();
        }
    });

    let destination = PathBuf::from(destination);
    let status = operations::copy_file_with_block_size(
        &PathBuf::from(source),
        &destination,
        block_size,
        |percent| {
            eprint!("\r{:5.1}%", percent);
            let _ = std::io::stderr().flush();
        },
        &token,
    )
    .await;
    eprintln!();

    if status.is_cancelled() {
        // A cancelled copy leaves a partial file behind.
        let partial = StorageItem::File(destination);
        let cleanup = storage::delete_item(Some(&partial), true).await;
        if cleanup.is_failure() {
            tracing::warn!("Could not remove partial copy: {}", cleanup);
        }
    }
    status
}

/// Delete `path`, to the trash unless the settings ask for a permanent delete.
async fn remove(path: &str, settings: &Settings) -> ErrorResult {
    match StorageItem::from_path(path).await {
        Outcome::Success(item) => storage::delete_item(Some(&item), settings.delete_permanently).await,
        Outcome::Failure(details) => details,
    }
}

async fn rename(path: &str, new_name: &str, settings: &Settings) -> ErrorResult {
    let item = match StorageItem::from_path(path).await {
        Outcome::Success(item) => item,
        Outcome::Failure(details) => return details,
    };
    match storage::rename_item(&item, new_name, settings.rename_collision).await {
        Outcome::Success(renamed) => {
            println!("{}", renamed.path().display());
            ErrorResult::SUCCESS
        }
        Outcome::Failure(details) => details,
    }
}
