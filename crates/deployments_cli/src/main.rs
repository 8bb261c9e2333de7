//! Startup entry point for the images storage.
//!
//! # Responsibility
//! - Open the deployment database under a data directory.
//! - Provision storage indexes once, before any request is served.
//!
//! Usage: `deployments_cli <data_dir> [log_dir]`
//!
//! A relative `log_dir` is resolved against the working directory.

use deployments_core::{default_log_level, init_logging, Database, SoftwareImagesStorage};
use log::info;
use std::error::Error;
use std::path::{absolute, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("deployments_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let data_dir = args
        .next()
        .ok_or("usage: deployments_cli <data_dir> [log_dir]")?;

    if let Some(log_dir) = args.next() {
        let log_dir = resolve_log_dir(&log_dir)?;
        let log_dir = log_dir
            .to_str()
            .ok_or("log_dir is not valid UTF-8 once resolved")?;
        init_logging(default_log_level(), log_dir)?;
    }

    let storage = SoftwareImagesStorage::new(Database::open_in_dir(&data_dir)?);
    storage.index_storage()?;

    let images = storage.find_all()?;
    info!(
        "event=startup module=cli status=ok images={}",
        images.len()
    );
    println!("deployments_core version={}", deployments_core::core_version());
    println!("images={}", images.len());
    Ok(())
}

fn resolve_log_dir(arg: &str) -> std::io::Result<PathBuf> {
    absolute(arg)
}
