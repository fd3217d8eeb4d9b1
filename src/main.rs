mod adapter;
mod archive;
mod config;
mod error;
mod progress;
mod remote;
mod services;
mod transport;
mod util;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::DeployConfig;
use crate::error::Result;
use crate::progress::{ESEQ_RED, ESEQ_RESET};
use crate::services::deploy::run_deploy;

#[tokio::main]
async fn main() -> ExitCode {
    println!("⚙️ Begin deploy");

    let outcome = match load_config() {
        Ok(config) => run_deploy(&config).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(()) => {
            println!("✅ Deploy complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{ESEQ_RED}❌ Deployment failed: {err}{ESEQ_RESET}");
            ExitCode::FAILURE
        }
    }
}

/// A single argument names a YAML configuration file; with no arguments the
/// `INPUT_*` environment is read, which is how a CI action invokes us.
fn load_config() -> Result<DeployConfig> {
    match env::args_os().nth(1) {
        Some(path) => DeployConfig::from_file(&PathBuf::from(path)),
        None => DeployConfig::from_env(),
    }
}
