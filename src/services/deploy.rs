use crate::adapter::fs::resolve_sources;
use crate::archive;
use crate::config::DeployConfig;
use crate::error::Result;
use crate::progress::with_step;
use crate::remote::{integrity, transfer};
use crate::transport::Transport;

/// The whole pipeline, strictly sequential: transport selection, source
/// resolution, archiving, remote preparation, upload, verification,
/// extraction. The first failure aborts the run; the temporary key file,
/// staging root and local archive are released by their guards on every
/// path out of here.
pub async fn run_deploy(config: &DeployConfig) -> Result<()> {
    let transport = Transport::new(config)?;
    println!(
        "🔑 Using {} to deploy as {}",
        transport.describe(),
        transport.destination()
    );

    let inputs = with_step("Collecting sources", async { resolve_sources(config) }).await?;

    let archive = with_step(
        "Archiving files",
        archive::build(&inputs, config.step_timeout),
    )
    .await?;

    with_step(
        format!("Preparing remote directory {}", config.remote_dir),
        transfer::prepare(&transport, config),
    )
    .await?;

    with_step(
        format!(
            "Uploading {} to {}:{}",
            archive.file_name(),
            transport.destination(),
            config.remote_dir
        ),
        transfer::upload(&transport, &archive, config),
    )
    .await?;

    with_step(
        "Verifying uploaded archive",
        integrity::verify(&transport, &archive, config),
    )
    .await?;

    with_step(
        "Extracting on remote and cleaning up",
        transfer::extract_and_clean(&transport, &archive, config),
    )
    .await?;

    Ok(())
}
