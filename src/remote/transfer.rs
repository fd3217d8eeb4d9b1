use crate::adapter::exec;
use crate::archive::Archive;
use crate::config::DeployConfig;
use crate::error::Result;
use crate::transport::Transport;
use crate::util::sh_quote;

/// Ensures the destination directory exists, purging its contents first when
/// the destructive flag was opted into. One round trip either way.
pub async fn prepare(transport: &Transport, config: &DeployConfig) -> Result<()> {
    let command = prepare_command(&config.remote_dir, config.clean_remote);
    exec::run(&transport.remote_command(&command), config.step_timeout).await?;
    Ok(())
}

/// Copies the archive into the prepared remote directory.
pub async fn upload(transport: &Transport, archive: &Archive, config: &DeployConfig) -> Result<()> {
    let spec = transport.upload_command(archive.path(), &config.remote_dir);
    exec::run(&spec, config.step_timeout).await?;
    Ok(())
}

/// Unpacks the uploaded archive in place and removes the remote copy. The
/// removal is chained with `&&` so a failed extraction leaves the archive
/// behind for inspection.
pub async fn extract_and_clean(
    transport: &Transport,
    archive: &Archive,
    config: &DeployConfig,
) -> Result<()> {
    let command = extract_command(&config.remote_dir, archive.file_name());
    exec::run(&transport.remote_command(&command), config.step_timeout).await?;
    Ok(())
}

fn prepare_command(remote_dir: &str, clean: bool) -> String {
    let dir = sh_quote(remote_dir);
    if clean {
        // the glob sits outside the quotes so the remote shell expands it
        format!("mkdir -p {dir} && rm -rf {dir}/*")
    } else {
        format!("mkdir -p {dir}")
    }
}

fn extract_command(remote_dir: &str, archive_name: &str) -> String {
    let dir = sh_quote(remote_dir);
    let name = sh_quote(archive_name);
    format!("cd {dir} && tar -xzf {name} && rm -f {name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_without_clean_only_creates() {
        assert_eq!(
            prepare_command("/var/www/app", false),
            "mkdir -p '/var/www/app'"
        );
    }

    #[test]
    fn prepare_with_clean_purges_contents_not_the_directory() {
        assert_eq!(
            prepare_command("/var/www/app", true),
            "mkdir -p '/var/www/app' && rm -rf '/var/www/app'/*"
        );
    }

    #[test]
    fn prepare_quotes_hostile_directory_names() {
        let command = prepare_command("/srv/a; rm -rf /", false);
        assert_eq!(command, "mkdir -p '/srv/a; rm -rf /'");
    }

    #[test]
    fn extraction_chains_removal_behind_success() {
        assert_eq!(
            extract_command("/srv/app", "deploy-1.tar.gz"),
            "cd '/srv/app' && tar -xzf 'deploy-1.tar.gz' && rm -f 'deploy-1.tar.gz'"
        );
    }
}
