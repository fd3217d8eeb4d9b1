use std::sync::OnceLock;

use regex::Regex;

use crate::adapter::exec;
use crate::archive::Archive;
use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::transport::Transport;
use crate::util::sh_quote;

const DIGEST_PATTERN: &str = r"^([0-9a-f]{64})[ \t*]";

static DIGEST_REGEX: OnceLock<Regex> = OnceLock::new();

/// Compares the local archive digest with the remote `sha256sum` of the
/// uploaded copy, before extraction. A truncated or corrupted upload is
/// caught here instead of producing a half-written destination tree.
pub async fn verify(transport: &Transport, archive: &Archive, config: &DeployConfig) -> Result<()> {
    let local = sha256::try_digest(archive.path())
        .map_err(DeployError::io("hashing local archive"))?;

    let remote_path = format!(
        "{}/{}",
        config.remote_dir.trim_end_matches('/'),
        archive.file_name()
    );
    let spec = transport.remote_command(&format!("sha256sum {}", sh_quote(&remote_path)));
    let output = exec::run(&spec, config.step_timeout).await?;

    let remote = parse_digest(&output.stdout)
        .ok_or_else(|| DeployError::RemoteDigest(output.stdout.clone()))?;

    if remote == local {
        Ok(())
    } else {
        Err(DeployError::IntegrityMismatch { local, remote })
    }
}

fn parse_digest(output: &str) -> Option<String> {
    let regex = DIGEST_REGEX.get_or_init(|| Regex::new(DIGEST_PATTERN).expect("valid pattern"));

    output
        .lines()
        .find_map(|line| regex.captures(line.trim_start()))
        .map(|capture| capture[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae";

    #[test]
    fn parses_sha256sum_output() {
        let output = format!("{DIGEST}  /srv/app/deploy-1.tar.gz\n");
        assert_eq!(parse_digest(&output).as_deref(), Some(DIGEST));
    }

    #[test]
    fn parses_binary_mode_marker() {
        let output = format!("{DIGEST} */srv/app/deploy-1.tar.gz\n");
        assert_eq!(parse_digest(&output).as_deref(), Some(DIGEST));
    }

    #[test]
    fn rejects_short_or_non_hex_lines() {
        assert_eq!(parse_digest("sha256sum: missing file\n"), None);
        assert_eq!(parse_digest("deadbeef  x\n"), None);
    }

    #[test]
    fn local_digest_matches_known_value() {
        // sha256 of "foo"
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        std::fs::write(&path, "foo").unwrap();
        assert_eq!(sha256::try_digest(path.as_path()).unwrap(), DIGEST);
    }
}
