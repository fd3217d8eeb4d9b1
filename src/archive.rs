use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use uuid::Uuid;

use crate::adapter::exec::{self, CommandSpec};
use crate::adapter::fs::ArchiveInputs;
use crate::error::{DeployError, Result};

/// The compressed tarball for one run. Lives in its own temporary directory
/// so the local copy is released on every exit path.
pub struct Archive {
    _dir: TempDir,
    path: PathBuf,
    file_name: String,
}

impl Archive {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Basename used for the remote copy as well.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Runs `tar -czf` over the resolved inputs. A per-run uuid in the file name
/// keeps concurrent runs on the same remote directory from clobbering each
/// other's upload.
pub async fn build(inputs: &ArchiveInputs, timeout: Duration) -> Result<Archive> {
    let dir = TempDir::with_prefix("scp-deploy-archive-")
        .map_err(DeployError::io("creating archive directory"))?;
    let file_name = format!("deploy-{}.tar.gz", Uuid::new_v4());
    let path = dir.path().join(&file_name);

    let cwd = env::current_dir().map_err(DeployError::io("reading current directory"))?;
    let spec = CommandSpec::new("tar").args(tar_args(&path, inputs, &cwd));
    exec::run(&spec, timeout).await?;

    Ok(Archive {
        _dir: dir,
        path,
        file_name,
    })
}

fn tar_args(archive: &Path, inputs: &ArchiveInputs, cwd: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-czf".into(), archive.into()];

    match inputs {
        ArchiveInputs::Staged { root } => {
            args.extend(["-C".into(), root.path().into(), ".".into()]);
        }
        ArchiveInputs::Direct { local_dir, files } => {
            if let Some(dir) = local_dir {
                args.extend(["-C".into(), dir.into(), ".".into()]);
            }
            if !files.is_empty() {
                if local_dir.is_some() {
                    // -C is sticky; point tar back at the invocation
                    // directory before the explicit paths.
                    args.extend(["-C".into(), cwd.into()]);
                }
                args.extend(files.iter().map(OsString::from));
            }
        }
    }

    args
}
