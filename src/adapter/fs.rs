use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

use crate::config::{ArchiveStrategy, DeployConfig};
use crate::error::{DeployError, Result, SourceProblem};

/// The validated set of filesystem entries the archiver will consume.
#[derive(Debug)]
pub enum ArchiveInputs {
    /// Sources were copied into a clean staging root; archiving its contents
    /// yields members with no leading directory segment. Dropping the value
    /// removes the staging tree.
    Staged { root: TempDir },
    /// Sources are handed to tar as configured, without normalization.
    Direct {
        local_dir: Option<PathBuf>,
        files: Vec<PathBuf>,
    },
}

/// Validates the configured sources and, under the staged strategy, copies
/// them into a temporary root. All validation happens before anything is
/// copied, so a bad path aborts the run without half-built staging state.
pub fn resolve_sources(config: &DeployConfig) -> Result<ArchiveInputs> {
    if let Some(dir) = &config.local_dir {
        validate_dir(dir)?;
    }
    for file in &config.files {
        validate_exists(file)?;
    }

    match config.strategy {
        ArchiveStrategy::Direct => {
            let has_dir_content = match &config.local_dir {
                Some(dir) => !dir_is_empty(dir)?,
                None => false,
            };
            if !has_dir_content && config.files.is_empty() {
                return Err(DeployError::EmptySourceSet);
            }

            Ok(ArchiveInputs::Direct {
                local_dir: config.local_dir.clone(),
                files: config.files.clone(),
            })
        }
        ArchiveStrategy::Staged => {
            let root = TempDir::with_prefix("scp-deploy-stage-")
                .map_err(DeployError::io("creating staging directory"))?;

            let mut staged = 0usize;
            if let Some(dir) = &config.local_dir {
                let entries = fs::read_dir(dir)
                    .map_err(DeployError::io(format!("reading {}", dir.display())))?;
                for entry in entries {
                    let entry =
                        entry.map_err(DeployError::io(format!("reading {}", dir.display())))?;
                    copy_entry(&entry.path(), &root.path().join(entry.file_name()))?;
                    staged += 1;
                }
            }
            for file in &config.files {
                let name = file.file_name().ok_or_else(|| {
                    DeployError::Config(format!("cannot stage {}: no file name", file.display()))
                })?;
                copy_entry(file, &root.path().join(name))?;
                staged += 1;
            }

            if staged == 0 {
                return Err(DeployError::EmptySourceSet);
            }

            Ok(ArchiveInputs::Staged { root })
        }
    }
}

fn validate_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(DeployError::SourcePath {
            path: path.to_path_buf(),
            problem: SourceProblem::Missing,
        })
    }
}

fn validate_dir(path: &Path) -> Result<()> {
    validate_exists(path)?;
    if path.is_dir() {
        Ok(())
    } else {
        Err(DeployError::SourcePath {
            path: path.to_path_buf(),
            problem: SourceProblem::NotADirectory,
        })
    }
}

fn dir_is_empty(dir: &Path) -> Result<bool> {
    let mut entries =
        fs::read_dir(dir).map_err(DeployError::io(format!("reading {}", dir.display())))?;
    Ok(entries.next().is_none())
}

/// Copies a file, or a directory tree depth-first, to `dest`.
fn copy_entry(src: &Path, dest: &Path) -> Result<()> {
    if src.is_dir() {
        for entry in WalkDir::new(src) {
            let entry = entry.map_err(|err| DeployError::Io {
                context: format!("walking {}", src.display()),
                source: err.into(),
            })?;
            let rel = entry
                .path()
                .strip_prefix(src)
                .expect("walkdir yields paths under its root");
            let target = dest.join(rel);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)
                    .map_err(DeployError::io(format!("creating {}", target.display())))?;
            } else {
                copy_file(entry.path(), &target)?;
            }
        }
        Ok(())
    } else {
        copy_file(src, dest)
    }
}

fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    fs::copy(src, dest)
        .map(|_| ())
        .map_err(DeployError::io(format!(
            "copying {} to {}",
            src.display(),
            dest.display()
        )))
}
