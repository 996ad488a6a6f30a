// src/convert/stage.rs

//! Staging of package contents under `debian/<package>/`

use crate::error::{Error, Result};
use nix::unistd::{Group, User};
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Parse an octal mode string such as `0755`
pub fn parse_mode(mode: &str) -> Result<u32> {
    u32::from_str_radix(mode, 8).map_err(|_| Error::InvalidMode(mode.to_string()))
}

/// Copies payloads from proto trees into the staging root
pub struct Stager {
    root: PathBuf,
    proto_dirs: Vec<PathBuf>,
}

impl Stager {
    pub fn new(root: PathBuf, proto_dirs: Vec<PathBuf>) -> Self {
        Self { root, proto_dirs }
    }

    /// Create a packaged directory
    ///
    /// The staged copy always has owner rwx; `fixperms` applies the exact
    /// mode at build time.
    pub fn create_dir(&self, path: &str, mode: &str, owner: &str, group: &str) -> Result<()> {
        let mode = parse_mode(mode)?;
        let dest = self.root.join(path);
        if !dest.exists() {
            fs::create_dir_all(&dest)?;
            fs::set_permissions(&dest, fs::Permissions::from_mode(mode | 0o700))?;
        }
        apply_ownership(&dest, owner, group)
    }

    /// Find a payload in the proto trees; later trees take precedence
    pub fn locate_payload(&self, name: &str) -> Result<PathBuf> {
        self.proto_dirs
            .iter()
            .map(|dir| dir.join(name))
            .filter(|candidate| candidate.exists())
            .last()
            .ok_or_else(|| Error::MissingPayload(name.to_string()))
    }

    /// Copy `source` to `path` in the staging tree and set its attributes
    pub fn install_file(
        &self,
        path: &str,
        source: &Path,
        mode: &str,
        owner: &str,
        group: &str,
    ) -> Result<()> {
        let mode = parse_mode(mode)?;
        let dest = self.root.join(path);
        if let Some(parent) = dest.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        debug!("Staging {} from {}", path, source.display());
        fs::copy(source, &dest)?;
        fs::set_permissions(&dest, fs::Permissions::from_mode(mode))?;
        apply_ownership(&dest, owner, group)
    }

    /// Create an empty file, with parent directories
    pub fn touch(&self, path: &str) -> Result<()> {
        let dest = self.root.join(path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, b"")?;
        Ok(())
    }
}

/// Set owner and group by name
///
/// Unknown accounts and missing privileges only produce a log message.
fn apply_ownership(path: &Path, owner: &str, group: &str) -> Result<()> {
    let uid = match User::from_name(owner) {
        Ok(Some(user)) => Some(user.uid.as_raw()),
        Ok(None) => {
            warn!("Unknown user '{}' for {}, leaving owner unchanged", owner, path.display());
            None
        }
        Err(e) => {
            warn!("Failed to look up user '{}': {}", owner, e);
            None
        }
    };
    let gid = match Group::from_name(group) {
        Ok(Some(group)) => Some(group.gid.as_raw()),
        Ok(None) => {
            warn!("Unknown group '{}' for {}, leaving group unchanged", group, path.display());
            None
        }
        Err(e) => {
            warn!("Failed to look up group '{}': {}", group, e);
            None
        }
    };

    if uid.is_none() && gid.is_none() {
        return Ok(());
    }

    match std::os::unix::fs::chown(path, uid, gid) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            debug!("Not owner, skipping chown of {}", path.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
