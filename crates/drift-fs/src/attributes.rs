//! POSIX ownership and permission access
//!
//! Desired owner/group/mode come from manifests as names and octal
//! strings; the [`AttributeAccessor`] trait resolves them against the live
//! filesystem so the orchestrator can be tested with a recording fake.

use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt, chown};
use std::path::Path;

use nix::unistd::{Gid, Group, Uid, User};

use crate::{Error, Result};

/// Permission bits compared and applied by driftflow (setuid/setgid/sticky included)
pub const MODE_MASK: u32 = 0o7777;

/// Observed ownership and permissions of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttributes {
    pub uid: u32,
    pub gid: u32,
    /// Owner name, when the uid resolves to a user
    pub owner: Option<String>,
    /// Group name, when the gid resolves to a group
    pub group: Option<String>,
    /// Permission bits, already masked with [`MODE_MASK`]
    pub mode: u32,
}

/// Desired attributes; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRequest {
    pub owner: Option<String>,
    pub group: Option<String>,
    pub mode: Option<u32>,
}

impl AttributeRequest {
    pub fn is_empty(&self) -> bool {
        self.owner.is_none() && self.group.is_none() && self.mode.is_none()
    }

    /// Check observed attributes against this request.
    ///
    /// Owner and group match either by name or by numeric id.
    pub fn is_satisfied_by(&self, observed: &FileAttributes) -> bool {
        let owner_ok = self
            .owner
            .as_deref()
            .is_none_or(|want| id_matches(want, observed.owner.as_deref(), observed.uid));
        let group_ok = self
            .group
            .as_deref()
            .is_none_or(|want| id_matches(want, observed.group.as_deref(), observed.gid));
        let mode_ok = self
            .mode
            .is_none_or(|want| want & MODE_MASK == observed.mode);
        owner_ok && group_ok && mode_ok
    }
}

fn id_matches(want: &str, name: Option<&str>, id: u32) -> bool {
    name == Some(want) || want.parse::<u32>().is_ok_and(|n| n == id)
}

/// Parse an octal mode string such as `"0644"`, `"644"` or `"0o600"`.
pub fn parse_mode(value: &str) -> Result<u32> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0o")
        .or_else(|| trimmed.strip_prefix("0O"))
        .unwrap_or(trimmed);
    let mode = u32::from_str_radix(digits, 8).map_err(|_| Error::InvalidMode {
        value: value.to_string(),
    })?;
    if mode > MODE_MASK {
        return Err(Error::InvalidMode {
            value: value.to_string(),
        });
    }
    Ok(mode)
}

/// Reads and applies file ownership and permissions
pub trait AttributeAccessor {
    fn get(&self, path: &Path) -> Result<FileAttributes>;

    fn set(&self, path: &Path, request: &AttributeRequest) -> Result<()>;
}

/// [`AttributeAccessor`] backed by the host's user and group databases
#[derive(Debug, Default, Clone, Copy)]
pub struct PosixAttributes;

impl PosixAttributes {
    pub fn new() -> Self {
        Self
    }

    fn resolve_uid(name: &str) -> Result<u32> {
        if let Ok(uid) = name.parse::<u32>() {
            return Ok(uid);
        }
        User::from_name(name)
            .map_err(|source| Error::Lookup {
                what: format!("user {name}"),
                source,
            })?
            .map(|user| user.uid.as_raw())
            .ok_or_else(|| Error::UnknownUser {
                name: name.to_string(),
            })
    }

    fn resolve_gid(name: &str) -> Result<u32> {
        if let Ok(gid) = name.parse::<u32>() {
            return Ok(gid);
        }
        Group::from_name(name)
            .map_err(|source| Error::Lookup {
                what: format!("group {name}"),
                source,
            })?
            .map(|group| group.gid.as_raw())
            .ok_or_else(|| Error::UnknownGroup {
                name: name.to_string(),
            })
    }
}

impl AttributeAccessor for PosixAttributes {
    fn get(&self, path: &Path) -> Result<FileAttributes> {
        let meta = fs::metadata(path).map_err(|e| Error::io(path, e))?;
        let uid = meta.uid();
        let gid = meta.gid();
        let owner = User::from_uid(Uid::from_raw(uid))
            .ok()
            .flatten()
            .map(|u| u.name);
        let group = Group::from_gid(Gid::from_raw(gid))
            .ok()
            .flatten()
            .map(|g| g.name);

        Ok(FileAttributes {
            uid,
            gid,
            owner,
            group,
            mode: meta.permissions().mode() & MODE_MASK,
        })
    }

    fn set(&self, path: &Path, request: &AttributeRequest) -> Result<()> {
        if request.owner.is_some() || request.group.is_some() {
            let uid = request.owner.as_deref().map(Self::resolve_uid).transpose()?;
            let gid = request.group.as_deref().map(Self::resolve_gid).transpose()?;
            chown(path, uid, gid).map_err(|e| Error::io(path, e))?;
            tracing::info!(path = %path.display(), ?uid, ?gid, "Changed ownership");
        }

        if let Some(mode) = request.mode {
            fs::set_permissions(path, fs::Permissions::from_mode(mode & MODE_MASK))
                .map_err(|e| Error::io(path, e))?;
            tracing::info!(path = %path.display(), mode = format!("{:o}", mode), "Changed mode");
        }

        Ok(())
    }
}
