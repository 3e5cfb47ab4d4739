//! Disk path parsing and resolution
//!
//! Remote paths use the `disk:/...` convention. Anything else is normalized
//! into it, so `reports/a.csv`, `/reports/a.csv` and `disk:/reports/a.csv`
//! all name the same resource.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Prefix of every normalized disk path
pub const DISK_PREFIX: &str = "disk:/";

/// Characters the service rejects in paths
const INVALID_PATH_CHARS: [char; 6] = ['<', '>', '"', '|', '?', '*'];

/// Characters not allowed in a bare file name used for rename
const INVALID_NAME_CHARS: [char; 9] = ['<', '>', ':', '"', '|', '?', '*', '/', '\\'];

/// Maximum length of a bare file name
const MAX_NAME_LEN: usize = 255;

/// A normalized path on the remote disk
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiskPath(String);

impl DiskPath {
    /// Parse and normalize a disk path
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::InvalidArguments("disk path cannot be empty".into()));
        }

        if let Some(c) = raw.chars().find(|c| INVALID_PATH_CHARS.contains(c)) {
            return Err(Error::InvalidArguments(format!(
                "disk path '{raw}' contains invalid character '{c}'"
            )));
        }

        if raw.starts_with(DISK_PREFIX) {
            Ok(Self(raw.to_string()))
        } else {
            Ok(Self(format!("{DISK_PREFIX}{}", raw.trim_start_matches('/'))))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after `disk:/`
    pub fn relative(&self) -> &str {
        self.0.strip_prefix(DISK_PREFIX).unwrap_or(&self.0)
    }

    pub fn is_root(&self) -> bool {
        self.relative().trim_matches('/').is_empty()
    }

    /// Whether the path ends with a slash (directory semantics)
    pub fn is_dir_like(&self) -> bool {
        self.is_root() || self.0.ends_with('/')
    }

    /// Last path component, if any
    pub fn file_name(&self) -> Option<&str> {
        self.relative()
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
    }

    /// Get the parent path (one level up)
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let relative = self.relative().trim_end_matches('/');
        match relative.rfind('/') {
            Some(pos) => Some(Self(format!("{DISK_PREFIX}{}", &relative[..pos]))),
            None => Some(Self(DISK_PREFIX.to_string())),
        }
    }

    /// Join a child path component
    pub fn join(&self, child: &str) -> Result<Self> {
        let base = self.0.trim_end_matches('/');
        let child = child.trim_start_matches('/');
        if base == "disk:" {
            Self::parse(&format!("{DISK_PREFIX}{child}"))
        } else {
            Self::parse(&format!("{base}/{child}"))
        }
    }

    /// Resolve a sibling with a new bare name, as used by rename
    pub fn with_name(&self, new_name: &str) -> Result<Self> {
        validate_name(new_name)?;
        let parent = self.parent().ok_or_else(|| {
            Error::InvalidArguments("the disk root cannot be renamed".into())
        })?;
        parent.join(new_name)
    }
}

impl std::fmt::Display for DiskPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DiskPath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<DiskPath> for String {
    fn from(path: DiskPath) -> Self {
        path.0
    }
}

/// Check a bare file name for rename
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidArguments("new name cannot be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(Error::InvalidArguments(format!(
            "new name is longer than {MAX_NAME_LEN} characters"
        )));
    }
    if let Some(c) = name.chars().find(|c| INVALID_NAME_CHARS.contains(c)) {
        return Err(Error::InvalidArguments(format!(
            "new name '{name}' contains invalid character '{c}'"
        )));
    }
    Ok(())
}
