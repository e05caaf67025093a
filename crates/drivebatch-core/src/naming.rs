//! Local destination paths for downloaded items.
//!
//! Two items resolving to the same path are not detected; the later write
//! overwrites the earlier one.

use crate::models::RemoteFile;
use std::path::{Path, PathBuf};

/// Characters replaced by `_` in resolved filenames
pub const INVALID_FILENAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// How a downloaded item is named locally
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NamingPolicy {
    /// Remote name verbatim
    #[default]
    RemoteName,
    /// Remote name, chosen explicitly
    KeepName,
    /// Template with `{id}`, `{name}` and `{index}` placeholders
    Pattern(String),
}

impl NamingPolicy {
    /// Build a policy from CLI-style options. `keep_name` wins over a pattern;
    /// an empty pattern means the default.
    pub fn from_options(keep_name: bool, name_pattern: Option<&str>) -> Self {
        match (keep_name, name_pattern) {
            (true, _) => Self::KeepName,
            (false, Some(pattern)) if !pattern.is_empty() => Self::Pattern(pattern.to_string()),
            _ => Self::RemoteName,
        }
    }

    /// Unsanitized filename for `file`, which sits at `index` in the input list
    pub fn filename(&self, file: &RemoteFile, index: usize) -> String {
        match self {
            Self::RemoteName | Self::KeepName => file.name.clone(),
            Self::Pattern(pattern) => pattern
                .replace("{id}", &file.id)
                .replace("{name}", &file.name)
                .replace("{index}", &index.to_string()),
        }
    }
}

/// Replace characters that are invalid on common filesystems with `_`
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if INVALID_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Resolve the local path a remote item is downloaded to
pub fn resolve_output_path(
    file: &RemoteFile,
    index: usize,
    output_dir: Option<&Path>,
    policy: &NamingPolicy,
) -> PathBuf {
    let filename = sanitize_filename(&policy.filename(file, index));

    match output_dir {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(filename),
        _ => PathBuf::from(filename),
    }
}
