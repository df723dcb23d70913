use std::collections::BTreeSet;
use std::path::Path;

use crate::shared::config::ConfigError;

/// Admission rules for uploads. Built once at startup, read-only afterwards.
///
/// - `allowed_extensions == None` means every extension (or none) is accepted.
/// - `max_file_size_bytes == None` means no size limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadPolicy {
    allowed_extensions: Option<BTreeSet<String>>,
    max_file_size_bytes: Option<u64>,
}

impl UploadPolicy {
    pub const ALLOWED_EXTENSIONS_VAR: &'static str = "ALLOWED_FILES";
    pub const MAX_FILE_SIZE_VAR: &'static str = "UPROXY_MAX_FILESIZE";

    /// Entries are normalized to `.ext` lowercase. An empty list and a zero
    /// limit both mean "unrestricted".
    pub fn new<I, S>(allowed_extensions: I, max_file_size_bytes: Option<u64>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed: BTreeSet<String> = allowed_extensions
            .into_iter()
            .filter_map(|e| normalize_allow_list_entry(e.as_ref()))
            .collect();

        Self {
            allowed_extensions: (!allowed.is_empty()).then_some(allowed),
            max_file_size_bytes: max_file_size_bytes.filter(|&max| max > 0),
        }
    }

    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// `ALLOWED_FILES` is a comma separated list, `UPROXY_MAX_FILESIZE` is in megabytes.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let allowed = get(Self::ALLOWED_EXTENSIONS_VAR).unwrap_or_default();

        let max_file_size_bytes = match get(Self::MAX_FILE_SIZE_VAR) {
            Some(raw) => {
                let megabytes = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                    key: Self::MAX_FILE_SIZE_VAR,
                    reason: "must be an integer representing megabytes".to_string(),
                })?;
                let bytes =
                    megabytes
                        .checked_mul(1024 * 1024)
                        .ok_or_else(|| ConfigError::Invalid {
                            key: Self::MAX_FILE_SIZE_VAR,
                            reason: "value is too large".to_string(),
                        })?;
                Some(bytes)
            }
            None => None,
        };

        Ok(Self::new(allowed.split(','), max_file_size_bytes))
    }

    pub fn allowed_extensions(&self) -> Option<&BTreeSet<String>> {
        self.allowed_extensions.as_ref()
    }

    pub fn max_file_size_bytes(&self) -> Option<u64> {
        self.max_file_size_bytes
    }

    /// `extension` is expected in normalized form (see [`normalized_extension`]).
    pub fn permits_extension(&self, extension: Option<&str>) -> bool {
        match (&self.allowed_extensions, extension) {
            (None, _) => true,
            (Some(allowed), Some(ext)) => allowed.contains(ext),
            (Some(_), None) => false,
        }
    }

    pub fn exceeds_limit(&self, size_bytes: u64) -> bool {
        self.max_file_size_bytes.is_some_and(|max| size_bytes > max)
    }
}

fn normalize_allow_list_entry(raw: &str) -> Option<String> {
    normalize_suffix(raw.trim().trim_start_matches('.'))
}

/// Lowercased, dot prefixed form shared by allow-list entries and file names.
/// Object names may not carry control characters, so such suffixes count as absent.
fn normalize_suffix(suffix: &str) -> Option<String> {
    if suffix.is_empty() || suffix.chars().any(char::is_control) {
        return None;
    }
    Some(format!(".{}", suffix.to_lowercase()))
}

/// Extension of the file name's last path segment, lowercased with a leading dot.
///
/// `photo.PNG` -> `.png`, `a.tar.gz` -> `.gz`, `photo.jpg_large` -> `.jpg_large`,
/// `archive` / `.bashrc` / `x.` -> `None`.
pub fn normalized_extension(file_name: &str) -> Option<String> {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);

    normalize_suffix(Path::new(base).extension()?.to_str()?)
}
