// File type detection and output naming

use std::path::{Path, PathBuf};

/// Suffix appended to the daily file stem for the match output.
pub const MATCHES_SUFFIX: &str = "_Matches";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableFormat {
    Csv,
    Xlsx,
    /// Legacy Excel. Read-only.
    Xls,
}

impl TableFormat {
    /// Detect from the extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }

    pub fn is_writable(self) -> bool {
        !matches!(self, Self::Xls)
    }
}

/// `<dir>/<stem>_Matches.<ext>` next to the daily file.
pub fn output_path(daily: &Path, format: TableFormat) -> PathBuf {
    let stem = daily
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{stem}{MATCHES_SUFFIX}.{}", format.extension());
    match daily.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}
