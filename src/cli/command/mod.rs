pub mod columns;
pub mod format;
pub mod resample;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub use columns::columns;
pub use format::format;
pub use resample::{interval, resample};

/// Files directly inside `dir` accepted by `keep`, sorted by name.
pub fn list_files(dir: &Path, keep: impl Fn(&Path) -> bool) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && keep(&path) {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
}

/// File names without their directory, for menus.
pub fn display_names(files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|f| {
            f.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| f.to_string_lossy().to_string())
        })
        .collect()
}

// -- Tests -------------------------------------------------------------------
