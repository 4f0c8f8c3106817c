use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::image_pipeline::common::error::Result;

/// Collects every `*.raw` file below `dir`, recursively.
pub fn find_raw_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && is_raw(&path) {
                found.push(path);
            }
        }
    }

    found.sort();
    debug!("Found {} RAW files under {}", found.len(), dir.display());
    Ok(found)
}

/// Most recently modified `*.raw` file below `dir`, if any.
pub fn find_latest_raw(dir: &Path) -> Result<Option<PathBuf>> {
    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for path in find_raw_files(dir)? {
        let modified = std::fs::metadata(&path)?.modified()?;
        if latest.as_ref().is_none_or(|(t, _)| modified > *t) {
            latest = Some((modified, path));
        }
    }
    Ok(latest.map(|(_, path)| path))
}

fn is_raw(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("raw"))
}
