use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn collapse_whitespace<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    fragments
        .into_iter()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Create `dir` if missing, otherwise empty it
pub fn prepare_directory(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        ::log::info!("Created directory: {}", dir.display());
        return Ok(());
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        if let Err(e) = removed {
            ::log::warn!("Error clearing {}: {}", path.display(), e);
        }
    }
    ::log::info!("Cleared existing files in: {}", dir.display());
    Ok(())
}

/// Path of the screenshot taken when `page` fails to load on `attempt`
pub fn screenshot_path(dir: &Path, page: u32, attempt: u32) -> PathBuf {
    dir.join(format!("page_{}_attempt_{}.png", page, attempt))
}
