use std::{
    fs::remove_file,
    path::{Path, PathBuf},
};

use glob::{Pattern, glob};
use iconsmith_backend::FontFormat;
use log::debug;

use crate::{
    config::BuildConfig,
    error::{Error, Result},
};

/// Hex digits of the hash both backends append to font names.
const HASH_DIGITS: usize = 32;

/// Font files of `base` in `dir`: the bare name and the hashed one.
///
/// `icons` matches `icons.woff` and `icons-<32 hex>.woff`, never `icons-extra.woff`.
pub fn font_patterns(dir: &Path, base: &str, format: FontFormat) -> [String; 2] {
    let dir = Pattern::escape(&dir.to_string_lossy());
    let base = Pattern::escape(base);
    let ext = format.extension();
    let hash = "[0-9a-f]".repeat(HASH_DIGITS);
    [format!("{dir}/{base}.{ext}"), format!("{dir}/{base}-{hash}.{ext}")]
}

/// Every file a previous build of `config` may have left behind.
pub fn stale_outputs(config: &BuildConfig) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for format in FontFormat::ALL {
        for pattern in font_patterns(&config.dest, &config.font_base_name, format) {
            let paths = glob(&pattern)
                .map_err(|e| Error::Glob { pattern: pattern.clone(), message: e.to_string() })?;
            found.extend(paths.filter_map(|p| p.ok()).filter(|p| p.is_file()));
        }
    }
    found.extend([config.stylesheet_file(), config.demo_file()].into_iter().filter(|p| p.is_file()));
    found.sort();
    found.dedup();
    Ok(found)
}

/// Remove stale outputs, returning how many files were deleted.
pub fn clean(config: &BuildConfig) -> Result<usize> {
    let stale = stale_outputs(config)?;
    for path in &stale {
        remove_file(path).map_err(|e| Error::io(path, e))?;
        debug!("Removed {}", path.display());
    }
    Ok(stale.len())
}
