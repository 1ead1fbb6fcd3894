//! Running external font tools in a scratch directory.

use std::{
    fs::{read, write},
    path::{Path, PathBuf},
    process::Command,
};

use log::debug;
use tempfile::TempDir;

use crate::error::{Error, Result};

/// An external converter found on `PATH`.
pub(crate) struct Tool {
    name: &'static str,
    path: PathBuf,
}

impl Tool {
    /// Locate `name`, mapping absence to `unavailable`.
    pub(crate) fn locate(name: &'static str, unavailable: Error) -> Result<Self> {
        match which::which(name) {
            Ok(path) => Ok(Self { name, path }),
            Err(_) => Err(unavailable),
        }
    }

    /// Write `input` to a temp file, run the tool, and read back `output_name`.
    ///
    /// `args` receives the input and output paths and returns the argument list.
    /// The temp directory is removed on every exit path.
    pub(crate) fn convert(
        &self,
        input: &[u8],
        output_name: &str,
        args: impl FnOnce(&Path, &Path) -> Vec<String>,
    ) -> Result<Vec<u8>> {
        let temp = TempDir::new().map_err(|e| Error::io(std::env::temp_dir(), e))?;
        let input_path = temp.path().join("font.ttf");
        let output_path = temp.path().join(output_name);
        write(&input_path, input).map_err(|e| Error::io(&input_path, e))?;

        let args = args(&input_path, &output_path);
        debug!("Running {} {}", self.name, args.join(" "));
        let output = Command::new(&self.path)
            .args(&args)
            .current_dir(temp.path())
            .output()
            .map_err(|e| Error::ToolFailed { tool: self.name, message: e.to_string() })?;

        if !output.status.success() {
            return Err(Error::ToolFailed {
                tool: self.name,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        read(&output_path).map_err(|e| Error::io(&output_path, e))
    }
}
