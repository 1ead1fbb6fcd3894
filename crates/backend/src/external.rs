//! Backend driving an external font generator process.

use std::{
    fs::{copy, create_dir_all, read},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

use glob::glob;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use crate::{
    Backend, BackendKind, FontJob, Generated,
    error::{Error, Result},
    protocol::{Diagnostics, ToolRequest, parse_tool_output},
    types::{FontArtifact, FontFormat},
};

/// Exit code shells use for "command not found".
pub const COMMAND_NOT_FOUND: i32 = 127;

/// How to launch the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalToolConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ExternalToolConfig {
    fn default() -> Self {
        Self {
            program: "fontforge".to_string(),
            args: vec!["-script".to_string(), "generate.py".to_string()],
        }
    }
}

/// Runs the generator once per build, inside a private temp directory.
#[derive(Debug, Clone, Default)]
pub struct ExternalToolBackend {
    config: ExternalToolConfig,
}

impl ExternalToolBackend {
    pub fn new(config: ExternalToolConfig) -> Self {
        Self { config }
    }

    fn tool_name(&self) -> String {
        Path::new(&self.config.program)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.config.program)
            .to_string()
    }

    /// Copy sources under their final names so the tool sees them in order.
    fn stage_sources(&self, job: &FontJob<'_>, input_dir: &Path) -> Result<()> {
        create_dir_all(input_dir).map_err(|e| Error::io(input_dir, e))?;
        for glyph in job.sources {
            let target = input_dir.join(format!("{}.{}", glyph.name, glyph.extension()));
            copy(&glyph.source_path, &target).map_err(|e| Error::io(&glyph.source_path, e))?;
        }
        Ok(())
    }

    fn request(&self, job: &FontJob<'_>, input_dir: PathBuf, dest: PathBuf) -> Result<ToolRequest> {
        let glyphs: Vec<String> = job.sources.iter().map(|g| g.name.clone()).collect();
        let codepoints = glyphs
            .iter()
            .map(|name| job.codepoint(name).map(|cp| format!("{cp:x}")))
            .collect::<Result<Vec<_>>>()?;

        Ok(ToolRequest {
            input_dir,
            dest,
            font_base_name: job.font_base_name.to_string(),
            types: job.formats.iter().map(|f| f.extension().to_string()).collect(),
            add_hashes: job.options.add_hashes,
            add_ligatures: job.options.add_ligatures,
            auto_hint: job.options.autohint,
            start_codepoint: job.options.start_codepoint,
            glyphs,
            codepoints,
        })
    }

    fn run(&self, request: &ToolRequest) -> Result<Output> {
        let tool = self.tool_name();
        debug!("Running {} {}", self.config.program, self.config.args.join(" "));

        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::ToolNotFound { tool: tool.clone() },
                _ => Error::ToolFailed { tool: tool.clone(), message: e.to_string() },
            })?;

        let payload = serde_json::to_vec(request)
            .map_err(|e| Error::ToolFailed { tool: tool.clone(), message: e.to_string() })?;
        if let Some(mut stdin) = child.stdin.take() {
            // A tool that exits before reading its input reports through its status.
            if let Err(e) = stdin.write_all(&payload) {
                debug!("{tool}: failed to write request: {e}");
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Error::ToolFailed { tool: tool.clone(), message: e.to_string() })?;

        if output.status.code() == Some(COMMAND_NOT_FOUND) {
            return Err(Error::ToolNotFound { tool });
        }
        Ok(output)
    }

    /// Whether the tool left any font for this job in `dest`.
    fn produced_any(&self, job: &FontJob<'_>, dest: &Path) -> bool {
        job.formats.iter().any(|format| {
            let pattern = dest.join(format!("{}*.{}", job.font_base_name, format.extension()));
            pattern
                .to_str()
                .and_then(|p| glob(p).ok())
                .is_some_and(|mut paths| paths.any(|p| p.is_ok()))
        })
    }

    fn check_diagnostics(&self, output: &Output, produced: bool) -> Result<()> {
        let tool = self.tool_name();
        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostics = Diagnostics::classify(&stderr);

        for line in &diagnostics.benign {
            debug!("{tool}: {line}");
        }

        if produced {
            for line in &diagnostics.warnings {
                warn!("{tool}: {line}");
            }
            if !output.status.success() {
                warn!("{tool} exited with {} but produced output", output.status);
            }
            return Ok(());
        }

        if !diagnostics.warnings.is_empty() {
            return Err(Error::ToolFailed { tool, message: diagnostics.warnings.join("\n") });
        }
        if !output.status.success() {
            return Err(Error::ToolFailed { tool, message: format!("exited with {}", output.status) });
        }
        Ok(())
    }
}

/// Font name from the result's `file` field: basename, known extension dropped.
fn font_name_from_file(file: &str) -> String {
    let name = Path::new(file).file_name().and_then(|s| s.to_str()).unwrap_or(file);
    FontFormat::ALL
        .iter()
        .find_map(|format| name.strip_suffix(&format!(".{}", format.extension())))
        .unwrap_or(name)
        .to_string()
}

impl Backend for ExternalToolBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::ExternalTool
    }

    fn generate(&self, job: &FontJob<'_>) -> Result<Generated> {
        let temp = TempDir::new().map_err(|e| Error::io(std::env::temp_dir(), e))?;
        let input_dir = temp.path().join("source");
        let dest = temp.path().join("fonts");
        create_dir_all(&dest).map_err(|e| Error::io(&dest, e))?;

        self.stage_sources(job, &input_dir)?;
        let request = self.request(job, input_dir, dest.clone())?;
        let output = self.run(&request)?;

        self.check_diagnostics(&output, self.produced_any(job, &dest))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let result = parse_tool_output(&stdout)?;
        let font_name = font_name_from_file(&result.file);

        let artifacts = job
            .formats
            .iter()
            .map(|&format| {
                let path = dest.join(format!("{font_name}.{}", format.extension()));
                let bytes = read(&path).map_err(|_| Error::ToolFailed {
                    tool: self.tool_name(),
                    message: format!("expected output {} was not created", path.display()),
                })?;
                Ok(FontArtifact::new(format, bytes))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Generated { font_name, glyph_names: result.names, artifacts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_name_from_file() {
        assert_eq!(font_name_from_file("/tmp/x/fonts/icons-0123abcd"), "icons-0123abcd");
        assert_eq!(font_name_from_file("icons.ttf"), "icons");
        assert_eq!(font_name_from_file("my.icons"), "my.icons");
    }

    #[test]
    fn test_tool_name() {
        let backend = ExternalToolBackend::new(ExternalToolConfig {
            program: "/usr/local/bin/fontforge".into(),
            args: vec![],
        });
        assert_eq!(backend.tool_name(), "fontforge");
    }
}
