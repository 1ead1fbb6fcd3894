//! JSON handshake with the external font generator.
//!
//! The request goes to the tool's stdin as one JSON object. The tool prints
//! free-form diagnostics interleaved with exactly one JSON object on stdout;
//! everything before the first `{` and after the last `}` is discarded.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Substrings marking diagnostic lines that are banners rather than problems.
pub const BENIGN_OUTPUT: &[&str] = &[
    "Copyright",
    "License ",
    "with many parts BSD ",
    "Executable based on sources from",
    "Library based on sources from",
    "Based on source from git",
];

/// Request written to the tool's stdin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolRequest {
    pub input_dir: PathBuf,
    pub dest: PathBuf,
    pub font_base_name: String,
    pub types: Vec<String>,
    pub add_hashes: bool,
    pub add_ligatures: bool,
    pub auto_hint: bool,
    pub start_codepoint: u32,
    /// Glyph names in input order.
    pub glyphs: Vec<String>,
    /// Hex codepoints, order-correlated with `glyphs`.
    pub codepoints: Vec<String>,
}

/// Result object recovered from the tool's stdout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolResult {
    /// Path or basename of the generated font, without extension.
    pub file: String,
    /// Final glyph names, order-correlated with the request.
    #[serde(alias = "glyphs")]
    pub names: Vec<String>,
}

/// Cut the JSON object out of mixed tool output.
pub fn trim_to_json(output: &str) -> Option<&str> {
    let start = output.find('{')?;
    let end = output.rfind('}')?;
    (start < end).then(|| &output[start..=end])
}

/// Parse the tool's stdout into a [`ToolResult`].
///
/// Fails with [`Error::Protocol`] carrying the raw output when no JSON object
/// can be recovered or it lacks the required fields.
pub fn parse_tool_output(output: &str) -> Result<ToolResult> {
    let protocol_error = |reason: String| Error::Protocol { reason, output: output.to_string() };

    let json = trim_to_json(output).ok_or_else(|| protocol_error("no JSON object found".into()))?;
    serde_json::from_str(json).map_err(|e| protocol_error(e.to_string()))
}

/// Tool diagnostics split into banners and genuine warnings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    pub benign: Vec<String>,
    pub warnings: Vec<String>,
}

impl Diagnostics {
    pub fn classify(stderr: &str) -> Self {
        let mut diagnostics = Self::default();
        for line in stderr.lines().map(str::trim_end).filter(|l| !l.trim().is_empty()) {
            if BENIGN_OUTPUT.iter().any(|pattern| line.contains(pattern)) {
                diagnostics.benign.push(line.to_string());
            } else {
                diagnostics.warnings.push(line.to_string());
            }
        }
        diagnostics
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        /// Banner text around a valid object never breaks parsing.
        #[test]
        fn garbage_around_json_parses(
            prefix in "[^{}]{0,64}",
            suffix in "[^{}]{0,64}",
            file in "[a-z0-9/_-]{1,24}",
            names in prop::collection::vec("[a-z]{1,8}", 0..8),
        ) {
            let json = serde_json::json!({ "file": file, "names": names }).to_string();
            let output = format!("{prefix}{json}{suffix}");
            let result = parse_tool_output(&output).unwrap();
            prop_assert_eq!(result.file, file);
            prop_assert_eq!(result.names, names);
        }

        /// Output without any object fails cleanly.
        #[test]
        fn garbage_only_fails(output in "[^{}]{0,128}") {
            let is_protocol_error = matches!(parse_tool_output(&output), Err(Error::Protocol { .. }));
            prop_assert!(is_protocol_error);
        }

        /// Arbitrary text never panics.
        #[test]
        fn arbitrary_input_never_panics(output in ".{0,256}") {
            let _ = parse_tool_output(&output);
        }
    }
}
