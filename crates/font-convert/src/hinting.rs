//! Best-effort TrueType hinting through `ttfautohint`.

use crate::{
    error::{Error, Result},
    tool::Tool,
};

const TTFAUTOHINT: &str = "ttfautohint";

/// Flags for symbol fonts: no script coverage check, Latin fallback, and
/// Windows-compatible vertical metrics.
const ARGS: &[&str] = &["--symbol", "--fallback-script=latn", "--windows-compatibility", "--no-info"];

/// Autohint a TrueType font.
///
/// Returns [`Error::HintingUnavailable`] when `ttfautohint` is not installed;
/// callers are expected to fall back to the unhinted font.
pub fn autohint(ttf: &[u8]) -> Result<Vec<u8>> {
    let tool = Tool::locate(TTFAUTOHINT, Error::HintingUnavailable)?;
    tool.convert(ttf, "hinted.ttf", |input, output| {
        ARGS.iter()
            .map(|s| s.to_string())
            .chain([input.display().to_string(), output.display().to_string()])
            .collect()
    })
}
