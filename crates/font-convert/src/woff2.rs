//! WOFF2 encoding.

use ttf2woff2::BrotliQuality;

use crate::error::{Error, Result};

/// Compress a TrueType font to WOFF2 with the default Brotli quality.
pub fn ttf_to_woff2(ttf: &[u8]) -> Result<Vec<u8>> {
    ttf2woff2::encode(ttf, BrotliQuality::default()).map_err(|e| Error::Woff2(e.to_string()))
}
