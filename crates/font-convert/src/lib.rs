//! Conversions from TrueType to the web font containers.
//!
//! WOFF, WOFF2 and EOT are encoded in-process. Autohinting shells out to
//! `ttfautohint` in a temporary directory that is removed whatever the
//! outcome.
//!
//! # Example
//!
//! ```no_run
//! use iconsmith_font_convert::{ttf_to_eot, ttf_to_woff};
//!
//! let ttf = std::fs::read("icons.ttf").unwrap();
//! let woff = ttf_to_woff(&ttf).unwrap();
//! let eot = ttf_to_eot(&ttf).unwrap();
//! ```

mod eot;
mod error;
mod hinting;
mod tool;
mod woff;
mod woff2;

pub use eot::ttf_to_eot;
pub use error::{Error, Result};
pub use hinting::autohint;
pub use woff::ttf_to_woff;
pub use woff2::ttf_to_woff2;
