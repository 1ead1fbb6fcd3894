//! Codepoint allocation for icon fonts.
//!
//! Every glyph in an icon font needs a unique character code. Codepoints are
//! either declared explicitly per glyph name or assigned automatically from
//! the Unicode Private Use Area, skipping anything already taken.
//!
//! # Example
//!
//! ```
//! use iconsmith_codepoints::{CodepointAllocator, UNICODE_PUA_START};
//!
//! let codepoints = CodepointAllocator::new()
//!     .with_explicit([("search", 0xF200)])
//!     .allocate(["home", "search"])
//!     .unwrap();
//!
//! assert_eq!(codepoints["home"], UNICODE_PUA_START);
//! assert_eq!(codepoints["search"], 0xF200);
//! ```

use std::{
    borrow::Borrow,
    collections::{HashMap, HashSet},
    hash::Hash,
    result,
};

use indexmap::IndexMap;

/// Unicode Private Use Area start used for automatic assignment.
pub const UNICODE_PUA_START: u32 = 0xF101;

/// Highest Unicode scalar value.
pub const MAX_CODEPOINT: u32 = 0x10FFFF;

/// Glyph name to codepoint, in glyph order.
pub type Codepoints = IndexMap<String, u32>;

/// Errors raised by codepoint checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("no codepoint declared for glyph '{0}'")]
    MissingCodepoint(String),

    #[error("codepoint U+{value:04X} declared for both '{first}' and '{second}'")]
    DuplicateCodepoint { value: u32, first: String, second: String },

    #[error("codepoint {0:#X} is outside the Unicode range")]
    OutOfRange(u32),

    #[error("no free codepoint left for glyph '{0}'")]
    Exhausted(String),
}

pub type Result<T> = result::Result<T, Error>;

/// Codepoint allocator with builder pattern.
#[derive(Debug, Clone)]
pub struct CodepointAllocator {
    base: u32,
    explicit: Codepoints,
}

impl Default for CodepointAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodepointAllocator {
    /// Creates an allocator starting at [`UNICODE_PUA_START`] with no explicit map.
    pub fn new() -> Self {
        Self { base: UNICODE_PUA_START, explicit: Codepoints::new() }
    }

    /// Sets the first codepoint considered for automatic assignment.
    pub fn with_base(mut self, base: u32) -> Self {
        self.base = base;
        self
    }

    /// Adds explicit glyph name to codepoint declarations.
    pub fn with_explicit<K: Into<String>>(
        mut self,
        explicit: impl IntoIterator<Item = (K, u32)>,
    ) -> Self {
        self.explicit.extend(explicit.into_iter().map(|(name, cp)| (name.into(), cp)));
        self
    }

    /// Checks the base and the explicit map: every value within Unicode and
    /// no value declared twice.
    pub fn validate(&self) -> Result<()> {
        if self.base > MAX_CODEPOINT {
            return Err(Error::OutOfRange(self.base));
        }
        let mut owners: HashMap<u32, &str> = HashMap::new();
        for (name, &cp) in &self.explicit {
            if cp > MAX_CODEPOINT {
                return Err(Error::OutOfRange(cp));
            }
            if let Some(first) = owners.insert(cp, name.as_str()) {
                return Err(Error::DuplicateCodepoint {
                    value: cp,
                    first: first.to_string(),
                    second: name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Assigns a codepoint to every name.
    ///
    /// Explicit declarations are kept as they are. Every other name gets the
    /// lowest free value at or above the cursor, which starts at the base and
    /// only moves upward. Explicit values are reserved before any automatic
    /// assignment, so the two never collide regardless of name order.
    pub fn allocate<S: AsRef<str>>(&self, names: impl IntoIterator<Item = S>) -> Result<Codepoints> {
        self.validate()?;
        let mut reserved: HashSet<u32> = self.explicit.values().copied().collect();
        let mut cursor = self.base;
        let mut result = Codepoints::new();

        for name in names {
            let name = name.as_ref();
            if let Some(&cp) = self.explicit.get(name) {
                result.insert(name.to_string(), cp);
                continue;
            }

            // cursor stays at most MAX_CODEPOINT + 1, far from u32::MAX
            while cursor <= MAX_CODEPOINT && reserved.contains(&cursor) {
                cursor += 1;
            }
            if cursor > MAX_CODEPOINT {
                return Err(Error::Exhausted(name.to_string()));
            }
            reserved.insert(cursor);
            result.insert(name.to_string(), cursor);
            cursor += 1;
        }

        Ok(result)
    }

    /// Fails on the first name that has no explicit declaration.
    ///
    /// Used when the caller promises a complete map and automatic assignment
    /// would hide a typo.
    pub fn require_complete<S: AsRef<str>>(&self, names: impl IntoIterator<Item = S>) -> Result<()> {
        require_complete(names, &self.explicit)
    }
}

/// Allocates codepoints for `names` (convenience function).
///
/// Equivalent to `CodepointAllocator::new().with_base(base).with_explicit(..).allocate(names)`.
pub fn allocate<S, K, V>(
    names: impl IntoIterator<Item = S>,
    explicit: &IndexMap<K, V>,
    base: u32,
) -> Result<Codepoints>
where
    S: AsRef<str>,
    K: AsRef<str> + Hash + Eq,
    V: Copy + Into<u32>,
{
    CodepointAllocator::new()
        .with_base(base)
        .with_explicit(explicit.iter().map(|(k, v)| (k.as_ref(), (*v).into())))
        .allocate(names)
}

/// Checks that every name has an explicit codepoint.
pub fn require_complete<S, K>(
    names: impl IntoIterator<Item = S>,
    explicit: &IndexMap<K, u32>,
) -> Result<()>
where
    S: AsRef<str>,
    K: Borrow<str> + Hash + Eq,
{
    for name in names {
        let name = name.as_ref();
        if !explicit.contains_key(name) {
            return Err(Error::MissingCodepoint(name.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_from_base() {
        let cps = CodepointAllocator::new()
            .allocate(["home", "search"])
            .unwrap();
        assert_eq!(cps["home"], 0xF101);
        assert_eq!(cps["search"], 0xF102);
    }

    #[test]
    fn test_explicit_far_above_cursor() {
        let cps = CodepointAllocator::new()
            .with_explicit([("search", 0xF200)])
            .allocate(["home", "search"]).unwrap();
        assert_eq!(cps["home"], 0xF101);
        assert_eq!(cps["search"], 0xF200);
    }

    #[test]
    fn test_skips_explicit_values_in_path() {
        let cps = CodepointAllocator::new()
            .with_explicit([("c", 0xF102)])
            .allocate(["a", "b", "c", "d"])
            .unwrap();
        assert_eq!(cps["a"], 0xF101);
        assert_eq!(cps["b"], 0xF103);
        assert_eq!(cps["c"], 0xF102);
        assert_eq!(cps["d"], 0xF104);
    }

    #[test]
    fn test_explicit_declared_later_is_still_reserved() {
        // "b" comes after "a" but its value must not be handed to "a"
        let cps = CodepointAllocator::new()
            .with_explicit([("b", 0xF101)])
            .allocate(["a", "b"])
            .unwrap();
        assert_eq!(cps["a"], 0xF102);
        assert_eq!(cps["b"], 0xF101);
    }

    #[test]
    fn test_custom_base() {
        let cps = CodepointAllocator::new().with_base(0xE000).allocate(["x"]).unwrap();
        assert_eq!(cps["x"], 0xE000);
    }

    #[test]
    fn test_preserves_input_order() {
        let cps = CodepointAllocator::new().allocate(["zeta", "alpha", "mid"]).unwrap();
        let names: Vec<_> = cps.keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_require_complete() {
        let allocator = CodepointAllocator::new().with_explicit([("home", 0xF101)]);
        assert!(allocator.require_complete(["home"]).is_ok());
        assert_eq!(
            allocator.require_complete(["home", "search"]),
            Err(Error::MissingCodepoint("search".to_string()))
        );
    }

    #[test]
    fn test_free_function_matches_builder() {
        let mut explicit: IndexMap<String, u32> = IndexMap::new();
        explicit.insert("b".to_string(), 0xF101);
        let cps = allocate(["a", "b"], &explicit, UNICODE_PUA_START).unwrap();
        assert_eq!(cps["a"], 0xF102);
        assert_eq!(cps["b"], 0xF101);
    }

    #[test]
    fn test_duplicate_explicit_value_rejected() {
        let allocator =
            CodepointAllocator::new().with_explicit([("a", 0xF101), ("b", 0xF101)]);
        let expected = Error::DuplicateCodepoint {
            value: 0xF101,
            first: "a".to_string(),
            second: "b".to_string(),
        };
        assert_eq!(allocator.validate(), Err(expected.clone()));
        assert_eq!(allocator.allocate(["a", "b"]), Err(expected));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let base = CodepointAllocator::new().with_base(u32::MAX);
        assert_eq!(base.allocate(["a", "b"]), Err(Error::OutOfRange(u32::MAX)));

        let explicit = CodepointAllocator::new().with_explicit([("a", 0x110000)]);
        assert_eq!(explicit.allocate(["a"]), Err(Error::OutOfRange(0x110000)));
    }

    #[test]
    fn test_exhausted_at_top_of_unicode() {
        let allocator = CodepointAllocator::new().with_base(MAX_CODEPOINT);
        assert_eq!(
            allocator.allocate(["a", "b"]),
            Err(Error::Exhausted("b".to_string()))
        );

        let cps = allocator.allocate(["a"]).unwrap();
        assert_eq!(cps["a"], MAX_CODEPOINT);
    }
}
