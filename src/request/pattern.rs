//! Pattern URL generation
//!
//! A target with `regex_url` set treats its URL as a regular expression and
//! asks a [`UrlGenerator`] for one concrete URL per request instance.
//!
//! # Characteristics
//!
//! - Each distinct pattern is compiled once and cached
//! - Unbounded repetition (`*`, `+`, `{n,}`) is capped at 10 repeats
//! - Seedable, so a run can be replayed with the same URL sequence
//!
//! # Example
//!
//! ```
//! use volley::request::pattern::{RegexUrlGenerator, UrlGenerator};
//!
//! let mut urls = RegexUrlGenerator::with_seed(7);
//! let url = urls.generate(r"http://localhost/items/[0-9]{4}").unwrap();
//! assert!(url.starts_with("http://localhost/items/"));
//! ```

use super::BuildError;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::HashMap;

/// Repeat ceiling for unbounded quantifiers
pub const MAX_REPEAT: u32 = 10;

/// Pattern-to-URL capability
pub trait UrlGenerator: Send {
    /// Produce one concrete string matching `pattern`
    fn generate(&mut self, pattern: &str) -> Result<String, BuildError>;
}

/// Regex-backed URL generator
pub struct RegexUrlGenerator {
    /// Random number generator
    rng: Xoshiro256PlusPlus,

    /// Compiled patterns
    cache: HashMap<String, rand_regex::Regex>,
}

impl RegexUrlGenerator {
    /// Create a generator seeded from entropy
    pub fn new() -> Self {
        Self {
            rng: Xoshiro256PlusPlus::from_entropy(),
            cache: HashMap::new(),
        }
    }

    /// Create a generator with a fixed seed (reproducible URL sequences)
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            cache: HashMap::new(),
        }
    }

    fn ensure_compiled(&mut self, pattern: &str) -> Result<(), BuildError> {
        if !self.cache.contains_key(pattern) {
            let regex = rand_regex::Regex::compile(pattern, MAX_REPEAT).map_err(|e| {
                BuildError::Pattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                }
            })?;
            self.cache.insert(pattern.to_string(), regex);
        }
        Ok(())
    }
}

impl Default for RegexUrlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlGenerator for RegexUrlGenerator {
    fn generate(&mut self, pattern: &str) -> Result<String, BuildError> {
        self.ensure_compiled(pattern)?;
        let regex = &self.cache[pattern];
        let bytes: Vec<u8> = self.rng.sample(regex);

        String::from_utf8(bytes).map_err(|e| BuildError::Pattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Generator that returns the pattern unchanged
///
/// Useful when every target is literal and no RNG is wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiteralUrlGenerator;

impl UrlGenerator for LiteralUrlGenerator {
    fn generate(&mut self, pattern: &str) -> Result<String, BuildError> {
        Ok(pattern.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_urls_match_pattern() {
        let mut urls = RegexUrlGenerator::with_seed(42);
        let matcher = |s: &str| {
            s.len() == "http://localhost/id/".len() + 3
                && s.starts_with("http://localhost/id/")
                && s["http://localhost/id/".len()..].chars().all(|c| c.is_ascii_digit())
        };

        for _ in 0..50 {
            let url = urls.generate(r"http://localhost/id/[0-9]{3}").unwrap();
            assert!(matcher(&url), "unexpected url {}", url);
        }
    }

    #[test]
    fn test_generated_urls_vary() {
        let mut urls = RegexUrlGenerator::with_seed(1);
        let seen: HashSet<String> = (0..20)
            .map(|_| urls.generate(r"http://localhost/[a-z]{8}").unwrap())
            .collect();
        assert!(seen.len() > 1);
    }

    #[test]
    fn test_seeded_generators_repeat() {
        let mut a = RegexUrlGenerator::with_seed(99);
        let mut b = RegexUrlGenerator::with_seed(99);
        for _ in 0..10 {
            assert_eq!(
                a.generate(r"/p/[a-f0-9]{6}").unwrap(),
                b.generate(r"/p/[a-f0-9]{6}").unwrap()
            );
        }
    }

    #[test]
    fn test_unbounded_repeat_is_capped() {
        let mut urls = RegexUrlGenerator::with_seed(3);
        for _ in 0..50 {
            let url = urls.generate(r"/x/a*").unwrap();
            assert!(url.len() <= "/x/".len() + MAX_REPEAT as usize);
        }
    }

    #[test]
    fn test_invalid_pattern() {
        let mut urls = RegexUrlGenerator::with_seed(0);
        let err = urls.generate(r"http://localhost/[0-9").unwrap_err();
        assert!(matches!(err, BuildError::Pattern { .. }));
    }

    #[test]
    fn test_pattern_compiled_once() {
        let mut urls = RegexUrlGenerator::with_seed(0);
        urls.generate("/a/[0-9]").unwrap();
        urls.generate("/a/[0-9]").unwrap();
        urls.generate("/b/[0-9]").unwrap();
        assert_eq!(urls.cache.len(), 2);
    }

    #[test]
    fn test_literal_generator() {
        let mut urls = LiteralUrlGenerator;
        assert_eq!(urls.generate("/a/[0-9]").unwrap(), "/a/[0-9]");
    }
}
