//! Flat string-keyed run properties.
//!
//! # File format
//!
//! ```text
//! # comment
//! ! also a comment
//! Model.Random.Seed = 1234
//! RunModel.AutoOwnership = true
//! Packet.Size = 500
//! ```
//!
//! Keys are case-sensitive.  Later duplicates overwrite earlier ones, so a
//! scenario file can be appended after a base file.  Typed getters take a
//! default; `require_*` getters make a missing key a fatal configuration
//! error.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyMap {
    entries: BTreeMap<String, String>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a properties file.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let file = std::fs::File::open(path)?;
        let map = Self::from_reader(file)?;
        log::info!("loaded {} properties from {}", map.len(), path.display());
        Ok(map)
    }

    /// Like [`from_path`][Self::from_path] but accepts any `Read` source.
    pub fn from_reader<R: Read>(reader: R) -> CoreResult<Self> {
        let mut map = Self::new();
        map.merge_reader(reader)?;
        Ok(map)
    }

    /// Parse `reader` on top of the existing entries.
    pub fn merge_reader<R: Read>(&mut self, reader: R) -> CoreResult<()> {
        for (n, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some((key, value)) = line.split_once(['=', ':']) else {
                return Err(CoreError::Parse(format!(
                    "line {}: expected `key = value`, got {line:?}",
                    n + 1
                )));
            };
            self.set(key.trim(), value.trim());
        }
        Ok(())
    }

    /// Builder-style insert, handy in tests and demos.
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        self.entries.insert(key.to_owned(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // ── Typed getters ─────────────────────────────────────────────────────

    pub fn require(&self, key: &str) -> CoreResult<&str> {
        self.get(key).ok_or_else(|| CoreError::MissingProperty(key.to_owned()))
    }

    /// `true`/`false` (any case).  Absent → `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> CoreResult<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
            Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
            Some(v) => Err(bad(key, v, "bool")),
        }
    }

    pub fn get_usize(&self, key: &str, default: usize) -> CoreResult<usize> {
        self.get_parsed(key, "unsigned integer").map(|v| v.unwrap_or(default))
    }

    pub fn get_u64(&self, key: &str, default: u64) -> CoreResult<u64> {
        self.get_parsed(key, "unsigned integer").map(|v| v.unwrap_or(default))
    }

    pub fn get_f64(&self, key: &str, default: f64) -> CoreResult<f64> {
        self.get_parsed(key, "number").map(|v| v.unwrap_or(default))
    }

    pub fn require_usize(&self, key: &str) -> CoreResult<usize> {
        self.get_parsed(key, "unsigned integer")?
            .ok_or_else(|| CoreError::MissingProperty(key.to_owned()))
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_owned()
    }

    /// Comma-separated list; absent or empty → empty `Vec`.
    pub fn get_list<T: FromStr>(&self, key: &str) -> CoreResult<Vec<T>> {
        let Some(raw) = self.get(key) else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<T>().map_err(|_| bad(key, s, "list element")))
            .collect()
    }

    fn get_parsed<T: FromStr>(&self, key: &str, expected: &'static str) -> CoreResult<Option<T>> {
        self.get(key)
            .map(|v| v.parse::<T>().map_err(|_| bad(key, v, expected)))
            .transpose()
    }
}

fn bad(key: &str, value: &str, expected: &'static str) -> CoreError {
    CoreError::BadProperty {
        key:   key.to_owned(),
        value: value.to_owned(),
        expected,
    }
}
