//! Line-oriented configuration parser.
//!
//! Renderer, scene and camera files share one small text format:
//!
//! ```text
//! # comment
//! EntryName
//! 	key(value0, value1, ...)
//! 	other(value)
//! ```
//!
//! A non-indented line opens a new entry. Indented lines are `key(values)`
//! pairs belonging to the current entry. Blank lines and `#` comments are
//! skipped. Values are comma separated and all whitespace inside them is
//! dropped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use lumen_math::Vec3;
use thiserror::Error;

/// Errors that can occur while reading or querying input files.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Entry '{entry}' is missing key '{key}'")]
    MissingKey { entry: String, key: String },

    #[error("Key '{key}' has no value at index {index}")]
    MissingValue { key: String, index: usize },

    #[error("Key '{key}' has invalid value '{value}'")]
    InvalidValue { key: String, value: String },
}

/// Result type for input operations.
pub type InputResult<T> = Result<T, InputError>;

/// A named entry with its `key(values)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputEntry {
    pub name: String,
    values: HashMap<String, Vec<String>>,
}

impl InputEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: HashMap::new(),
        }
    }

    /// Insert or replace the values of `key`.
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.values.insert(key.into(), values);
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Raw values of `key`.
    pub fn values(&self, key: &str) -> InputResult<&[String]> {
        self.values
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| InputError::MissingKey {
                entry: self.name.clone(),
                key: key.to_string(),
            })
    }

    /// Parse the value at `index` of `key`.
    pub fn get<T: FromStr>(&self, key: &str, index: usize) -> InputResult<T> {
        let raw = self
            .values(key)?
            .get(index)
            .ok_or_else(|| InputError::MissingValue {
                key: key.to_string(),
                index,
            })?;

        raw.parse().map_err(|_| InputError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
        })
    }

    /// Parse the first value of `key`, or `default` when the key is absent.
    pub fn get_or<T: FromStr>(&self, key: &str, default: T) -> InputResult<T> {
        if self.has_key(key) {
            self.get(key, 0)
        } else {
            Ok(default)
        }
    }

    /// Parse values 0..3 of `key` as a vector.
    pub fn get_vec3(&self, key: &str) -> InputResult<Vec3> {
        Ok(Vec3::new(
            self.get(key, 0)?,
            self.get(key, 1)?,
            self.get(key, 2)?,
        ))
    }

    /// Like `get_vec3`, falling back to `default` when the key is absent.
    pub fn get_vec3_or(&self, key: &str, default: Vec3) -> InputResult<Vec3> {
        if self.has_key(key) {
            self.get_vec3(key)
        } else {
            Ok(default)
        }
    }
}

/// Parse input text into its entries, in file order.
pub fn parse_input(content: &str) -> InputResult<Vec<InputEntry>> {
    let mut entries: Vec<InputEntry> = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let line_num = i + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let indented = line.starts_with(|c: char| c.is_whitespace());
        if !indented {
            entries.push(InputEntry::new(trimmed));
            continue;
        }

        let entry = entries.last_mut().ok_or_else(|| InputError::Parse {
            line: line_num,
            message: format!("'{}' does not belong to any entry", trimmed),
        })?;

        let (key, values) = parse_pair(trimmed).ok_or_else(|| InputError::Parse {
            line: line_num,
            message: format!("expected 'key(values)', found '{}'", trimmed),
        })?;
        entry.insert(key, values);
    }

    log::debug!("Parsed {} input entries", entries.len());
    Ok(entries)
}

/// Read and parse an input file.
pub fn parse_input_file<P: AsRef<Path>>(path: P) -> InputResult<Vec<InputEntry>> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_input(&content)
}

fn parse_pair(line: &str) -> Option<(&str, Vec<String>)> {
    let open = line.find('(')?;
    let close = line.rfind(')')?;
    if close < open {
        return None;
    }

    let key = line[..open].trim();
    if key.is_empty() {
        return None;
    }

    let values = line[open + 1..close]
        .split(',')
        .map(|v| v.chars().filter(|c| !c.is_whitespace()).collect())
        .collect();

    Some((key, values))
}
