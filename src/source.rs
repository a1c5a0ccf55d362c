// Copyright 2024-2026 DSPOOL-CORE Contributors
// SPDX-License-Identifier: Apache-2.0

//! Flat key/value configuration sources.
//!
//! A source exposes an unordered set of dotted property names and a lookup
//! from name to raw string value. Datasource definitions live under
//! `datasource.<id>.<key>`; see [`crate::datasource`] for how they are read.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised by typed value lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValueError {
    #[error("Property not found: {0}")]
    NotFound(String),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Errors raised while loading a source from text or disk.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid properties line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Read-only view over a flat configuration namespace.
pub trait ConfigSource: Send + Sync {
    /// All property names, in no particular order.
    fn property_names(&self) -> Vec<String>;

    /// Raw value for `name`, if present.
    fn get_value(&self, name: &str) -> Option<String>;

    /// Value for `name` converted through [`FromStr`].
    fn get_typed<T>(&self, name: &str) -> Result<T, ConfigValueError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
        Self: Sized,
    {
        get_typed(self, name)
    }
}

/// Typed lookup usable through `&dyn ConfigSource`.
pub fn get_typed<T>(source: &dyn ConfigSource, name: &str) -> Result<T, ConfigValueError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = source
        .get_value(name)
        .ok_or_else(|| ConfigValueError::NotFound(name.to_string()))?;
    raw.trim().parse::<T>().map_err(|e| ConfigValueError::Invalid {
        key: name.to_string(),
        reason: e.to_string(),
    })
}

/// In-memory source backed by a sorted map.
#[derive(Debug, Clone, Default)]
pub struct MapConfigSource {
    values: BTreeMap<String, String>,
}

impl MapConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse a TOML document, flattening nested tables into dotted names.
    ///
    /// `[datasource.orders]` with `connection-url = "..."` becomes
    /// `datasource.orders.connection-url`. Arrays are joined with commas.
    pub fn from_toml_str(text: &str) -> Result<Self, SourceError> {
        let table: toml::Table = text.parse()?;
        let mut source = Self::new();
        flatten_table("", &table, &mut source.values);
        Ok(source)
    }

    /// Load a TOML file from disk.
    pub fn from_toml_file(path: &Path) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse Java `.properties` text.
    ///
    /// - `#` and `!` start comment lines; blank lines are skipped
    /// - a line ending in an odd number of `\` continues on the next line,
    ///   whose leading whitespace is dropped
    /// - the key ends at the first unescaped `=`, `:` or whitespace
    /// - `\t`, `\n`, `\r`, `\f` and `\uXXXX` are decoded; any other
    ///   escaped character stands for itself
    pub fn from_properties_str(text: &str) -> Result<Self, SourceError> {
        let mut source = Self::new();
        let mut lines = text.lines().enumerate();

        while let Some((idx, raw)) = lines.next() {
            let line = raw.trim_start_matches(is_properties_space);
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let mut logical = line.to_string();
            while has_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some((_, next)) => {
                        logical.push_str(next.trim_start_matches(is_properties_space))
                    }
                    None => break,
                }
            }

            let line_no = idx + 1;
            let (raw_key, raw_value) = split_property(&logical);
            let key = unescape_properties(raw_key, line_no)?;
            if key.is_empty() {
                return Err(SourceError::Parse {
                    line: line_no,
                    reason: "empty key".to_string(),
                });
            }
            source.insert(key, unescape_properties(raw_value, line_no)?);
        }
        Ok(source)
    }

    /// Load a file, choosing the parser from the extension (`.properties`
    /// or anything else as TOML).
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let is_properties = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("properties"))
            .unwrap_or(false);
        if is_properties {
            let text = std::fs::read_to_string(path)?;
            Self::from_properties_str(&text)
        } else {
            Self::from_toml_file(path)
        }
    }

    /// Overlay environment variables of the form
    /// `<PREFIX>ORDERS__CONNECTION_URL`, mapped to
    /// `datasource.orders.connection-url`. Env values win over existing ones.
    pub fn with_env_overlay(self, prefix: &str) -> Self {
        self.with_overlay(std::env::vars(), prefix)
    }

    fn with_overlay<I>(mut self, vars: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            let Some(rest) = name.strip_prefix(prefix) else {
                continue;
            };
            let Some((id, key)) = rest.split_once("__") else {
                continue;
            };
            if id.is_empty() || key.is_empty() {
                continue;
            }
            let property = format!(
                "datasource.{}.{}",
                id.to_ascii_lowercase(),
                key.to_ascii_lowercase().replace('_', "-")
            );
            self.insert(property, value);
        }
        self
    }
}

impl ConfigSource for MapConfigSource {
    fn property_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    fn get_value(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

fn is_properties_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn has_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Split a logical line into raw (still escaped) key and value.
fn split_property(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if is_properties_space(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let rest = line[key_end..].trim_start_matches(is_properties_space);
    let rest = rest.strip_prefix(['=', ':']).unwrap_or(rest);
    (&line[..key_end], rest.trim_start_matches(is_properties_space))
}

fn unescape_properties(raw: &str, line: usize) -> Result<String, SourceError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4 && hex.chars().all(|h| h.is_ascii_hexdigit()))
                    .and_then(char::from_u32)
                    .ok_or_else(|| SourceError::Parse {
                        line,
                        reason: format!("malformed \\u escape '\\u{}'", hex),
                    })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

fn flatten_table(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            toml::Value::Table(inner) => flatten_table(&name, inner, out),
            other => {
                out.insert(name, scalar_to_string(other));
            }
        }
    }
}

fn scalar_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
