//! Parameter-file access.
//!
//! The parameter file is line-oriented: each record is `--name value` (the
//! value may be empty for flags), and lines starting with `#` are comments.
//! Order is preserved on save so a hand-edited file stays recognizable.

use std::path::Path;
use tracing::debug;

use crate::error::ModelResult;

/// In-memory view of a `parms.prm` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parms {
    /// `(name, value)` records in file order.
    entries: Vec<(String, String)>,
}

impl Parms {
    /// Parses parameter text. Comment and blank lines are skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut entries = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once(char::is_whitespace) {
                Some((name, value)) => {
                    entries.push((name.to_string(), value.trim().to_string()));
                }
                None => entries.push((line.to_string(), String::new())),
            }
        }
        Self { entries }
    }

    /// Reads the parameter file at `path`.
    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Writes the parameters back out in file order.
    pub fn save(&self, path: impl AsRef<Path>) -> ModelResult<()> {
        let mut text = String::new();
        for (name, value) in &self.entries {
            if value.is_empty() {
                text.push_str(name);
            } else {
                text.push_str(name);
                text.push(' ');
                text.push_str(value);
            }
            text.push('\n');
        }
        std::fs::write(path.as_ref(), text)?;
        debug!(path = %path.as_ref().display(), parms = self.entries.len(), "Parameter file saved");
        Ok(())
    }

    /// Value of the named parameter, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets a parameter, replacing an existing record or appending.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The metadata columns, from the comma-delimited `--metaCols` value.
    #[must_use]
    pub fn meta_columns(&self) -> Vec<String> {
        self.get("--metaCols")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|col| !col.is_empty())
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The record-id column: the first metadata column, when there is one.
    #[must_use]
    pub fn id_column(&self) -> Option<String> {
        self.meta_columns().into_iter().next()
    }
}
