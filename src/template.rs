//! Config template rendering
//!
//! Templates are plain text holding `%PLACEHOLDER%` tokens. Every token must
//! have a matching option; an unmatched token aborts rendering instead of
//! leaving a half-substituted config behind.

use crate::error::{CampaignError, Result};
use crate::options::Options;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct Template {
    name: String,
    text: String,
}

impl Template {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| CampaignError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded template {} ({} bytes)", path.display(), text.len());
        Ok(Self::new(path.display().to_string(), text))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct placeholder keys appearing in the template
    pub fn placeholders(&self) -> BTreeSet<String> {
        find_placeholders(&self.text)
    }

    /// Substitute every `%KEY%` with its option's text form.
    ///
    /// Options without a placeholder are ignored; placeholders without an
    /// option fail with `UnresolvedPlaceholders`.
    pub fn render(&self, options: &Options) -> Result<String> {
        let missing: Vec<String> = self
            .placeholders()
            .into_iter()
            .filter(|key| !options.contains_key(key))
            .collect();
        if !missing.is_empty() {
            return Err(CampaignError::UnresolvedPlaceholders {
                template: self.name.clone(),
                placeholders: missing,
            });
        }

        // single pass: text inserted from an option is never rescanned
        let mut contents = String::with_capacity(self.text.len());
        let mut last = 0;
        for (start, end, key) in placeholder_spans(&self.text) {
            if let Some(value) = options.get(key) {
                contents.push_str(&self.text[last..start]);
                contents.push_str(&value.render());
                last = end;
            }
        }
        contents.push_str(&self.text[last..]);

        for key in options.keys() {
            if !self.text.contains(&format!("%{}%", key)) {
                debug!("option {} has no placeholder in {}", key, self.name);
            }
        }

        let leftover: Vec<String> = find_placeholders(&contents).into_iter().collect();
        if !leftover.is_empty() {
            return Err(CampaignError::UnresolvedPlaceholders {
                template: self.name.clone(),
                placeholders: leftover,
            });
        }
        Ok(contents)
    }
}

/// File name of the generated config for an experiment
pub fn config_file_name(experiment: &str) -> String {
    format!("config-{}.json", experiment)
}

/// Write a rendered config into `dir`, overwriting any previous one
pub fn write_config(dir: &Path, experiment: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(config_file_name(experiment));
    fs::write(&path, contents).map_err(|source| CampaignError::ConfigWrite {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Byte ranges of `%KEY%` tokens, with KEY a non-empty run of `[A-Za-z0-9_]`
fn placeholder_spans(text: &str) -> Vec<(usize, usize, &str)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        let start = i + 1;
        let mut end = start;
        while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
            end += 1;
        }
        if end > start && end < bytes.len() && bytes[end] == b'%' {
            spans.push((i, end + 1, &text[start..end]));
            i = end + 1;
        } else {
            i = start;
        }
    }
    spans
}

fn find_placeholders(text: &str) -> BTreeSet<String> {
    placeholder_spans(text)
        .into_iter()
        .map(|(_, _, key)| key.to_string())
        .collect()
}
