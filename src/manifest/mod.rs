// src/manifest/mod.rs

//! IPS manifest reader
//!
//! A manifest is a text file with one action per line:
//!
//! ```text
//! set name=pkg.fmri value=pkg://publisher/system/foo@0.5.11,5.11
//! dir path=usr/lib/foo owner=root group=bin mode=0755
//! file 1a2b3c path=usr/lib/foo/libfoo.so.1 owner=root group=bin mode=0755
//! ```
//!
//! Only the parts of the format the converter consumes are modelled here.

pub mod action;
pub mod fmri;

pub use action::{Action, ActionKind, AttrValue, NOHASH};
pub use fmri::{Fmri, FmriError};

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// A parsed IPS manifest
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    actions: Vec<Action>,
    attributes: BTreeMap<String, AttrValue>,
}

impl Manifest {
    /// Read and parse a manifest file
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!("Reading manifest: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse manifest text
    pub fn parse(content: &str) -> Result<Self> {
        let mut manifest = Manifest::default();
        let mut pending = String::new();
        let mut start_line = 0;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            if pending.is_empty() {
                let trimmed = raw.trim_start();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    continue;
                }
                start_line = line_no;
            }

            // Trailing backslash continues the action on the next line
            match raw.strip_suffix('\\') {
                Some(head) => {
                    pending.push_str(head);
                    pending.push(' ');
                }
                None => {
                    pending.push_str(raw);
                    manifest.push(Action::parse(&pending, start_line)?, start_line)?;
                    pending.clear();
                }
            }
        }

        if !pending.trim().is_empty() {
            manifest.push(Action::parse(&pending, start_line)?, start_line)?;
        }

        debug!("Parsed manifest with {} actions", manifest.actions.len());
        Ok(manifest)
    }

    /// Append an action, indexing `set` attributes
    pub fn push(&mut self, action: Action, line_no: usize) -> Result<()> {
        if action.kind == ActionKind::Set {
            let name = action.attr_first("name").ok_or_else(|| Error::ManifestParse {
                line: line_no,
                message: "set action without name".to_string(),
            })?;
            let value = action.attr("value").cloned().ok_or_else(|| Error::ManifestParse {
                line: line_no,
                message: format!("set action '{}' without value", name),
            })?;
            self.attributes.insert(name.to_string(), value);
        }
        self.actions.push(action);
        Ok(())
    }

    /// Value of a `set` attribute
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// First value of a `set` attribute
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get(name).map(AttrValue::first)
    }

    /// Whether a `set` attribute is present with a non-false value
    pub fn is_set(&self, name: &str) -> bool {
        self.get_first(name)
            .is_some_and(|v| !v.is_empty() && !v.eq_ignore_ascii_case("false"))
    }

    /// Actions of one kind, in manifest order
    pub fn actions_by_kind<'a>(&'a self, kind: &'a ActionKind) -> impl Iterator<Item = &'a Action> + 'a {
        self.actions.iter().filter(move |a| &a.kind == kind)
    }

    /// Whether the manifest has at least one action of `kind`
    pub fn has_actions(&self, kind: &ActionKind) -> bool {
        self.actions.iter().any(|a| &a.kind == kind)
    }

    /// All actions in manifest order
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}
