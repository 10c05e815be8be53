//! Alias table mapping alternate road names to a preferred one.

use anyhow::Result;
use std::collections::HashMap;

use crate::matching::normalize::normalize;
use crate::matching::types::CanonicalName;

/// Known alternate names of Bangalore's arterial roads.
const BANGALORE_ALIASES: &[(&str, &str)] = &[
    ("mg rd", "mg road"),
    ("m g rd", "mg road"),
    ("m g road", "mg road"),
    ("outer ring rd", "outer ring road"),
    ("orr", "outer ring road"),
    ("bellary rd", "ballari road"),
    ("blr rd", "ballari road"),
    ("hosur rd", "hosur road"),
    ("bannerghatta rd", "bannerghatta road"),
    ("old madras rd", "old madras road"),
    ("airport rd", "airport road"),
];

/// Immutable mapping from alternate names to a preferred canonical name.
///
/// Keys and values are passed through [`normalize`] when the table is built,
/// so lookups happen on fully normalized names and entries may be written in
/// their natural abbreviated form ("bellary rd"). Resolution is a single
/// lookup, never chained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: HashMap<CanonicalName, CanonicalName>,
}

impl AliasTable {
    pub fn new<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (normalize(Some(k.as_ref())), normalize(Some(v.as_ref()))))
            .filter(|(k, v)| !k.is_empty() && k != v)
            .collect();
        Self { entries }
    }

    /// The built-in table for Bangalore.
    pub fn bangalore() -> Self {
        Self::new(BANGALORE_ALIASES.iter().copied())
    }

    /// Loads a table from a JSON object on disk:
    /// ```json
    /// { "orr": "outer ring road", "bellary rd": "ballari road" }
    /// ```
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let entries: HashMap<String, String> = serde_json::from_str(&content)?;
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maps an already normalized name to its preferred form, or returns it
    /// unchanged.
    pub fn resolve(&self, name: &str) -> CanonicalName {
        self.entries
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Normalizes a raw name, then resolves it.
    pub fn canonicalize(&self, raw: Option<&str>) -> CanonicalName {
        self.resolve(&normalize(raw))
    }
}
