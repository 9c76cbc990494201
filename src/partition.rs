//! Selecting the entries of a central env that belong to one group.
//!
//! Groups are not a disjoint split: the same source key can land in several
//! groups, and in one group under both its own name and a rewritten name.

use crate::config::Group;
use crate::envfile::EnvMap;
use serde::Serialize;
use std::fmt;

/// How an entry was selected into a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Key starts with the group's own prefix
    Direct,
    /// Key starts with one of the group's `replace` prefixes
    Indirect,
    /// Key is listed in the group's `plain` keys
    Plain,
}

impl EntryKind {
    /// Lowercase label used in listings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Indirect => "indirect",
            Self::Plain => "plain",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One central-env entry as seen by one group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Entry {
    /// Group id
    pub group: String,
    /// The group's own prefix
    pub prefix: String,
    /// How the entry was selected
    pub kind: EntryKind,
    /// Key with the matched prefix removed (unchanged for plain keys)
    pub name: String,
    /// Value from the central env
    pub value: String,
}

/// Strips `prefix` followed by `_` from the start of `key`.
fn strip_group_prefix<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.strip_prefix(prefix)?.strip_prefix('_')
}

/// Computes the env file content for `group` from the central `source`.
///
/// Direct keys keep their name, keys under a `replace` prefix get that
/// prefix's first occurrence swapped for the group prefix, and `plain`
/// keys are copied verbatim.
#[must_use]
pub fn partition(group: &Group, source: &EnvMap) -> EnvMap {
    let mut out = EnvMap::with_capacity(source.len().min(crate::envfile::DEFAULT_SIZE_HINT));
    for (key, value) in source {
        if strip_group_prefix(key, &group.prefix).is_some() {
            out.insert(key.clone(), value.clone());
        }
        for alt in &group.replace {
            if strip_group_prefix(key, alt).is_some() {
                out.insert(key.replacen(alt.as_str(), &group.prefix, 1), value.clone());
            }
        }
        if group.plain.iter().any(|plain| plain == key) {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

/// Lists every entry `group` would receive, labelled by how it matched.
#[must_use]
pub fn entries(id: &str, group: &Group, source: &EnvMap) -> Vec<Entry> {
    let entry = |kind, name: &str, value: &str| Entry {
        group: id.to_string(),
        prefix: group.prefix.clone(),
        kind,
        name: name.to_string(),
        value: value.to_string(),
    };

    let mut out = Vec::new();
    for (key, value) in source {
        if let Some(name) = strip_group_prefix(key, &group.prefix) {
            out.push(entry(EntryKind::Direct, name, value));
        }
    }
    for alt in &group.replace {
        for (key, value) in source {
            if let Some(name) = strip_group_prefix(key, alt) {
                out.push(entry(EntryKind::Indirect, name, value));
            }
        }
    }
    for key in &group.plain {
        if let Some(value) = source.get(key) {
            out.push(entry(EntryKind::Plain, key, value));
        }
    }
    out
}

/// Reports whether a value counts as empty for `check = true` groups:
/// zero-length, or one of the quoted-empty forms `''`, `""` and ``` `` ```.
#[must_use]
pub fn is_empty_value(value: &str) -> bool {
    matches!(value, "" | "''" | "\"\"" | "``")
}

/// Returns the smallest key of `env` whose value is empty, if any.
#[must_use]
pub fn first_empty_key(env: &EnvMap) -> Option<&str> {
    env.iter()
        .filter(|(_, value)| is_empty_value(value))
        .map(|(key, _)| key.as_str())
        .min()
}
