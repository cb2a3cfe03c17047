use crate::domain::constants::{DEFAULT_IDENTITY_MARKER, DEFAULT_REPLY_TIMEOUT_MS, DEFAULT_SETTLE_MS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

fn default_settle_ms() -> u64 {
    DEFAULT_SETTLE_MS
}

fn default_reply_timeout_ms() -> u64 {
    DEFAULT_REPLY_TIMEOUT_MS
}

fn default_identity_marker() -> String {
    DEFAULT_IDENTITY_MARKER.to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// Textual key -> replacement mapping applied to every compiled line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstitutionTable(BTreeMap<String, String>);

impl SubstitutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers per-run overrides on top of a persisted table. The result is a
    /// working copy; nothing here is written back to the store.
    pub fn with_overrides(mut base: SubstitutionTable, overrides: &[(String, String)]) -> Self {
        for (key, value) in overrides {
            base.set(key.clone(), value.clone());
        }
        base
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn set(&mut self, key: String, value: String) -> Option<String> {
        self.0.insert(key, value)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replaces every literal occurrence of every key in `line`.
    pub fn apply(&self, line: &str) -> String {
        let mut out = line.to_string();
        for (key, value) in self.iter() {
            if !key.is_empty() && out.contains(key) {
                out = out.replace(key, value);
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchDirective {
    pub key: String,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Define { key: String, value: String },
    Search(SearchDirective),
    Unknown { name: String },
}

/// Result of one compilation: the compiled text plus the searches that must
/// be resolved against a live server before the text can be installed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledDocument {
    pub text: String,
    pub searches: Vec<SearchDirective>,
    pub unknown_directives: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostFile {
    pub host: HostConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    pub address: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_reply_timeout_ms")]
    pub reply_timeout_ms: u64,
    #[serde(default = "default_identity_marker")]
    pub identity_marker: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectFile {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default)]
    pub targets: Vec<ProjectTarget>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectTarget {
    pub name: String,
    pub output: PathBuf,
    pub files: Vec<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct DefineEntry {
    pub name: String,
    pub value: String,
}

/// What a store mutation did.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreOutcome {
    Disabled,
    Defined,
    Deleted,
    NotDefined,
}

#[derive(Serialize, Debug)]
pub struct CompileReport {
    pub target: Option<String>,
    pub destination: String,
    pub lines: usize,
    pub searches: Vec<SearchDirective>,
    pub unknown_directives: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ResolvedSearch {
    pub key: String,
    pub query: String,
    pub answer: String,
}

#[derive(Serialize, Debug)]
pub struct InstallReport {
    pub host: String,
    pub resolved: Vec<ResolvedSearch>,
    pub lines_sent: usize,
}
