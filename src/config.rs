//! Declared-configuration store.
//!
//! The declared configuration is a TOML file of named sections holding
//! scalar values: capability lists are comma-separated string tokens,
//! availability flags are booleans. The store reads values on demand and
//! rewrites the whole file in one pass when a run flushes its corrections.
//! The rewrite target is validated before any probing happens so a late
//! write failure can never discard an already-computed report.

use crate::error::VerifyError;
use crate::reconcile::UpdateSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use toml::{Table, Value};

pub struct ConfigStore {
    source: PathBuf,
    sections: Table,
}

impl ConfigStore {
    /// Loads the declared configuration from disk.
    pub fn load(path: &Path) -> Result<Self, VerifyError> {
        let raw = fs::read_to_string(path).map_err(|err| VerifyError::Persistence {
            reason: format!("reading {}: {err}", path.display()),
        })?;
        let mut store = Self::parse(&raw).map_err(|err| VerifyError::Persistence {
            reason: format!("parsing {}: {err}", path.display()),
        })?;
        store.source = path.to_path_buf();
        Ok(store)
    }

    /// Builds a store from raw TOML text. The source path is unset; callers
    /// that never rewrite to a file (tests, stdout-only runs) don't need one.
    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        let sections: Table = toml::from_str(raw)?;
        Ok(Self {
            source: PathBuf::new(),
            sections,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Current declared value rendered as a string: string values verbatim,
    /// booleans as `true`/`false`. Other shapes read as absent.
    pub fn declared(&self, section: &str, key: &str) -> Option<String> {
        match self.sections.get(section)?.get(key)? {
            Value::String(value) => Some(value.clone()),
            Value::Boolean(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    /// Boolean read of a declared flag; absent or non-boolean reads as false.
    pub fn declared_flag(&self, section: &str, key: &str) -> bool {
        matches!(self.declared(section, key).as_deref(), Some("true"))
    }

    /// Validates the rewrite target up front. A file target is created (and
    /// truncated) now so permission problems surface before any probing; it
    /// must differ from the declared-config source.
    pub fn open_target(&self, output: Option<&Path>) -> Result<OutputTarget, VerifyError> {
        let Some(path) = output else {
            return Ok(OutputTarget::Stdout);
        };
        if same_file(&self.source, path) {
            return Err(VerifyError::Persistence {
                reason: format!(
                    "output target {} must differ from the declared-config source",
                    path.display()
                ),
            });
        }
        fs::File::create(path).map_err(|err| VerifyError::Persistence {
            reason: format!("opening output target {}: {err}", path.display()),
        })?;
        Ok(OutputTarget::File(path.to_path_buf()))
    }

    /// Applies the buffered update set and writes the whole configuration to
    /// the target in one pass.
    pub fn write_all(&self, updates: &UpdateSet, target: &mut OutputTarget) -> Result<(), VerifyError> {
        let mut sections = self.sections.clone();
        for ((section, key), value) in updates.iter() {
            let entry = sections
                .entry(section.to_string())
                .or_insert_with(|| Value::Table(Table::new()));
            if !entry.is_table() {
                *entry = Value::Table(Table::new());
            }
            if let Value::Table(table) = entry {
                table.insert(key.to_string(), value.clone());
            }
        }
        let rendered = toml::to_string_pretty(&sections).map_err(|err| VerifyError::Persistence {
            reason: format!("serializing corrected configuration: {err}"),
        })?;
        target.write(&rendered)
    }
}

/// Where a corrected configuration goes: stdout, or an atomic file replace.
#[derive(Debug)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    fn write(&mut self, contents: &str) -> Result<(), VerifyError> {
        match self {
            OutputTarget::Stdout => {
                print!("{contents}");
                Ok(())
            }
            OutputTarget::File(path) => {
                let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
                let mut tmp = match dir {
                    Some(dir) => NamedTempFile::new_in(dir),
                    None => NamedTempFile::new(),
                }
                .map_err(|err| VerifyError::Persistence {
                    reason: format!("allocating temp file near {}: {err}", path.display()),
                })?;
                tmp.write_all(contents.as_bytes())
                    .map_err(|err| VerifyError::Persistence {
                        reason: format!("writing corrected configuration: {err}"),
                    })?;
                tmp.persist(path.as_path()).map_err(|err| VerifyError::Persistence {
                    reason: format!("replacing {}: {err}", path.display()),
                })?;
                Ok(())
            }
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a.as_os_str().is_empty() {
        return false;
    }
    let resolve = |p: &Path| fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf());
    resolve(a) == resolve(b)
}
