//! Persona loading: one immutable text blob per agent, read from a content directory.
//!
//! Personas are loaded once into a `PersonaSet` at startup and handed to agents by value,
//! never looked up again at call time.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The five agent persona keys.
pub const PERSONA_KEYS: [&str; 5] = ["coordinator", "intake", "credit", "income", "risk"];

#[derive(Debug, Error)]
pub enum PersonaError {
    #[error("missing persona file for '{key}' at {path}")]
    MissingPersona { key: String, path: PathBuf },
    #[error("read persona file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Immutable set of persona texts, loaded once and passed into the orchestrator by value.
///
/// `load` is strict: every key in `PERSONA_KEYS` must resolve to a readable file, and the
/// coordinator persona in particular must never fall back to a generic default. Use `load_tolerant` only
/// for the four specialists in contexts (e.g. tests) that accept a generic fallback.
#[derive(Clone, Debug)]
pub struct PersonaSet {
    texts: HashMap<String, String>,
}

impl PersonaSet {
    /// Loads every persona in `PERSONA_KEYS` from `dir/<key>.md`. Fails with `MissingPersona`
    /// on the first absent file (coordinator included — there is no tolerant path here).
    pub fn load(dir: &Path) -> Result<Self, PersonaError> {
        let mut texts = HashMap::new();
        for key in PERSONA_KEYS {
            let text = read_persona_file(dir, key)?;
            texts.insert(key.to_string(), text);
        }
        Ok(Self { texts })
    }

    /// Like `load`, but a missing specialist persona file (never the coordinator's) is
    /// replaced with a short generic fallback instead of failing. Used only where the spec
    /// explicitly tolerates absence — the coordinator key still fails fast.
    pub fn load_tolerant(dir: &Path) -> Result<Self, PersonaError> {
        let mut texts = HashMap::new();
        for key in PERSONA_KEYS {
            let text = match read_persona_file(dir, key) {
                Ok(t) => t,
                Err(PersonaError::MissingPersona { .. }) if key != "coordinator" => {
                    generic_fallback(key)
                }
                Err(e) => return Err(e),
            };
            texts.insert(key.to_string(), text);
        }
        Ok(Self { texts })
    }

    /// Returns the persona text for `key`. Fails with `MissingPersona` if `key` was never
    /// loaded (should not happen for the five keys in `PERSONA_KEYS` after a successful `load`).
    pub fn get(&self, key: &str) -> Result<&str, PersonaError> {
        self.texts
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| PersonaError::MissingPersona {
                key: key.to_string(),
                path: PathBuf::new(),
            })
    }
}

fn read_persona_file(dir: &Path, key: &str) -> Result<String, PersonaError> {
    let path = dir.join(format!("{key}.md"));
    match fs::read_to_string(&path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PersonaError::MissingPersona {
            key: key.to_string(),
            path,
        }),
        Err(source) => Err(PersonaError::Read { path, source }),
    }
}

fn generic_fallback(key: &str) -> String {
    format!("You are the {key} specialist for a loan-intake assessment pipeline. Reason carefully from the application data you are given and respond in the required structured format.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_persona(dir: &Path, key: &str, text: &str) {
        fs::write(dir.join(format!("{key}.md")), text).unwrap();
    }

    #[test]
    fn load_succeeds_when_all_five_files_present() {
        let dir = tempfile::tempdir().unwrap();
        for key in PERSONA_KEYS {
            write_persona(dir.path(), key, &format!("persona for {key}"));
        }
        let set = PersonaSet::load(dir.path()).unwrap();
        assert_eq!(set.get("coordinator").unwrap(), "persona for coordinator");
        assert_eq!(set.get("risk").unwrap(), "persona for risk");
    }

    #[test]
    fn load_fails_when_coordinator_missing() {
        let dir = tempfile::tempdir().unwrap();
        for key in ["intake", "credit", "income", "risk"] {
            write_persona(dir.path(), key, "x");
        }
        let err = PersonaSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, PersonaError::MissingPersona { key, .. } if key == "coordinator"));
    }

    #[test]
    fn load_tolerant_falls_back_for_missing_specialist_but_not_coordinator() {
        let dir = tempfile::tempdir().unwrap();
        write_persona(dir.path(), "coordinator", "coord text");
        write_persona(dir.path(), "risk", "risk text");
        // intake, credit, income left absent.
        let set = PersonaSet::load_tolerant(dir.path()).unwrap();
        assert_eq!(set.get("coordinator").unwrap(), "coord text");
        assert!(set.get("intake").unwrap().contains("intake specialist"));
        assert_eq!(set.get("risk").unwrap(), "risk text");
    }

    #[test]
    fn load_tolerant_still_fails_when_coordinator_missing() {
        let dir = tempfile::tempdir().unwrap();
        for key in ["intake", "credit", "income", "risk"] {
            write_persona(dir.path(), key, "x");
        }
        let err = PersonaSet::load_tolerant(dir.path()).unwrap_err();
        assert!(matches!(err, PersonaError::MissingPersona { key, .. } if key == "coordinator"));
    }
}
