//! Mapping between declared config keys and resolved state fields.

use crate::{Error, Result};

/// A state field a config key can resolve into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateField {
    ProjectName,
    ProjectType,
}

/// The key-to-field table for a step, fixed at construction.
///
/// The same table drives inbound resolution and outbound config
/// generation: a key that reads into a field also writes from it.
#[derive(Debug, Clone)]
pub struct ConfigKeyMap {
    entries: Vec<(String, StateField)>,
}

impl ConfigKeyMap {
    /// Build a validated table. Duplicate keys or duplicate fields are
    /// rejected.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, StateField)>,
        S: Into<String>,
    {
        let entries: Vec<(String, StateField)> = entries
            .into_iter()
            .map(|(key, field)| (key.into(), field))
            .collect();

        for (index, (key, field)) in entries.iter().enumerate() {
            for (other_key, other_field) in &entries[..index] {
                if key == other_key {
                    return Err(Error::Configuration(format!(
                        "duplicate config key {key:?} in key map"
                    )));
                }
                if field == other_field {
                    return Err(Error::Configuration(format!(
                        "config keys {other_key:?} and {key:?} map to the same field"
                    )));
                }
            }
        }

        Ok(Self { entries })
    }

    /// The conventional table: `name` and `type`.
    pub fn standard() -> Self {
        Self {
            entries: vec![
                ("name".to_string(), StateField::ProjectName),
                ("type".to_string(), StateField::ProjectType),
            ],
        }
    }

    pub fn field_for(&self, key: &str) -> Option<StateField> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, field)| *field)
    }

    pub fn key_for(&self, field: StateField) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, entry_field)| *entry_field == field)
            .map(|(key, _)| key.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, StateField)> {
        self.entries.iter().map(|(key, field)| (key.as_str(), *field))
    }
}
