use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

const MAX_ENTRIES: usize = 10;
const MAX_KEY_LEN: usize = 50;
const MAX_VALUE_LEN: usize = 200;

/// Free-form audit attributes on an entity. The only loosely-typed field in
/// the data model, so it carries explicit size bounds which are checked
/// before any write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(flatten)]
    pub inner: HashMap<String, String>,
}

#[derive(Error, Debug, PartialEq)]
pub enum MetadataSizeError {
    #[error("Metadata cannot have more than {0} entries")]
    TooManyEntries(usize),
    #[error("Metadata key: {0} is longer than {1} characters")]
    KeyTooLong(String, usize),
    #[error("Metadata value for key: {0} is longer than {1} characters")]
    ValueTooLong(String, usize),
}

impl Metadata {
    pub fn validate(&self) -> Result<(), MetadataSizeError> {
        if self.inner.len() > MAX_ENTRIES {
            return Err(MetadataSizeError::TooManyEntries(MAX_ENTRIES));
        }
        for (key, value) in &self.inner {
            if key.len() > MAX_KEY_LEN {
                return Err(MetadataSizeError::KeyTooLong(key.clone(), MAX_KEY_LEN));
            }
            if value.len() > MAX_VALUE_LEN {
                return Err(MetadataSizeError::ValueTooLong(key.clone(), MAX_VALUE_LEN));
            }
        }
        Ok(())
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.inner.get(key)
    }
}
