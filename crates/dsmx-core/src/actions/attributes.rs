//! Flat string-keyed attribute maps for persisting actions

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use dsmx_core_types::{ElementId, RelationId};

use crate::errors::{DsmError, Result};
use crate::ops::DsmModel;

/// Writer side: typed setters over a `BTreeMap<String, String>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionAttributes {
    data: BTreeMap<String, String>,
}

impl ActionAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.data.insert(key.to_string(), value.to_string());
    }

    /// Absent values are not written
    pub fn set_optional_string(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.set_string(key, value);
        }
    }

    pub fn set_element(&mut self, key: &str, id: ElementId) {
        self.set_string(key, &id.to_string());
    }

    pub fn set_relation(&mut self, key: &str, id: RelationId) {
        self.set_string(key, &id.to_string());
    }

    pub fn set_usize(&mut self, key: &str, value: usize) {
        self.set_string(key, &value.to_string());
    }

    pub fn set_u32(&mut self, key: &str, value: u32) {
        self.set_string(key, &value.to_string());
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set_string(key, if value { "true" } else { "false" });
    }

    /// Comma separated
    pub fn set_usize_list(&mut self, key: &str, values: &[usize]) {
        let joined: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.set_string(key, &joined.join(","));
    }

    pub fn set_relation_list(&mut self, key: &str, values: &[RelationId]) {
        let joined: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.set_string(key, &joined.join(","));
    }

    /// RFC 3339
    pub fn set_timestamp(&mut self, key: &str, value: DateTime<Utc>) {
        self.set_string(key, &value.to_rfc3339());
    }

    pub fn into_data(self) -> BTreeMap<String, String> {
        self.data
    }
}

/// Reader side: typed getters that validate ids against a model
pub struct ActionReadOnlyAttributes<'a> {
    model: &'a DsmModel,
    action_type: &'a str,
    data: &'a BTreeMap<String, String>,
}

impl<'a> ActionReadOnlyAttributes<'a> {
    pub fn new(model: &'a DsmModel, action_type: &'a str, data: &'a BTreeMap<String, String>) -> Self {
        Self {
            model,
            action_type,
            data,
        }
    }

    fn invalid(&self, key: &str, reason: impl Into<String>) -> DsmError {
        DsmError::InvalidActionData {
            action_type: self.action_type.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidActionData` if the key is missing.
    pub fn get_string(&self, key: &str) -> Result<String> {
        self.data
            .get(key)
            .cloned()
            .ok_or_else(|| self.invalid(key, "is missing"))
    }

    pub fn get_optional_string(&self, key: &str) -> Option<String> {
        self.data.get(key).cloned()
    }

    fn parse<T: FromStr>(&self, key: &str) -> Result<T> {
        let text = self.get_string(key)?;
        text.trim()
            .parse()
            .map_err(|_| self.invalid(key, format!("has malformed value '{}'", text)))
    }

    /// # Errors
    ///
    /// Returns `InvalidActionData` if the key is missing or malformed.
    pub fn get_usize(&self, key: &str) -> Result<usize> {
        self.parse(key)
    }

    /// # Errors
    ///
    /// Returns `InvalidActionData` if the key is missing or malformed.
    pub fn get_u32(&self, key: &str) -> Result<u32> {
        self.parse(key)
    }

    /// # Errors
    ///
    /// Returns `InvalidActionData` if the key is missing or malformed.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.parse(key)
    }

    /// Element id that the model knows, live or deleted
    ///
    /// # Errors
    ///
    /// Returns `InvalidActionData` if the key is missing, malformed or names
    /// an id the model never allocated.
    pub fn get_element(&self, key: &str) -> Result<ElementId> {
        let id: ElementId = self.parse(key)?;
        if !self.model.elements().knows(id) {
            return Err(self.invalid(key, format!("refers to unknown element {}", id)));
        }
        Ok(id)
    }

    /// Relation id that the model knows, live or deleted
    ///
    /// # Errors
    ///
    /// Returns `InvalidActionData` if the key is missing, malformed or names
    /// an id the model never allocated.
    pub fn get_relation(&self, key: &str) -> Result<RelationId> {
        let id: RelationId = self.parse(key)?;
        if !self.model.relations().knows(id) {
            return Err(self.invalid(key, format!("refers to unknown relation {}", id)));
        }
        Ok(id)
    }

    /// Optional relation id; a present value must be known to the model
    ///
    /// # Errors
    ///
    /// Returns `InvalidActionData` for malformed or unknown ids.
    pub fn get_optional_relation(&self, key: &str) -> Result<Option<RelationId>> {
        if self.data.contains_key(key) {
            self.get_relation(key).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Optional element id; a present value must be known to the model
    ///
    /// # Errors
    ///
    /// Returns `InvalidActionData` for malformed or unknown ids.
    pub fn get_optional_element(&self, key: &str) -> Result<Option<ElementId>> {
        if self.data.contains_key(key) {
            self.get_element(key).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Optional index
    ///
    /// # Errors
    ///
    /// Returns `InvalidActionData` for malformed values.
    pub fn get_optional_usize(&self, key: &str) -> Result<Option<usize>> {
        if self.data.contains_key(key) {
            self.get_usize(key).map(Some)
        } else {
            Ok(None)
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidActionData` if the key is missing or an entry is
    /// malformed.
    pub fn get_usize_list(&self, key: &str) -> Result<Vec<usize>> {
        let text = self.get_string(key)?;
        if text.is_empty() {
            return Ok(Vec::new());
        }
        text.split(',')
            .map(|part| {
                part.trim()
                    .parse()
                    .map_err(|_| self.invalid(key, format!("has malformed entry '{}'", part)))
            })
            .collect()
    }

    /// # Errors
    ///
    /// Returns `InvalidActionData` if the key is missing or an entry is
    /// malformed or unknown to the model.
    pub fn get_relation_list(&self, key: &str) -> Result<Vec<RelationId>> {
        let text = self.get_string(key)?;
        if text.is_empty() {
            return Ok(Vec::new());
        }
        text.split(',')
            .map(|part| {
                let id: RelationId = part
                    .parse()
                    .map_err(|_| self.invalid(key, format!("has malformed entry '{}'", part)))?;
                if !self.model.relations().knows(id) {
                    return Err(self.invalid(key, format!("refers to unknown relation {}", id)));
                }
                Ok(id)
            })
            .collect()
    }

    /// # Errors
    ///
    /// Returns `InvalidActionData` if the key is missing or not RFC 3339.
    pub fn get_timestamp(&self, key: &str) -> Result<DateTime<Utc>> {
        let text = self.get_string(key)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| self.invalid(key, format!("is not a timestamp: {}", e)))
    }
}
