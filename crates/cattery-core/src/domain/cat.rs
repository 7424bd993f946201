use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;

/// Cat entity - one row of the `cats` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cat {
    pub id: i32,
    pub name: String,
    pub tag: Option<String>,
    pub pfp: Option<String>,
}

/// A validated cat, ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCat {
    pub name: String,
    pub tag: Option<String>,
    pub pfp: Option<String>,
}

/// Raw create input as it arrives from a request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatDraft {
    pub name: Option<String>,
    pub tag: Option<String>,
    pub pfp: Option<String>,
}

impl CatDraft {
    /// Validate the draft. `require_tag` turns a missing tag into an error.
    pub fn validate(self, require_tag: bool) -> Result<NewCat, DomainError> {
        let name = non_blank(self.name).ok_or_else(|| DomainError::validation("Name is required"))?;
        let tag = non_blank(self.tag);
        if require_tag && tag.is_none() {
            return Err(DomainError::validation("Tag is required"));
        }

        Ok(NewCat {
            name,
            tag,
            pfp: non_blank(self.pfp),
        })
    }
}

/// Columns a partial update may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CatField {
    Name,
    Tag,
    Pfp,
}

impl CatField {
    pub const ALL: [CatField; 3] = [CatField::Name, CatField::Tag, CatField::Pfp];

    /// Request key (and column name) for this field.
    pub fn as_str(self) -> &'static str {
        match self {
            CatField::Name => "name",
            CatField::Tag => "tag",
            CatField::Pfp => "pfp",
        }
    }

    /// Look up a request key in the whitelist.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == key)
    }

    pub fn nullable(self) -> bool {
        !matches!(self, CatField::Name)
    }
}

/// A whitelisted set of column changes for one cat.
///
/// Built only through [`CatPatch::from_fields`] or [`CatPatch::set`], so every
/// entry names a known column and `name` is never cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatPatch {
    changes: Vec<(CatField, Option<String>)>,
}

impl CatPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter an arbitrary request object down to the whitelisted fields.
    ///
    /// Unknown keys are dropped. Fails when the object is empty, when nothing
    /// survives the filter, or when a surviving value has the wrong shape.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, DomainError> {
        if fields.is_empty() {
            return Err(DomainError::validation("No fields provided for update."));
        }

        let mut patch = Self::new();
        for (key, value) in fields {
            let Some(field) = CatField::from_key(key) else {
                tracing::debug!(field = %key, "Ignoring non-updatable cat field");
                continue;
            };

            let value = match value {
                Value::String(s) => non_blank(Some(s.clone())),
                Value::Null => None,
                _ => {
                    return Err(DomainError::validation(format!(
                        "Field '{}' must be a string",
                        key
                    )));
                }
            };
            patch = patch.set(field, value)?;
        }

        if patch.is_empty() {
            return Err(DomainError::validation("No valid fields provided for update."));
        }

        Ok(patch)
    }

    /// Add or replace a single change.
    pub fn set(mut self, field: CatField, value: Option<String>) -> Result<Self, DomainError> {
        if value.is_none() && !field.nullable() {
            return Err(DomainError::validation("Name must be a non-empty string"));
        }

        self.changes.retain(|(existing, _)| *existing != field);
        self.changes.push((field, value));
        Ok(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CatField, Option<&str>)> {
        self.changes
            .iter()
            .map(|(field, value)| (*field, value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Apply the changes to an in-memory copy of a cat.
    pub fn apply(&self, cat: &mut Cat) {
        for (field, value) in self.iter() {
            let value = value.map(str::to_string);
            match field {
                CatField::Name => {
                    if let Some(name) = value {
                        cat.name = name;
                    }
                }
                CatField::Tag => cat.tag = value,
                CatField::Pfp => cat.pfp = value,
            }
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
