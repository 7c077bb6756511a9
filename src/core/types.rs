//! Role and permission records
//!
//! Role codes and actions are single bytes. At the API boundary they are
//! `Copy` newtypes so that equality stays byte-exact; in storage they are a
//! one-character TEXT column whose scalar value equals the byte.

use crate::core::executor::Row;
use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Encode a byte as its one-character storage form (Latin-1 mapping)
pub(crate) fn byte_to_text(byte: u8) -> String {
    char::from(byte).to_string()
}

/// Decode a one-character storage value back into its byte
pub(crate) fn text_to_byte(text: &str) -> Result<u8, String> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if (c as u32) <= 0xFF => Ok(c as u8),
        _ => Err(format!("expected a single character, got {:?}", text)),
    }
}

fn decode_byte(row: &Row, column: usize) -> Result<u8, StorageError> {
    text_to_byte(row.text(column)?).map_err(|reason| StorageError::Decode { column, reason })
}

/// Business key of a role (e.g. `b'a'` for admin)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleCode(u8);

impl RoleCode {
    pub const fn new(byte: u8) -> Self {
        RoleCode(byte)
    }

    pub const fn as_byte(self) -> u8 {
        self.0
    }
}

impl From<u8> for RoleCode {
    fn from(byte: u8) -> Self {
        RoleCode(byte)
    }
}

impl TryFrom<String> for RoleCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        text_to_byte(&value).map(RoleCode)
    }
}

impl From<RoleCode> for String {
    fn from(code: RoleCode) -> Self {
        byte_to_text(code.0)
    }
}

impl fmt::Display for RoleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(self.0))
    }
}

/// Verb of a permission
///
/// The four CRUD verbs are the canonical actions walked by
/// [`Store::register`](crate::Store::register). Any other byte is a valid
/// custom action for explicitly created permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Action(u8);

impl Action {
    pub const CREATE: Action = Action(b'c');
    pub const READ: Action = Action(b'r');
    pub const UPDATE: Action = Action(b'u');
    pub const DELETE: Action = Action(b'd');

    /// Canonical actions in registration order
    pub const CRUD: [Action; 4] = [Action::CREATE, Action::READ, Action::UPDATE, Action::DELETE];

    pub const fn new(byte: u8) -> Self {
        Action(byte)
    }

    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// True for create/read/update/delete
    pub fn is_canonical(self) -> bool {
        Action::CRUD.contains(&self)
    }
}

impl From<u8> for Action {
    fn from(byte: u8) -> Self {
        Action(byte)
    }
}

impl TryFrom<String> for Action {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        text_to_byte(&value).map(Action)
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        byte_to_text(action.0)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(self.0))
    }
}

/// A named, coded bundle of permissions assignable to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Immutable identifier
    pub id: String,
    /// Unique business key
    pub code: RoleCode,
    pub name: String,
    pub description: String,
}

impl Role {
    /// Decode a `(id, code, name, description)` row
    pub fn from_row(row: &Row) -> Result<Self, StorageError> {
        Ok(Role {
            id: row.text(0)?.to_string(),
            code: RoleCode(decode_byte(row, 1)?),
            name: row.text(2)?.to_string(),
            description: row.text(3)?.to_string(),
        })
    }
}

/// Atomic (resource, action) authorization unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    /// Descriptive only
    pub name: String,
    pub resource: String,
    pub action: Action,
}

impl Permission {
    /// Decode a `(id, name, resource, action)` row
    pub fn from_row(row: &Row) -> Result<Self, StorageError> {
        Ok(Permission {
            id: row.text(0)?.to_string(),
            name: row.text(1)?.to_string(),
            resource: row.text(2)?.to_string(),
            action: Action(decode_byte(row, 3)?),
        })
    }

    pub fn matches(&self, resource: &str, action: Action) -> bool {
        self.action == action && self.resource == resource
    }
}

/// Decode a two-column `(String, String)` edge row
pub(crate) fn edge_from_row(row: &Row) -> Result<(String, String), StorageError> {
    Ok((row.text(0)?.to_string(), row.text(1)?.to_string()))
}
