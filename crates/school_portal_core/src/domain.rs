//! crates/school_portal_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any HTTP framework or vendor SDK.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The role a session was issued for. Each role has its own cookie and signing secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Teacher,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Owner, Role::Admin, Role::Teacher];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Teacher => "teacher",
        }
    }

    /// Name of the cookie that carries this role's session token.
    pub fn cookie_name(&self) -> &'static str {
        match self {
            Role::Owner => "owner_token",
            Role::Admin => "admin_token",
            Role::Teacher => "teacher_token",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// What a session-validation call reports about the current viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub role: Role,
    pub email: String,
}

/// A user the identity provider has just re-authenticated.
/// `id_token` is the provider's short-lived proof of that sign-in.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub uid: String,
    pub email: String,
    pub id_token: String,
}

impl fmt::Debug for AuthenticatedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedUser")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// An equality predicate over one externally-owned collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LiveQuery {
    pub collection: String,
    pub field: String,
    pub equals: String,
}

impl LiveQuery {
    pub fn new(
        collection: impl Into<String>,
        field: impl Into<String>,
        equals: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            field: field.into(),
            equals: equals.into(),
        }
    }

    /// Departments headed by `email`.
    pub fn departments_headed_by(email: &str) -> Self {
        Self::new("departments", "hod", email)
    }

    /// Grades advised by `email`.
    pub fn grades_advised_by(email: &str) -> Self {
        Self::new("grades", "advisorEmail", email)
    }

    /// Whether a record satisfies this predicate.
    pub fn matches(&self, record: &Record) -> bool {
        record.str_field(&self.field) == Some(self.equals.as_str())
    }
}

/// A single document from a live collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub id: String,
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }
}

/// The full result set of a live query at one point in time.
pub type Snapshot = Vec<Record>;
