//! Wire types for the Ambu-Life API.
//!
//! The server wraps every response in a `{ success, data, message }` envelope
//! and serves Mongo-style documents (`_id`, camelCase fields). References that
//! the server may return either as a bare id or as a populated document are
//! decoded once here into [`CityRef`]; nothing downstream re-derives the shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of an authenticated user, drives screen routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Assistant,
    Mechanic,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Assistant => "assistant",
            Self::Mechanic => "mechanic",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A city document as served by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct City {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
}

/// A city field that the server returns either as a bare id string or as a
/// populated document, depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CityRef {
    Expanded(City),
    Id(String),
}

impl CityRef {
    /// The city id, regardless of which shape the server sent.
    pub fn id(&self) -> &str {
        match self {
            Self::Expanded(city) => &city.id,
            Self::Id(id) => id,
        }
    }

    /// The populated document, if the server expanded the reference.
    pub fn expanded(&self) -> Option<&City> {
        match self {
            Self::Expanded(city) => Some(city),
            Self::Id(_) => None,
        }
    }
}

impl std::fmt::Display for CityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expanded(city) => write!(f, "{}", city.name),
            Self::Id(id) => write!(f, "#{}", id),
        }
    }
}

/// The current-user record held in the session.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub city: Option<CityRef>,
    #[serde(
        default,
        rename = "activeVehicle",
        skip_serializing_if = "Option::is_none"
    )]
    pub active_vehicle: Option<String>,
    #[serde(default, rename = "isWorking")]
    pub is_working: bool,
    #[serde(
        default,
        rename = "workStartTime",
        skip_serializing_if = "Option::is_none"
    )]
    pub work_started_at: Option<DateTime<Utc>>,
}

impl User {
    /// Apply a partial update; only fields present in the patch overwrite.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(city) = &patch.city {
            self.city = Some(city.clone());
        }
        if let Some(vehicle) = &patch.active_vehicle {
            self.active_vehicle = vehicle.clone();
        }
        if let Some(working) = patch.is_working {
            self.is_working = working;
        }
        if let Some(started) = &patch.work_started_at {
            self.work_started_at = *started;
        }
    }
}

/// A field-wise patch for optimistic local updates. `None` means "leave the
/// field alone"; the inner `Option` on clearable fields means "set to absent".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub city: Option<CityRef>,
    pub active_vehicle: Option<Option<String>>,
    pub is_working: Option<bool>,
    pub work_started_at: Option<Option<DateTime<Utc>>>,
}

/// Payload of a successful login. Besides the token the server includes a
/// subset of the user's session fields; the full profile comes from a
/// follow-up current-user fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    pub token: String,
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub city: Option<CityRef>,
}

impl LoginPayload {
    /// Build the provisional session user from the login payload.
    pub fn session_user(&self) -> User {
        User {
            id: self.id.clone().unwrap_or_default(),
            name: self.name.clone().unwrap_or_default(),
            role: self.role,
            city: self.city.clone(),
            active_vehicle: None,
            is_working: false,
            work_started_at: None,
        }
    }
}

/// The uniform response envelope used by every endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}
