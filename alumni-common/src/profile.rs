//! The profile document stored for every account.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Collection holding one profile document per account, keyed by account id.
pub const PROFILE_COLLECTION: &str = "usuarios";

/// Profile document as read back from the store.
///
/// Every attribute is optional so a partially populated document still
/// renders instead of failing the fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "tituloUniversitario", default)]
    pub academic_title: Option<String>,
    #[serde(rename = "anoGraduacion", default)]
    pub graduation_year: Option<i64>,
    /// ISO-8601, set once at registration.
    #[serde(rename = "fechaRegistro", default)]
    pub registered_at: Option<String>,
    /// ISO-8601, rewritten by every edit.
    #[serde(rename = "fechaActualizacion", default)]
    pub updated_at: Option<String>,
}

/// Document written once when the account is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProfile {
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
    #[serde(rename = "tituloUniversitario")]
    pub academic_title: String,
    #[serde(rename = "anoGraduacion")]
    pub graduation_year: i32,
    #[serde(rename = "fechaRegistro")]
    pub registered_at: String,
}

/// Partial update issued by the edit flow.
///
/// Deliberately has no email or registration timestamp: the edit path can
/// never rewrite them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tituloUniversitario")]
    pub academic_title: String,
    #[serde(rename = "anoGraduacion")]
    pub graduation_year: i32,
    #[serde(rename = "fechaActualizacion")]
    pub updated_at: String,
}

impl ProfileUpdate {
    /// Stored field names this update touches, in a stable order.
    pub const FIELDS: [&'static str; 4] = [
        "nombre",
        "tituloUniversitario",
        "anoGraduacion",
        "fechaActualizacion",
    ];
}

/// Current UTC time as an ISO-8601 string with millisecond precision,
/// e.g. `2024-05-01T12:30:00.000Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
