//! Backend API Models
//! Request and response bodies exchanged with the analysis service.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Login / registration form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Credentials {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub age: Option<u32>,
    #[serde(deserialize_with = "null_as_empty")]
    pub gender: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub skin_type: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub concerns: String,
}

/// Result of `POST /api/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: f64,
    pub moisture: f64,
    pub oil: f64,
    pub sensitivity: f64,
    #[serde(default)]
    pub elasticity: Option<f64>,
    #[serde(default)]
    pub brightness: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recommendations: String,
}

/// One entry of `GET /api/history`. The service lists newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    #[serde(alias = "created_at")]
    pub date: String,
    pub score: f64,
    pub moisture: f64,
    pub oil: f64,
    pub sensitivity: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recommendations: String,
}

impl HistoryRecord {
    /// Parse the record date. The service emits RFC 2822 (`Tue, 14 May 2024 08:30:00 GMT`)
    /// but ISO timestamps are accepted too.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc2822(&self.date) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.date) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.date, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Records sorted oldest first, by timestamp and then id.
    /// Records with unparseable dates sort before all others.
    pub fn chronological(records: &[HistoryRecord]) -> Vec<&HistoryRecord> {
        let mut ordered: Vec<&HistoryRecord> = records.iter().collect();
        ordered.sort_by_key(|r| (r.timestamp(), r.id));
        ordered
    }

    /// Short label used on chart axes and in the history table.
    pub fn date_label(&self) -> String {
        self.timestamp()
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| self.date.clone())
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
