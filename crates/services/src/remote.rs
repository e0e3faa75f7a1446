use std::collections::HashMap;
use std::env;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use quiz_core::model::{CategoryId, EntryId, EntryOrigin, LeaderboardEntry};

use crate::error::RemoteError;

const AVATAR_PLACEHOLDER: &str = "/placeholder-user.jpg";

/// Contract with the shared remote score store.
///
/// The store is an opaque key-value HTTP service; this trait is the seam so
/// tests can script responses without a network.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch all remote entries. A `null` or empty response is zero entries.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` when the request fails or the service answers
    /// with a non-success status.
    async fn fetch(&self) -> Result<Vec<LeaderboardEntry>, RemoteError>;

    /// Append one entry to the shared store.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` when the request fails or the service answers
    /// with a non-success status.
    async fn push(&self, entry: &LeaderboardEntry, device_id: &str) -> Result<(), RemoteError>;
}

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub endpoint: String,
}

impl RemoteConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let endpoint = env::var("PUJO_QUIZ_REMOTE_URL").ok()?;
        if endpoint.trim().is_empty() {
            return None;
        }
        Some(Self { endpoint })
    }
}

/// `reqwest`-backed [`RemoteStore`].
///
/// Without a configured endpoint the client is disabled: fetch yields zero
/// entries and push is skipped, so a build with no shared store behaves like
/// a device that is simply alone on the leaderboard.
#[derive(Clone)]
pub struct HttpRemoteStore {
    client: Client,
    config: Option<RemoteConfig>,
}

impl HttpRemoteStore {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(RemoteConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<RemoteConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch(&self) -> Result<Vec<LeaderboardEntry>, RemoteError> {
        let Some(config) = self.config.as_ref() else {
            return Ok(Vec::new());
        };

        let response = self.client.get(&config.endpoint).send().await?;
        if !response.status().is_success() {
            return Err(RemoteError::HttpStatus(response.status()));
        }

        // The store answers with an arbitrarily-keyed object, or `null` when
        // nothing has ever been pushed.
        let body: Option<HashMap<String, Value>> = response.json().await?;
        let Some(records) = body else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::with_capacity(records.len());
        for (key, value) in records {
            match parse_record(&value) {
                Some(entry) => entries.push(entry),
                None => debug!("dropping malformed remote record {key}"),
            }
        }
        Ok(entries)
    }

    async fn push(&self, entry: &LeaderboardEntry, device_id: &str) -> Result<(), RemoteError> {
        let Some(config) = self.config.as_ref() else {
            return Ok(());
        };

        let payload = PushPayload {
            name: entry.name(),
            score: entry.score(),
            avatar: entry.avatar_ref(),
            date: entry.date(),
            timestamp: entry.timestamp().timestamp_millis(),
            device_id,
        };

        let response = self
            .client
            .post(&config.endpoint)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RemoteError::HttpStatus(response.status()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct PushPayload<'a> {
    name: &'a str,
    score: u8,
    avatar: &'a str,
    date: &'a str,
    timestamp: i64,
    #[serde(rename = "deviceId")]
    device_id: &'a str,
}

/// Sanitize one remote record. Missing/empty `name` or a non-numeric `score`
/// drops the record; everything else gets a lenient default.
fn parse_record(value: &Value) -> Option<LeaderboardEntry> {
    let name = value.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }
    let score = value.get("score")?.as_f64()?;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = score.round().clamp(0.0, 100.0) as u8;

    let avatar = value
        .get("avatar")
        .and_then(Value::as_str)
        .unwrap_or(AVATAR_PLACEHOLDER);
    let date = value.get("date").and_then(Value::as_str).unwrap_or("");
    let timestamp = value
        .get("timestamp")
        .and_then(Value::as_i64)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or(DateTime::UNIX_EPOCH);
    let category = value
        .get("category")
        .and_then(Value::as_str)
        .and_then(|c| CategoryId::new(c).ok());

    LeaderboardEntry::new(
        EntryId::generate(),
        name,
        score,
        avatar,
        date,
        timestamp,
        category,
        EntryOrigin::Remote,
    )
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_well_formed_record() {
        let entry = parse_record(&json!({
            "name": "Priya Das",
            "score": 95,
            "avatar": "https://example.com/priya.jpg",
            "date": "June 11, 2025",
            "timestamp": 1_700_000_000_000_i64,
            "category": "durga-trivia"
        }))
        .unwrap();

        assert_eq!(entry.name(), "Priya Das");
        assert_eq!(entry.score(), 95);
        assert_eq!(entry.origin(), EntryOrigin::Remote);
        assert_eq!(entry.category().unwrap().as_str(), "durga-trivia");
    }

    #[test]
    fn drops_record_without_name() {
        assert!(parse_record(&json!({ "score": 80 })).is_none());
        assert!(parse_record(&json!({ "name": "  ", "score": 80 })).is_none());
    }

    #[test]
    fn drops_record_with_non_numeric_score() {
        assert!(parse_record(&json!({ "name": "Arjun Sen", "score": "eighty" })).is_none());
        assert!(parse_record(&json!({ "name": "Arjun Sen" })).is_none());
    }

    #[test]
    fn clamps_out_of_range_scores() {
        let entry = parse_record(&json!({ "name": "Meera Roy", "score": 140.2 })).unwrap();
        assert_eq!(entry.score(), 100);
        let entry = parse_record(&json!({ "name": "Meera Roy", "score": -3 })).unwrap();
        assert_eq!(entry.score(), 0);
    }

    #[test]
    fn missing_optional_fields_get_defaults() {
        let entry = parse_record(&json!({ "name": "Dev Kumar", "score": 75 })).unwrap();
        assert_eq!(entry.avatar_ref(), AVATAR_PLACEHOLDER);
        assert_eq!(entry.timestamp(), DateTime::UNIX_EPOCH);
        assert!(entry.category().is_none());
    }
}
