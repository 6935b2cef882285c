use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::config::{RemoteSettings, DEFAULT_FIREBASE_URL};

use super::{RemoteConfig, RemoteConfigError};

/// Firebase Remote Config client using the REST fetch endpoint.
///
/// Each instance identifies itself with a random app instance id, like an
/// installed app would.
pub struct FirebaseRemoteConfig {
    settings: RemoteSettings,
    base_url: String,
    app_instance_id: String,
    active: BTreeMap<String, Value>,
    client: Client,
}

impl FirebaseRemoteConfig {
    /// Creates a client from the remote settings.
    pub fn new(settings: RemoteSettings) -> Self {
        let base_url = settings
            .base_url_or_default()
            .trim_end_matches('/')
            .to_string();
        Self {
            settings,
            base_url,
            app_instance_id: Uuid::new_v4().to_string(),
            active: BTreeMap::new(),
            client: Client::new(),
        }
    }

    /// Creates a client for the public Firebase endpoint.
    pub fn firebase(
        api_key: impl Into<String>,
        project_id: impl Into<String>,
        app_id: impl Into<String>,
    ) -> Self {
        Self::new(RemoteSettings {
            provider: "firebase".to_string(),
            api_key: api_key.into(),
            project_id: project_id.into(),
            app_id: app_id.into(),
            base_url: Some(DEFAULT_FIREBASE_URL.to_string()),
            ..RemoteSettings::default()
        })
    }

    fn fetch_url(&self) -> String {
        format!(
            "{}/projects/{}/namespaces/firebase:fetch?key={}",
            self.base_url, self.settings.project_id, self.settings.api_key
        )
    }

    async fn send_request(&self) -> Result<FetchResponse, RemoteConfigError> {
        if !self.is_configured() {
            return Err(RemoteConfigError::NotConfigured(
                "api_key, project_id and app_id must be set".to_string(),
            ));
        }

        let request = FetchRequest {
            app_id: self.settings.app_id.clone(),
            app_instance_id: self.app_instance_id.clone(),
        };

        let response = self
            .client
            .post(self.fetch_url())
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if status == 429 {
            return Err(RemoteConfigError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RemoteConfigError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body = response.text().await?;
        parse_fetch_response(&body)
    }
}

#[async_trait]
impl RemoteConfig for FirebaseRemoteConfig {
    async fn fetch_and_activate(&mut self) -> Result<bool, RemoteConfigError> {
        let response = self.send_request().await?;
        Ok(activate(&mut self.active, response))
    }

    fn get_value(&self, key: &str) -> Option<Value> {
        self.active.get(key).cloned()
    }

    fn is_configured(&self) -> bool {
        self.settings.credentials_configured()
    }
}

/// Replaces `active` with the fetched entries. Returns true if anything
/// changed.
fn activate(active: &mut BTreeMap<String, Value>, response: FetchResponse) -> bool {
    let fetched: BTreeMap<String, Value> = match response.state {
        FetchState::NoChange => return false,
        FetchState::Update => response
            .entries
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect(),
        FetchState::NoTemplate | FetchState::EmptyConfig => BTreeMap::new(),
    };

    if *active == fetched {
        return false;
    }
    *active = fetched;
    true
}

/// Parses the body of a fetch response.
fn parse_fetch_response(body: &str) -> Result<FetchResponse, RemoteConfigError> {
    serde_json::from_str(body).map_err(|e| RemoteConfigError::ParseError(e.to_string()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchRequest {
    app_id: String,
    app_instance_id: String,
}

#[derive(Debug, Deserialize)]
struct FetchResponse {
    #[serde(default)]
    entries: BTreeMap<String, String>,
    #[serde(default)]
    state: FetchState,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum FetchState {
    #[default]
    Update,
    NoChange,
    NoTemplate,
    EmptyConfig,
}
