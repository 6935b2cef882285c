use serde_json::Value;

use crate::config::RemoteSettings;

use super::{FirebaseRemoteConfig, RemoteConfig, SimulatedRemoteConfig};

/// Builds the remote provider named in the settings.
///
/// Returns `None` for the "none" provider. A Firebase provider is returned
/// even with placeholder credentials; it reports itself as unconfigured and
/// the flag store skips it.
pub fn from_settings(settings: &RemoteSettings) -> Option<Box<dyn RemoteConfig>> {
    match settings.provider.as_str() {
        "firebase" => Some(Box::new(FirebaseRemoteConfig::new(settings.clone()))),
        "static" => Some(Box::new(SimulatedRemoteConfig::with_values(
            settings
                .values
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone()))),
        ))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_provider() {
        assert!(from_settings(&RemoteSettings::default()).is_none());
    }

    #[test]
    fn test_firebase_with_placeholders() {
        let settings = RemoteSettings {
            provider: "firebase".to_string(),
            api_key: "TU_API_KEY".to_string(),
            ..RemoteSettings::default()
        };
        let provider = from_settings(&settings).unwrap();
        assert!(!provider.is_configured());
    }

    #[test]
    fn test_static_provider_is_configured() {
        let settings = RemoteSettings {
            provider: "static".to_string(),
            ..RemoteSettings::default()
        };
        assert!(from_settings(&settings).unwrap().is_configured());
    }
}
