use serde::Deserialize;

use crate::pixel::error::{invalid_argument, PixelResult};

/// Options used by [`PixelTracker::from_options`](crate::pixel::PixelTracker::from_options) to
/// pick a sink. Every field is optional so a partially filled JSON document is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelOptions {
    #[serde(default)]
    pub pixel_id: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub test_event_code: Option<String>,
    #[serde(default)]
    pub action_source: Option<String>,
    #[serde(default)]
    pub event_source_url: Option<String>,
    #[serde(default)]
    pub client_user_agent: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for PixelOptions {
    fn default() -> Self {
        Self {
            pixel_id: None,
            access_token: None,
            api_version: None,
            test_event_code: None,
            action_source: None,
            event_source_url: None,
            client_user_agent: None,
            enabled: default_enabled(),
        }
    }
}

impl PixelOptions {
    pub fn from_json_str(raw: &str) -> PixelResult<Self> {
        serde_json::from_str(raw)
            .map_err(|err| invalid_argument(format!("invalid pixel options: {err}")))
    }

    /// Builds a Conversions API configuration when both the pixel id and access token are set.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn conversions_api_config(&self) -> Option<crate::pixel::ConversionsApiConfig> {
        let pixel_id = non_blank(self.pixel_id.as_deref())?;
        let access_token = non_blank(self.access_token.as_deref())?;
        let mut config = crate::pixel::ConversionsApiConfig::new(pixel_id, access_token);
        if let Some(version) = non_blank(self.api_version.as_deref()) {
            config = config.with_api_version(version);
        }
        if let Some(source) = non_blank(self.action_source.as_deref()) {
            config = config.with_action_source(source);
        }
        if let Some(code) = non_blank(self.test_event_code.as_deref()) {
            config = config.with_test_event_code(code);
        }
        if let Some(url) = non_blank(self.event_source_url.as_deref()) {
            config = config.with_event_source_url(url);
        }
        if let Some(agent) = non_blank(self.client_user_agent.as_deref()) {
            config = config.with_user_data(crate::pixel::ConversionsUserData {
                client_user_agent: Some(agent.to_string()),
                ..Default::default()
            });
        }
        Some(config)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
