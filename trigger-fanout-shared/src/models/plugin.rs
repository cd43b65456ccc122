use serde::{Deserialize, Serialize};

/// How the fan-out coordinator authenticates to a plugin before dispatching
/// a trigger update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginAuthType {
    BasicAuth,
    XAuthToken,
}

impl PluginAuthType {
    /// Mirrors the original's case-insensitive `strings.EqualFold` compare
    /// against the plugin record's `PreferredAuthType` string.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("xauthtoken") {
            PluginAuthType::XAuthToken
        } else {
            PluginAuthType::BasicAuth
        }
    }
}

/// A registered plugin endpoint. `password` is never logged and is excluded
/// from the `Debug` impl below.
#[derive(Clone, Serialize, Deserialize)]
pub struct Plugin {
    pub id: String,
    pub address: String,
    pub port: u16,
    pub username: String,
    pub password: Vec<u8>,
    pub preferred_auth_type: PluginAuthType,
    pub plugin_type: String,
}

impl Plugin {
    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.address, self.port)
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("id", &self.id)
            .field("address", &self.address)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("preferred_auth_type", &self.preferred_auth_type)
            .field("plugin_type", &self.plugin_type)
            .finish()
    }
}
