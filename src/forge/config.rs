//! Configuration for the forge connection.
use secrecy::SecretString;

/// Remote repository connection configuration for authenticating and
/// interacting with the forge.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Remote forge host (e.g., "gitlab.com").
    pub host: String,
    /// Remote forge port for self-hosted instances.
    pub port: Option<u16>,
    /// URL scheme (http or https).
    pub scheme: String,
    /// Full project path, used as the project id in API calls.
    pub path: String,
    /// Access token for authentication.
    pub token: SecretString,
}

impl RemoteConfig {
    /// Host including the port when one is configured.
    pub fn host_with_port(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "".to_string(),
            port: None,
            scheme: "".to_string(),
            path: "".to_string(),
            token: SecretString::from("".to_string()),
        }
    }
}
