//! Connection settings for the search backend.

use std::fmt;

/// Default port for hosted search clusters reached by hostname.
const DEFAULT_HTTPS_PORT: u16 = 443;

/// Username and password for HTTP basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl BasicAuth {
    /// Create new basic auth credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where the search backend lives and how to authenticate against it.
///
/// Loaded once at startup and handed to the client constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCredentials {
    /// Base URL of the cluster.
    pub url: String,
    /// Optional basic authentication.
    pub basic_auth: Option<BasicAuth>,
}

impl SearchCredentials {
    /// Credentials for a hosted cluster reached over HTTPS on port 443.
    pub fn from_hostname(hostname: &str) -> Self {
        Self::from_url(format!("https://{}:{}", hostname, DEFAULT_HTTPS_PORT))
    }

    /// Credentials for an explicit cluster URL (e.g. `http://localhost:9200`).
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            basic_auth: None,
        }
    }

    /// Attach basic authentication.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some(BasicAuth::new(username, password));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hostname_uses_https() {
        let creds = SearchCredentials::from_hostname("cluster.example.com");
        assert_eq!(creds.url, "https://cluster.example.com:443");
        assert!(creds.basic_auth.is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = SearchCredentials::from_url("http://localhost:9200").with_basic_auth("elastic", "s3cret");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("elastic"));
        assert!(!rendered.contains("s3cret"));
    }
}
