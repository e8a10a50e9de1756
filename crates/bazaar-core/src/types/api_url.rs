//! Storefront API base URL.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{Error, InvalidInputError};

/// Base URL every endpoint path is joined onto.
///
/// Plain HTTP is accepted only for loopback hosts, so local test servers work
/// while real deployments stay on TLS. Any base path is kept; query and
/// fragment are dropped.
///
/// ```
/// use bazaar_core::ApiUrl;
///
/// let api = ApiUrl::new("https://api.bazaar.example/v1/").unwrap();
/// assert_eq!(api.endpoint("/auth/refresh"),
///            "https://api.bazaar.example/v1/auth/refresh");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

const LOOPBACK_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "[::1]"];

impl ApiUrl {
    /// Parse and normalize a base URL.
    ///
    /// # Errors
    ///
    /// [`InvalidInputError::ApiUrl`] if the string does not parse, has no
    /// host, or uses a scheme other than HTTPS on a non-loopback host.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let raw = s.as_ref();
        let invalid = |reason: String| InvalidInputError::ApiUrl {
            value: raw.to_string(),
            reason,
        };

        let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        let Some(host) = url.host_str() else {
            return Err(invalid("must have a host".into()).into());
        };
        let plain_http_ok = LOOPBACK_HOSTS.contains(&host);
        match url.scheme() {
            "https" => {}
            "http" if plain_http_ok => {}
            other => {
                return Err(invalid(format!(
                    "scheme '{}' not allowed, use https (http only for localhost)",
                    other
                ))
                .into());
            }
        }

        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&base_path);
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self(url))
    }

    /// Full URL for an API path such as `/products/filter`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.0.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
