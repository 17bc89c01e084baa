//! Bearer credential extraction.
//!
//! # Responsibilities
//! - Read a bearer token from `Authorization: Bearer <token>`
//! - Fall back to the session cookie, or use a single source if the route pins one
//! - Fail fast with `AuthMissing` when no non-empty token is found
//!
//! # Design Decisions
//! - Presence check only; authenticity is the upstream's job
//! - The token is read once per request and threaded explicitly afterwards

use axum::http::{header, HeaderMap};

use crate::config::{CredentialConfig, CredentialSource};
use crate::gateway::error::GatewayError;

/// Opaque bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Pulls credentials out of inbound headers.
#[derive(Debug, Clone)]
pub struct CredentialExtractor {
    cookie_name: String,
}

impl CredentialExtractor {
    pub fn new(config: &CredentialConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
        }
    }

    /// Extract a token from the sources allowed by `source`.
    pub fn extract(
        &self,
        headers: &HeaderMap,
        source: CredentialSource,
    ) -> Result<Credential, GatewayError> {
        let token = match source {
            CredentialSource::Header => bearer_token(headers),
            CredentialSource::Cookie => cookie_value(headers, &self.cookie_name),
            CredentialSource::Any => {
                bearer_token(headers).or_else(|| cookie_value(headers, &self.cookie_name))
            }
        };

        token.map(Credential::new).ok_or(GatewayError::AuthMissing)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::AUTHORIZATION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|value| {
            let (scheme, token) = value.trim().split_once(|c: char| c.is_ascii_whitespace())?;
            let token = token.trim();
            (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
        })
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|line| line.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            if key.trim() != name {
                return None;
            }
            let value = value.trim().trim_matches('"');
            (!value.is_empty()).then_some(value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn extractor() -> CredentialExtractor {
        CredentialExtractor::new(&CredentialConfig::default())
    }

    fn headers(pairs: &[(header::HeaderName, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn test_bearer_header() {
        let h = headers(&[(header::AUTHORIZATION, "Bearer abc.def.ghi")]);
        let cred = extractor().extract(&h, CredentialSource::Any).unwrap();
        assert_eq!(cred.as_str(), "abc.def.ghi");

        let h = headers(&[(header::AUTHORIZATION, "bearer   lower")]);
        let cred = extractor().extract(&h, CredentialSource::Header).unwrap();
        assert_eq!(cred.as_str(), "lower");
    }

    #[test]
    fn test_tab_separated_scheme() {
        let h = headers(&[(header::AUTHORIZATION, "Bearer\tabc")]);
        let cred = extractor().extract(&h, CredentialSource::Header).unwrap();
        assert_eq!(cred.as_str(), "abc");

        let h = headers(&[(header::AUTHORIZATION, "Bearer \t tabbed")]);
        let cred = extractor().extract(&h, CredentialSource::Header).unwrap();
        assert_eq!(cred.as_str(), "tabbed");
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let h = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "token=from-cookie"),
        ]);
        let cred = extractor().extract(&h, CredentialSource::Any).unwrap();
        assert_eq!(cred.as_str(), "from-header");
    }

    #[test]
    fn test_cookie_fallback() {
        let h = headers(&[
            (header::AUTHORIZATION, "Basic dXNlcjpwYXNz"),
            (header::COOKIE, "theme=dark; token=\"cookie-token\"; lang=en"),
        ]);
        let cred = extractor().extract(&h, CredentialSource::Any).unwrap();
        assert_eq!(cred.as_str(), "cookie-token");
    }

    #[test]
    fn test_pinned_source_ignores_the_other() {
        let h = headers(&[(header::COOKIE, "token=cookie-only")]);
        assert!(matches!(
            extractor().extract(&h, CredentialSource::Header),
            Err(GatewayError::AuthMissing)
        ));

        let h = headers(&[(header::AUTHORIZATION, "Bearer header-only")]);
        assert!(matches!(
            extractor().extract(&h, CredentialSource::Cookie),
            Err(GatewayError::AuthMissing)
        ));
    }

    #[test]
    fn test_empty_tokens_are_missing() {
        let h = headers(&[
            (header::AUTHORIZATION, "Bearer    "),
            (header::COOKIE, "token=; tokenx=abc"),
        ]);
        assert!(matches!(
            extractor().extract(&h, CredentialSource::Any),
            Err(GatewayError::AuthMissing)
        ));
        assert!(matches!(
            extractor().extract(&HeaderMap::new(), CredentialSource::Any),
            Err(GatewayError::AuthMissing)
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let cred = Credential::new("super-secret");
        assert_eq!(format!("{:?}", cred), "Credential(***)");
    }
}
