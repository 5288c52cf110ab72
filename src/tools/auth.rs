//! Credential injection - authentication scheme to transport headers.
//!
//! Missing credentials are never an error: the header is simply omitted and
//! the call proceeds unauthenticated, surfacing any rejection later as an
//! HTTP error.

use base64::Engine;
use std::collections::BTreeMap;

use super::definition::Authentication;

/// Header used for `api_key` auth when the tool does not name one.
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";

/// Build the headers an authentication scheme contributes.
pub fn build_auth_headers(auth: &Authentication) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    match auth {
        Authentication::None => {}
        Authentication::Bearer { token } => {
            if !token.is_empty() {
                headers.insert("Authorization".to_string(), format!("Bearer {}", token));
            }
        }
        Authentication::ApiKey { key, header_name } => {
            if !key.is_empty() {
                let name = header_name
                    .as_deref()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or(DEFAULT_API_KEY_HEADER);
                headers.insert(name.to_string(), key.clone());
            }
        }
        Authentication::Basic { username, password } => {
            if !username.is_empty() && !password.is_empty() {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", username, password));
                headers.insert("Authorization".to_string(), format!("Basic {}", encoded));
            }
        }
    }
    headers
}

/// Merge static headers with auth headers. Auth wins on conflict.
///
/// Header names are compared case-insensitively so a static `authorization`
/// cannot shadow the injected `Authorization`.
pub fn merge_headers(
    static_headers: &BTreeMap<String, String>,
    auth_headers: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged: BTreeMap<String, String> = static_headers
        .iter()
        .filter(|(name, _)| {
            !auth_headers
                .keys()
                .any(|auth_name| auth_name.eq_ignore_ascii_case(name))
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    merged.extend(auth_headers);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn single(name: &str, value: &str) -> BTreeMap<String, String> {
        BTreeMap::from([(name.to_string(), value.to_string())])
    }

    #[test]
    fn test_bearer_empty_token_emits_nothing() {
        let headers = build_auth_headers(&Authentication::Bearer {
            token: String::new(),
        });
        assert!(headers.is_empty());
    }

    #[test]
    fn test_bearer_token() {
        let headers = build_auth_headers(&Authentication::Bearer {
            token: "abc".to_string(),
        });
        assert_eq!(headers, single("Authorization", "Bearer abc"));
    }

    #[test]
    fn test_api_key_default_header() {
        let headers = build_auth_headers(&Authentication::ApiKey {
            key: "k-123".to_string(),
            header_name: None,
        });
        assert_eq!(headers, single("X-API-Key", "k-123"));
    }

    #[test]
    fn test_api_key_custom_header() {
        let headers = build_auth_headers(&Authentication::ApiKey {
            key: "k-123".to_string(),
            header_name: Some("X-Tenant-Key".to_string()),
        });
        assert_eq!(headers, single("X-Tenant-Key", "k-123"));
    }

    #[test]
    fn test_api_key_empty_key_emits_nothing() {
        let headers = build_auth_headers(&Authentication::ApiKey {
            key: String::new(),
            header_name: Some("X-Tenant-Key".to_string()),
        });
        assert!(headers.is_empty());
    }

    #[test]
    fn test_basic_requires_both_parts() {
        let missing_password = build_auth_headers(&Authentication::Basic {
            username: "svc".to_string(),
            password: String::new(),
        });
        assert!(missing_password.is_empty());

        let headers = build_auth_headers(&Authentication::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        });
        // base64("user:pass")
        assert_eq!(headers, single("Authorization", "Basic dXNlcjpwYXNz"));
    }

    #[test]
    fn test_none_emits_nothing() {
        assert!(build_auth_headers(&Authentication::None).is_empty());
    }

    #[test]
    fn test_merge_auth_wins() {
        let mut statics = BTreeMap::new();
        statics.insert("Accept".to_string(), "application/json".to_string());
        statics.insert("authorization".to_string(), "Bearer stale".to_string());

        let merged = merge_headers(&statics, single("Authorization", "Bearer fresh"));
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["Authorization"], "Bearer fresh");
        assert_eq!(merged["Accept"], "application/json");
    }
}
