use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::WebError;

const DEFAULT_NAME: &str = "operator";

/// Name of the operator or judge behind an accepted API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeIdentity(pub String);

/// Accepted API keys, each mapped to the name recorded on the scores it writes.
#[derive(Clone, Default)]
pub struct ApiKeys {
    keys: HashMap<String, String>,
}

impl ApiKeys {
    /// Parses `name:key` entries; a bare `key` belongs to `operator`.
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|entry| match entry.split_once(':') {
                Some((name, key)) => {
                    let (name, key) = (name.trim(), key.trim());
                    (!key.is_empty()).then(|| {
                        let name = if name.is_empty() { DEFAULT_NAME } else { name };
                        (key.to_string(), name.to_string())
                    })
                }
                None => Some((entry.to_string(), DEFAULT_NAME.to_string())),
            })
            .collect();

        Self { keys }
    }

    pub fn identify(&self, key: &str) -> Option<JudgeIdentity> {
        self.keys.get(key).cloned().map(JudgeIdentity)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

pub async fn require_auth(
    State(api_keys): State<ApiKeys>,
    mut request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(identity) = token.and_then(|token| api_keys.identify(token)) else {
        tracing::warn!(path = %request.uri().path(), "Invalid API key attempt");
        return Err(WebError::Unauthorized);
    };

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_and_bare_keys() {
        let keys = ApiKeys::from_comma_separated("alice:k1, k2 ,bob:k3,,");

        assert_eq!(keys.len(), 3);
        assert_eq!(keys.identify("k1"), Some(JudgeIdentity("alice".to_string())));
        assert_eq!(keys.identify("k2"), Some(JudgeIdentity("operator".to_string())));
        assert_eq!(keys.identify("k3"), Some(JudgeIdentity("bob".to_string())));
        assert_eq!(keys.identify("alice"), None);
    }

    #[test]
    fn test_entries_without_key_are_dropped() {
        let keys = ApiKeys::from_comma_separated("carol:, :k4");

        assert_eq!(keys.len(), 1);
        assert_eq!(keys.identify("k4"), Some(JudgeIdentity("operator".to_string())));
    }

    #[test]
    fn test_empty_configuration_accepts_nothing() {
        let keys = ApiKeys::from_comma_separated("");

        assert!(keys.is_empty());
        assert_eq!(keys.identify(""), None);
    }
}
