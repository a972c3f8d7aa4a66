//! API key request gate.
//!
//! Every request handled behind the gate must carry an `X-API-Key` header whose value is a
//! stored key. Header names are matched case-insensitively; the key value is matched exactly.

use crate::error::{Error, Result};
use crate::key_store::KeyStore;
use axum::http::HeaderMap;
use std::future::Future;
use std::sync::Arc;

/// Credential header name, lowercase as stored by [`HeaderMap`].
pub const API_KEY_HEADER: &str = "x-api-key";

/// Read the credential header.
///
/// `HeaderMap` normalizes names to lowercase, so `X-API-Key`, `x-api-key` and `X-Api-Key`
/// all resolve to the same entry. Values that are not visible ASCII count as absent.
#[must_use]
pub fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
}

#[derive(Debug, Clone)]
pub struct ApiKeyGate {
    store: Arc<KeyStore>,
}

impl ApiKeyGate {
    #[must_use]
    pub fn new(store: Arc<KeyStore>) -> Self {
        Self { store }
    }

    /// Run `proceed` only if the request carries a valid API key.
    ///
    /// On success the continuation's output is returned unchanged. On failure `proceed` is
    /// never invoked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] when the key is missing or unknown, and
    /// [`Error::Storage`] when the key store lookup fails.
    pub async fn intercept<F, Fut, T>(&self, headers: &HeaderMap, proceed: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let api_key = extract_api_key(headers);

        let valid = self.store.validate(api_key).await.inspect_err(|e| {
            tracing::error!(error = %e, "api key lookup failed");
        })?;
        if !valid {
            tracing::warn!(
                header_present = api_key.is_some(),
                "rejected request: invalid or missing API key"
            );
            return Err(Error::Unauthorized);
        }

        Ok(proceed().await)
    }
}
