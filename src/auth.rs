use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, StatusCode, header, request::Parts},
};
use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::{Map, Value};
use std::{
    collections::HashMap,
    convert::Infallible,
    sync::{PoisonError, RwLock},
};
use thiserror::Error;

use crate::{
    config::{AppConfig, Env},
    models::Role,
};

/// The fixed storage key under which the bearer token is persisted.
pub const CREDENTIAL_KEY: &str = "token";

/// Header accepted in local mode instead of a real token.
pub const DEV_ROLE_HEADER: &str = "x-dev-role";

// base64url, with or without trailing padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// CredentialError
///
/// Every way a stored credential can fail to decode. The guard treats all of
/// them as "not logged in"; they are only surfaced for logging.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential has {0} segments, expected 3")]
    SegmentCount(usize),
    #[error("payload segment is not valid base64url")]
    Base64,
    #[error("payload segment is not valid JSON: {0}")]
    Json(String),
    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// Claims
///
/// The fields read from the credential's payload segment. Only `role` takes part in
/// authorization; the others are carried for display. The signature is never checked
/// here: the backend validates the token on every API call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims {
    pub role: Option<Role>,
    pub user_id: Option<String>,
    pub name: Option<String>,
    /// Unix timestamp (seconds) written by the issuing backend.
    pub expires: Option<f64>,
}

impl Claims {
    fn from_payload(payload: &Map<String, Value>) -> Self {
        let string_field = |key: &str| payload.get(key).and_then(Value::as_str).map(str::to_owned);

        Claims {
            role: payload.get("role").and_then(Value::as_str).and_then(Role::from_claim),
            user_id: string_field("user_id"),
            name: string_field("name"),
            expires: payload.get("expires").and_then(Value::as_f64),
        }
    }
}

/// decode_credential
///
/// Decodes the payload segment of a `header.payload.signature` token.
/// Total: every input yields either claims or a `CredentialError`.
pub fn decode_credential(token: &str) -> Result<Claims, CredentialError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(CredentialError::SegmentCount(segments.len()));
    }

    let bytes = URL_SAFE_LENIENT
        .decode(segments[1])
        .map_err(|_| CredentialError::Base64)?;

    let payload: Value =
        serde_json::from_slice(&bytes).map_err(|e| CredentialError::Json(e.to_string()))?;

    match payload {
        Value::Object(map) => Ok(Claims::from_payload(&map)),
        _ => Err(CredentialError::NotAnObject),
    }
}

/// unsigned_credential
///
/// Builds a token with an empty signature carrying only the given role.
/// Used by the local development bypass.
pub fn unsigned_credential(role: Role) -> String {
    let header = URL_SAFE_LENIENT.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_LENIENT.encode(serde_json::json!({ "role": role.as_str() }).to_string());
    format!("{header}.{payload}.")
}

// --- Credential Providers ---

/// CredentialProvider
///
/// The capability the guard uses to read the stored credential. Injected, so the
/// guard never touches global state and can run without a browser.
pub trait CredentialProvider {
    /// Returns the raw token if one is stored.
    fn credential(&self) -> Option<String>;
}

impl CredentialProvider for Option<String> {
    fn credential(&self) -> Option<String> {
        self.clone()
    }
}

impl<P: CredentialProvider + ?Sized> CredentialProvider for &P {
    fn credential(&self) -> Option<String> {
        (**self).credential()
    }
}

/// MemoryCredentialStore
///
/// An in-process key/value store with the same surface as per-origin local storage.
/// Login writes `CREDENTIAL_KEY`, logout removes it; the guard only reads.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn set_item(&self, key: &str, value: impl Into<String>) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.into());
    }

    pub fn remove_item(&self, key: &str) {
        self.items
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Stores the credential under the fixed key (the login flow's write).
    pub fn login(&self, token: impl Into<String>) {
        self.set_item(CREDENTIAL_KEY, token);
    }

    /// Clears the credential (the logout flow's write).
    pub fn logout(&self) {
        self.remove_item(CREDENTIAL_KEY);
    }
}

impl CredentialProvider for MemoryCredentialStore {
    fn credential(&self) -> Option<String> {
        self.get_item(CREDENTIAL_KEY).filter(|token| !token.is_empty())
    }
}

/// RequestCredential
///
/// The credential carried by an HTTP request: the `Authorization: Bearer` header,
/// else the `token` cookie. In `Env::Local` the `x-dev-role` header stands in for a token.
/// Extraction never fails; absence is a valid answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestCredential(pub Option<String>);

impl RequestCredential {
    pub fn from_headers(headers: &HeaderMap, env: &Env) -> Self {
        if let Some(token) = bearer_token(headers).or_else(|| cookie_token(headers)) {
            return RequestCredential(Some(token));
        }

        if *env == Env::Local {
            let dev_role = headers
                .get(DEV_ROLE_HEADER)
                .and_then(|value| value.to_str().ok())
                .and_then(Role::from_claim);
            if let Some(role) = dev_role {
                tracing::debug!(%role, "using local development role bypass");
                return RequestCredential(Some(unsigned_credential(role)));
            }
        }

        RequestCredential(None)
    }
}

impl CredentialProvider for RequestCredential {
    fn credential(&self) -> Option<String> {
        self.0.clone()
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == CREDENTIAL_KEY && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

impl<S> FromRequestParts<S> for RequestCredential
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        Ok(RequestCredential::from_headers(&parts.headers, &config.env))
    }
}

/// Session
///
/// A request whose credential is present and decodable. Handlers that need the
/// caller's role take this as an argument; anything else is rejected with 401.
#[derive(Debug, Clone)]
pub struct Session {
    pub claims: Claims,
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        let RequestCredential(credential) = RequestCredential::from_headers(&parts.headers, &config.env);

        let token = credential.ok_or(StatusCode::UNAUTHORIZED)?;

        match decode_credential(&token) {
            Ok(claims) => Ok(Session { claims }),
            Err(e) => {
                tracing::warn!(error = %e, "rejecting session with malformed credential");
                Err(StatusCode::UNAUTHORIZED)
            }
        }
    }
}
