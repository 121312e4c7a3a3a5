//! One-shot notices carried across a redirect in a signed cookie.
//!
//! A handler that redirects returns a [`Flash`] with the messages to show;
//! the next page rendered takes them out with [`IncomingFlashes`], which also
//! clears the cookie.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponseParts, ResponseParts},
};
use base64::prelude::*;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const COOKIE_NAME: &str = "flash";
const COOKIE_ATTRIBUTES: &str = "Path=/; HttpOnly; SameSite=Lax";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub message: String,
}

/// HMAC key used to sign flash cookies, derived from `SECRET_KEY`
#[derive(Clone)]
pub struct FlashKey(Arc<[u8]>);

impl FlashKey {
    pub fn new(secret: &str) -> Self {
        Self(Arc::from(secret.as_bytes()))
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(&self.0).ok()
    }

    /// `base64url(json) "." hex(hmac)`
    fn encode(&self, messages: &[FlashMessage]) -> Option<String> {
        let json = serde_json::to_vec(messages).ok()?;
        let payload = BASE64_URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Some(format!("{}.{}", payload, signature))
    }

    /// Returns `None` for tampered, truncated or foreign values
    fn decode(&self, value: &str) -> Option<Vec<FlashMessage>> {
        let (payload, signature) = value.split_once('.')?;
        let signature = hex::decode(signature).ok()?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).ok()?;

        let json = BASE64_URL_SAFE_NO_PAD.decode(payload).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

impl std::fmt::Debug for FlashKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FlashKey(***)")
    }
}

/// Outgoing notices, written to the cookie when returned from a handler
#[derive(Debug, Clone)]
pub struct Flash {
    key: FlashKey,
    messages: Vec<FlashMessage>,
}

impl Flash {
    pub fn new(key: FlashKey) -> Self {
        Self {
            key,
            messages: Vec::new(),
        }
    }

    pub fn push(mut self, level: Level, message: impl Into<String>) -> Self {
        self.messages.push(FlashMessage {
            level,
            message: message.into(),
        });
        self
    }

    pub fn success(self, message: impl Into<String>) -> Self {
        self.push(Level::Success, message)
    }

    pub fn info(self, message: impl Into<String>) -> Self {
        self.push(Level::Info, message)
    }

    pub fn warning(self, message: impl Into<String>) -> Self {
        self.push(Level::Warning, message)
    }
}

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
    FlashKey: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::new(FlashKey::from_ref(state)))
    }
}

impl IntoResponseParts for Flash {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if self.messages.is_empty() {
            return Ok(res);
        }

        let cookie = self
            .key
            .encode(&self.messages)
            .map(|value| format!("{}={}; {}", COOKIE_NAME, value, COOKIE_ATTRIBUTES))
            .and_then(|cookie| HeaderValue::from_str(&cookie).ok());

        match cookie {
            Some(cookie) => {
                res.headers_mut().append(header::SET_COOKIE, cookie);
            }
            None => tracing::warn!("Dropping flash messages that could not be encoded"),
        }
        Ok(res)
    }
}

/// Notices left by the previous request; consuming them clears the cookie
#[derive(Debug, Clone, Default)]
pub struct IncomingFlashes {
    messages: Vec<FlashMessage>,
    has_cookie: bool,
}

impl IncomingFlashes {
    pub fn messages(&self) -> &[FlashMessage] {
        &self.messages
    }

    fn from_headers(headers: &HeaderMap, key: &FlashKey) -> Self {
        let value = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == COOKIE_NAME)
            .map(|(_, value)| value);

        match value {
            Some(value) => Self {
                messages: key.decode(value).unwrap_or_default(),
                has_cookie: true,
            },
            None => Self::default(),
        }
    }
}

impl<S> FromRequestParts<S> for IncomingFlashes
where
    S: Send + Sync,
    FlashKey: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers, &FlashKey::from_ref(state)))
    }
}

impl IntoResponseParts for IncomingFlashes {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if self.has_cookie {
            let removal = format!("{}=; {}; Max-Age=0", COOKIE_NAME, COOKIE_ATTRIBUTES);
            if let Ok(value) = HeaderValue::from_str(&removal) {
                res.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        Ok(res)
    }
}
