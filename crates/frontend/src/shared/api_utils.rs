//! API utilities for frontend-backend communication.
//!
//! URL construction plus thin JSON helpers over `gloo-net`. Envelope
//! semantics (`ok:false` and friends) are interpreted by the callers, not
//! here; this layer only distinguishes transport from decoding failures.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Failure of a single HTTP attempt. No retries happen at this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network failure or non-2xx status. Carries the server-provided error
    /// text when the body had one, an HTTP-status message otherwise.
    Transport(String),
    /// The body arrived but was not the JSON we expected.
    Decode(String),
    /// A 200 body with `ok:false`; carries the server message.
    Protocol(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "{}", msg),
            FetchError::Decode(msg) => write!(f, "Respuesta inválida: {}", msg),
            FetchError::Protocol(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

/// Get the base URL for API requests.
///
/// Constructs the API base URL from the current window location, using
/// port 3000 for the backend server. Empty when no window is available.
pub fn api_base() -> String {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };
    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    format!("{}//{}:3000", protocol, hostname)
}

/// Build a full API URL from a path (should start with "/api/").
pub fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}

/// GET a JSON document.
pub async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, FetchError> {
    let resp = gloo_net::http::Request::get(url)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;
    decode_response(resp).await
}

/// POST a JSON body and read a JSON document back.
pub async fn post_json<B: Serialize, T: DeserializeOwned>(
    url: &str,
    body: &B,
) -> Result<T, FetchError> {
    let resp = gloo_net::http::Request::post(url)
        .header("Accept", "application/json")
        .json(body)
        .map_err(|e| FetchError::Decode(e.to_string()))?
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;
    decode_response(resp).await
}

async fn decode_response<T: DeserializeOwned>(
    resp: gloo_net::http::Response,
) -> Result<T, FetchError> {
    if !resp.ok() {
        return Err(FetchError::Transport(status_error_text(resp).await));
    }
    resp.json::<T>()
        .await
        .map_err(|e| FetchError::Decode(e.to_string()))
}

/// For a non-2xx response, prefer the `error` field of an envelope body over
/// the bare status line.
async fn status_error_text(resp: gloo_net::http::Response) -> String {
    let status = resp.status();
    if let Ok(text) = resp.text().await {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
            if let Some(msg) = value.get("error").and_then(|e| e.as_str()) {
                if !msg.trim().is_empty() {
                    return msg.to_string();
                }
            }
        }
    }
    format!("HTTP {}", status)
}
