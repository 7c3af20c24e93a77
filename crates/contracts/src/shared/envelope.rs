use serde::{Deserialize, Serialize};

/// Wire envelope shared by every JSON endpoint.
///
/// A 200 response still carries `ok:false` when the request was understood
/// but could not be served (missing query param, business rule violation).
/// Transport-level failures never produce an envelope at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Server-provided error text, or a fallback when the envelope carries none.
    pub fn error_text(&self, fallback: &str) -> String {
        self.error
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_roundtrip() {
        let env = ApiEnvelope::ok(vec![1, 2, 3]);
        let raw = serde_json::to_string(&env).unwrap();
        assert!(raw.contains("\"ok\":true"));
        assert!(!raw.contains("error"));
        let back: ApiEnvelope<Vec<i32>> = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.data.unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_err_envelope_has_no_data() {
        let env: ApiEnvelope<()> = ApiEnvelope::err("Falta query param: linea");
        assert!(!env.ok);
        assert_eq!(env.error_text("?"), "Falta query param: linea");
    }

    #[test]
    fn test_error_text_fallback_on_blank() {
        let env: ApiEnvelope<()> = ApiEnvelope {
            ok: false,
            data: None,
            error: Some("   ".into()),
        };
        assert_eq!(env.error_text("HTTP 500"), "HTTP 500");
    }
}
