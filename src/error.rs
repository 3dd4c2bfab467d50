// src/error.rs

use chrono::{DateTime, Utc};

use crate::models::PaymentStatus;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// No response was received (connect, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the server's `error` field when present.
    #[error("{message}")]
    PaymentRequest { status: u16, message: String },

    /// `body` holds the full payload; `Display` shows a bounded preview.
    #[error("invalid response: {source}; body={}", body_preview(.body))]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("invalid base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("payment intent {payment_intent_id} expired at {expires_at}")]
    IntentExpired {
        payment_intent_id: String,
        expires_at: DateTime<Utc>,
    },

    #[error("payment intent {payment_intent_id} is already {status:?}")]
    IntentTerminal {
        payment_intent_id: String,
        status: PaymentStatus,
    },
}

const BODY_PREVIEW_CHARS: usize = 200;

fn body_preview(body: &str) -> String {
    match body.char_indices().nth(BODY_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}... ({} bytes)", &body[..cut], body.len()),
        None => body.to_string(),
    }
}

impl ClientError {
    /// HTTP status of a rejected request, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::PaymentRequest { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
