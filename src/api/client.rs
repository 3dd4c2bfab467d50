// src/api/client.rs
//
// Client for the donation backend's payment and donation endpoints.
// Auth: `Authorization: Bearer <token>` when a token is configured.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{RequestBuilder, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::ClientError;
use crate::models::{
    ConfirmPaymentRequest, CreateDonationRequest, CreatePaymentIntentRequest, Donation,
    PaymentConfirmationResponse, PaymentIntent, PaymentStatus,
};

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
}

/// Stateless wrapper around the payment endpoints. Every call is one round trip;
/// nothing is retried, cached or tracked between calls.
#[derive(Clone)]
pub struct DonationApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl std::fmt::Debug for DonationApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DonationApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl DonationApiClient {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            }
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "url cannot carry a path".to_string(),
            });
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(
            &config.api_base_url,
            config.api_token.clone(),
            config.request_timeout,
        )
    }

    /// Same backend and connection pool, different session.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: (!token.is_empty()).then_some(token),
        }
    }

    pub async fn create_payment_intent(
        &self,
        req: &CreatePaymentIntentRequest,
    ) -> Result<PaymentIntent, ClientError> {
        log::info!(
            "create payment intent amount={} currency={:?} cause={}",
            req.amount,
            req.currency,
            req.donation_cause
        );
        let url = self.endpoint(&["api", "payments", "create-donation-intent"]);
        let body = self
            .send(
                self.http.post(url).json(req),
                "create_payment_intent",
                "Failed to create payment intent",
            )
            .await?;
        decode(&body, "create_payment_intent")
    }

    /// A declined payment (`success = false`) is still an `Ok` response; the
    /// outcome is in `payment_status`.
    pub async fn confirm_payment(
        &self,
        req: &ConfirmPaymentRequest,
    ) -> Result<PaymentConfirmationResponse, ClientError> {
        log::info!(
            "confirm payment intent={} method={:?} success={}",
            req.payment_intent_id,
            req.payment_method,
            req.success
        );
        let url = self.endpoint(&["api", "payments", "confirm-donation"]);
        let body = self
            .send(
                self.http.post(url).json(req),
                "confirm_payment",
                "Failed to confirm payment",
            )
            .await?;
        decode(&body, "confirm_payment")
    }

    /// Confirms `intent` only if it is still pending and not past `expiresAt`.
    /// The request's `payment_intent_id` is taken from `intent`.
    pub async fn confirm_pending_intent(
        &self,
        intent: &PaymentIntent,
        mut req: ConfirmPaymentRequest,
    ) -> Result<PaymentConfirmationResponse, ClientError> {
        ensure_confirmable(intent, Utc::now())?;
        req.payment_intent_id = intent.payment_intent_id.clone();
        self.confirm_payment(&req).await
    }

    pub async fn cancel_payment(&self, payment_intent_id: &str) -> Result<(), ClientError> {
        log::info!("cancel payment intent={}", payment_intent_id);
        let url = self.endpoint(&["api", "payments", "cancel", payment_intent_id]);
        self.send(
            self.http.post(url),
            "cancel_payment",
            "Failed to cancel payment",
        )
        .await?;
        Ok(())
    }

    pub async fn get_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentIntent, ClientError> {
        let url = self.endpoint(&["api", "payments", "intent", payment_intent_id]);
        let body = self
            .send(
                self.http.get(url),
                "get_payment_intent",
                "Failed to fetch payment intent",
            )
            .await?;
        decode(&body, "get_payment_intent")
    }

    pub async fn create_donation(
        &self,
        req: &CreateDonationRequest,
    ) -> Result<Donation, ClientError> {
        log::info!("create donation amount={}", req.amount);
        let url = self.endpoint(&["api", "donation"]);
        let body = self
            .send(
                self.http.post(url).json(req),
                "create_donation",
                "Failed to create donation",
            )
            .await?;
        decode(&body, "create_donation")
    }

    /// Best-effort listing: any failure is logged and yields an empty list.
    /// Use [`Self::try_get_user_donations`] to see the error.
    pub async fn get_user_donations(&self) -> Vec<Donation> {
        match self.try_get_user_donations().await {
            Ok(donations) => donations,
            Err(e) => {
                log::warn!("get_user_donations degraded to empty list: {e}");
                Vec::new()
            }
        }
    }

    pub async fn try_get_user_donations(&self) -> Result<Vec<Donation>, ClientError> {
        let url = self.endpoint(&["api", "donation"]);
        let body = self
            .send(
                self.http.get(url),
                "get_user_donations",
                "Failed to fetch donations",
            )
            .await?;
        decode(&body, "get_user_donations")
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base urls are rejected in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Sends the request and returns the body of a 2xx response.
    async fn send(
        &self,
        mut builder: RequestBuilder,
        op: &'static str,
        fallback: &'static str,
    ) -> Result<String, ClientError> {
        // absent token means no header at all
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let mut request = builder.build().map_err(|e| {
            log::error!("{op} build request error: {e}");
            ClientError::Transport(e)
        })?;
        // `.json()` may already have set it; a second copy is not allowed
        request
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self.http.execute(request).await.map_err(|e| {
            log::error!("{op} transport error: {e}");
            ClientError::Transport(e)
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            log::error!("{op} read body error: {e} status={status}");
            ClientError::Transport(e)
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| fallback.to_string());
            log::error!("{op} failed status={} error={message}", status.as_u16());
            return Err(ClientError::PaymentRequest {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(body: &str, op: &'static str) -> Result<T, ClientError> {
    serde_json::from_str::<T>(body).map_err(|source| {
        log::error!("{op} invalid response: {source}");
        ClientError::Decode {
            source,
            body: body.to_string(),
        }
    })
}

/// Local pre-flight for a confirm: refuses intents that are already final or
/// whose `expiresAt` has passed at `now`. A final status reported by the
/// server wins over the timestamp.
pub fn ensure_confirmable(intent: &PaymentIntent, now: DateTime<Utc>) -> Result<(), ClientError> {
    if intent.status.is_terminal() && intent.status != PaymentStatus::Expired {
        return Err(ClientError::IntentTerminal {
            payment_intent_id: intent.payment_intent_id.clone(),
            status: intent.status,
        });
    }
    if intent.is_expired_at(now) {
        return Err(ClientError::IntentExpired {
            payment_intent_id: intent.payment_intent_id.clone(),
            expires_at: intent.expires_at,
        });
    }
    Ok(())
}
