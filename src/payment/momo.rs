use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::signature::{self, CreateSignatureFields, IpnSignatureFields, SignatureError};

#[derive(Error, Debug)]
pub enum MomoError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Invalid response from MoMo: {0}")]
    InvalidResponse(String),
    #[error("MoMo rejected the payment (resultCode {result_code}): {message}")]
    Rejected { result_code: i64, message: String },
    #[error("Circuit breaker open: {0}")]
    CircuitBreakerOpen(String),
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// Gateway credentials and callback URLs.
#[derive(Debug, Clone)]
pub struct MomoSettings {
    pub endpoint: String,
    pub partner_code: String,
    pub access_key: String,
    pub secret_key: String,
    pub redirect_url: String,
    pub ipn_url: String,
    pub request_type: String,
    pub timeout_secs: u64,
}

/// Body sent to the MoMo create endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoCreateRequest {
    pub partner_code: String,
    pub access_key: String,
    pub request_id: String,
    pub amount: i64,
    pub order_id: String,
    pub order_info: String,
    pub redirect_url: String,
    pub ipn_url: String,
    pub extra_data: String,
    pub request_type: String,
    pub signature: String,
    pub lang: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoCreateResponse {
    #[serde(default)]
    pub partner_code: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub response_time: Option<i64>,
    #[serde(default)]
    pub message: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub result_code: i64,
    #[serde(default)]
    pub pay_url: Option<String>,
    #[serde(default)]
    pub deeplink: Option<String>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
}

/// IPN body posted by MoMo once the customer finishes (or abandons) payment.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MomoIpnPayload {
    pub partner_code: String,
    pub order_id: String,
    pub request_id: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub amount: i64,
    #[serde(default)]
    pub order_info: String,
    #[serde(default)]
    pub order_type: String,
    #[serde(deserialize_with = "lenient_string")]
    pub trans_id: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub result_code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub pay_type: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub response_time: i64,
    #[serde(default)]
    pub extra_data: String,
    pub signature: String,
}

/// How a MoMo result code should move the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomoOutcome {
    Success,
    InProgress,
    Failure,
}

impl MomoOutcome {
    pub fn from_result_code(code: i64) -> Self {
        match code {
            0 => MomoOutcome::Success,
            // initiated, processing, processing by provider
            1000 | 7000 | 7002 => MomoOutcome::InProgress,
            _ => MomoOutcome::Failure,
        }
    }
}

impl MomoIpnPayload {
    pub fn signature_fields<'a>(&'a self, access_key: &'a str) -> IpnSignatureFields<'a> {
        IpnSignatureFields {
            access_key,
            amount: self.amount,
            extra_data: &self.extra_data,
            message: &self.message,
            order_id: &self.order_id,
            order_info: &self.order_info,
            order_type: &self.order_type,
            partner_code: &self.partner_code,
            pay_type: &self.pay_type,
            request_id: &self.request_id,
            response_time: self.response_time,
            result_code: self.result_code,
            trans_id: &self.trans_id,
        }
    }

    pub fn outcome(&self) -> MomoOutcome {
        MomoOutcome::from_result_code(self.result_code)
    }
}

/// HTTP client for the MoMo wallet gateway.
#[derive(Clone)]
pub struct MomoClient {
    client: Client,
    settings: MomoSettings,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

impl MomoClient {
    pub fn new(settings: MomoSettings) -> Self {
        Self::with_circuit_breaker(settings, 3, 60)
    }

    pub fn with_circuit_breaker(
        settings: MomoSettings,
        failure_threshold: u32,
        reset_timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .unwrap_or_default();

        let backoff = backoff::equal_jittered(
            Duration::from_secs(reset_timeout_secs),
            Duration::from_secs(reset_timeout_secs * 2),
        );
        let policy = failure_policy::consecutive_failures(failure_threshold, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        MomoClient {
            client,
            settings,
            circuit_breaker,
        }
    }

    pub fn circuit_state(&self) -> String {
        if self.circuit_breaker.is_call_permitted() {
            "closed".to_string()
        } else {
            "open".to_string()
        }
    }

    /// Builds and signs the create request for one order.
    pub fn build_create_request(
        &self,
        order_id: &str,
        request_id: &str,
        amount: i64,
        order_info: &str,
    ) -> Result<MomoCreateRequest, MomoError> {
        let s = &self.settings;
        let raw = CreateSignatureFields {
            access_key: &s.access_key,
            amount,
            extra_data: "",
            ipn_url: &s.ipn_url,
            order_id,
            order_info,
            partner_code: &s.partner_code,
            redirect_url: &s.redirect_url,
            request_id,
            request_type: &s.request_type,
        }
        .raw();
        let signature = signature::sign(&s.secret_key, &raw)?;
        tracing::debug!(order_id, request_id, "Signed MoMo create request");

        Ok(MomoCreateRequest {
            partner_code: s.partner_code.clone(),
            access_key: s.access_key.clone(),
            request_id: request_id.to_string(),
            amount,
            order_id: order_id.to_string(),
            order_info: order_info.to_string(),
            redirect_url: s.redirect_url.clone(),
            ipn_url: s.ipn_url.clone(),
            extra_data: String::new(),
            request_type: s.request_type.clone(),
            signature,
            lang: "vi".to_string(),
        })
    }

    /// Posts the create request. A non-zero `resultCode` is a rejection, not a
    /// transport failure, and does not count against the circuit breaker.
    pub async fn create_payment(
        &self,
        request: &MomoCreateRequest,
    ) -> Result<MomoCreateResponse, MomoError> {
        let client = self.client.clone();
        let url = self.settings.endpoint.clone();
        let body = request.clone();

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client.post(&url).json(&body).send().await?;
                let status = response.status();
                let text = response.text().await?;
                serde_json::from_str::<MomoCreateResponse>(&text).map_err(|e| {
                    MomoError::InvalidResponse(format!("status {}: {} ({})", status, e, text))
                })
            })
            .await;

        let response = match result {
            Ok(response) => response,
            Err(FailsafeError::Rejected) => {
                return Err(MomoError::CircuitBreakerOpen(
                    "MoMo API circuit breaker is open".to_string(),
                ))
            }
            Err(FailsafeError::Inner(e)) => return Err(e),
        };

        if response.result_code != 0 {
            return Err(MomoError::Rejected {
                result_code: response.result_code,
                message: response.message,
            });
        }
        if response.pay_url.is_none() {
            return Err(MomoError::InvalidResponse("missing payUrl".to_string()));
        }

        Ok(response)
    }

    /// Checks partner code and signature of an IPN before anything trusts it.
    pub fn verify_ipn(&self, payload: &MomoIpnPayload) -> bool {
        if payload.partner_code != self.settings.partner_code {
            return false;
        }
        let raw = payload.signature_fields(&self.settings.access_key).raw();
        signature::verify(&self.settings.secret_key, &raw, &payload.signature)
    }

    /// Signs an IPN payload the way MoMo does. Used to build test callbacks.
    pub fn sign_ipn(&self, payload: &MomoIpnPayload) -> Result<String, MomoError> {
        let raw = payload.signature_fields(&self.settings.access_key).raw();
        Ok(signature::sign(&self.settings.secret_key, &raw)?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    String(String),
}

/// MoMo sends some numeric fields as JSON numbers and some integrations as strings.
fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n.to_string()),
        NumberOrString::String(s) => Ok(s),
    }
}
