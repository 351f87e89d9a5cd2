//! MoMo HMAC-SHA256 request and IPN signatures.
//!
//! MoMo signs a `key=value&key=value` string whose keys are in a fixed,
//! alphabetical order. The digest is lowercase hex.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid HMAC key: {0}")]
    InvalidKey(#[from] hmac::digest::InvalidLength),
}

pub fn sign(secret: &str, raw: &str) -> Result<String, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(raw.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a hex signature. Malformed hex never verifies.
pub fn verify(secret: &str, raw: &str, signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(raw.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Fields signed when creating a payment.
#[derive(Debug, Clone)]
pub struct CreateSignatureFields<'a> {
    pub access_key: &'a str,
    pub amount: i64,
    pub extra_data: &'a str,
    pub ipn_url: &'a str,
    pub order_id: &'a str,
    pub order_info: &'a str,
    pub partner_code: &'a str,
    pub redirect_url: &'a str,
    pub request_id: &'a str,
    pub request_type: &'a str,
}

impl CreateSignatureFields<'_> {
    pub fn raw(&self) -> String {
        format!(
            "accessKey={}&amount={}&extraData={}&ipnUrl={}&orderId={}&orderInfo={}\
             &partnerCode={}&redirectUrl={}&requestId={}&requestType={}",
            self.access_key,
            self.amount,
            self.extra_data,
            self.ipn_url,
            self.order_id,
            self.order_info,
            self.partner_code,
            self.redirect_url,
            self.request_id,
            self.request_type,
        )
    }
}

/// Fields signed by MoMo on an IPN callback.
#[derive(Debug, Clone)]
pub struct IpnSignatureFields<'a> {
    pub access_key: &'a str,
    pub amount: i64,
    pub extra_data: &'a str,
    pub message: &'a str,
    pub order_id: &'a str,
    pub order_info: &'a str,
    pub order_type: &'a str,
    pub partner_code: &'a str,
    pub pay_type: &'a str,
    pub request_id: &'a str,
    pub response_time: i64,
    pub result_code: i64,
    pub trans_id: &'a str,
}

impl IpnSignatureFields<'_> {
    pub fn raw(&self) -> String {
        format!(
            "accessKey={}&amount={}&extraData={}&message={}&orderId={}&orderInfo={}\
             &orderType={}&partnerCode={}&payType={}&requestId={}&responseTime={}\
             &resultCode={}&transId={}",
            self.access_key,
            self.amount,
            self.extra_data,
            self.message,
            self.order_id,
            self.order_info,
            self.order_type,
            self.partner_code,
            self.pay_type,
            self.request_id,
            self.response_time,
            self.result_code,
            self.trans_id,
        )
    }
}
