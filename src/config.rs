use anyhow::{Context, Result};
use dotenvy::dotenv;
use ipnet::IpNet;
use std::env;
use std::net::IpAddr;

use crate::payment::{BankAccount, MomoSettings};

pub const DEFAULT_MOMO_ENDPOINT: &str = "https://test-payment.momo.vn/v2/gateway/api/create";
pub const DEFAULT_CART_TTL_SECS: u64 = 24 * 60 * 60;
pub const MAX_CART_TTL_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedIps {
    Any,
    Cidrs(Vec<IpNet>),
}

impl AllowedIps {
    pub fn contains(&self, ip: IpAddr) -> bool {
        match self {
            AllowedIps::Any => true,
            AllowedIps::Cidrs(cidrs) => cidrs.iter().any(|cidr| cidr.contains(&ip)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub redis_url: String,
    pub app_env: String,
    pub admin_api_key: String,
    pub cart_ttl_secs: u64,
    pub log_format: LogFormat,
    pub log_request_body: bool,
    pub cors_allowed_origin: Option<String>,
    pub momo: MomoSettings,
    pub momo_ipn_allowed_ips: AllowedIps,
    pub trusted_proxy_depth: usize,
    pub bank_account: BankAccount,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        let log_format = match env_or("LOG_FORMAT", "text").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "text" | "pretty" => LogFormat::Text,
            other => anyhow::bail!("LOG_FORMAT must be 'text' or 'json', got '{}'", other),
        };

        Ok(Config {
            server_port: env_or("SERVER_PORT", "3000")
                .parse()
                .context("SERVER_PORT must be a port number")?,
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            app_env: env_or("APP_ENV", "development"),
            admin_api_key: required("ADMIN_API_KEY")?,
            cart_ttl_secs: env_or("CART_TTL_SECS", &DEFAULT_CART_TTL_SECS.to_string())
                .parse()
                .context("CART_TTL_SECS must be a number of seconds")?,
            log_format,
            log_request_body: env_or("LOG_REQUEST_BODY", "false")
                .parse()
                .unwrap_or(false),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN").ok(),
            momo: MomoSettings {
                endpoint: env_or("MOMO_ENDPOINT", DEFAULT_MOMO_ENDPOINT),
                partner_code: required("MOMO_PARTNER_CODE")?,
                access_key: required("MOMO_ACCESS_KEY")?,
                secret_key: required("MOMO_SECRET_KEY")?,
                redirect_url: env_or("MOMO_REDIRECT_URL", "http://localhost:3000/payment/result"),
                ipn_url: env_or("MOMO_IPN_URL", "http://localhost:3000/payment/momo/ipn"),
                request_type: env_or("MOMO_REQUEST_TYPE", "captureWallet"),
                timeout_secs: env_or("MOMO_TIMEOUT_SECS", "30")
                    .parse()
                    .context("MOMO_TIMEOUT_SECS must be a number of seconds")?,
            },
            momo_ipn_allowed_ips: parse_allowed_ips(&env_or("MOMO_IPN_ALLOWED_IPS", "*"))?,
            trusted_proxy_depth: env_or("TRUSTED_PROXY_DEPTH", "0")
                .parse()
                .context("TRUSTED_PROXY_DEPTH must be a non-negative integer")?,
            bank_account: BankAccount {
                account_number: env_or("BANK_ACCOUNT_NUMBER", "0123456789"),
                account_name: env_or("BANK_ACCOUNT_NAME", "CONG TY MERN"),
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// Sanity checks that do not need any network access.
    pub fn validate(&self) -> Result<()> {
        if self.database_url.is_empty() {
            anyhow::bail!("DATABASE_URL is empty");
        }
        if self.redis_url.is_empty() {
            anyhow::bail!("REDIS_URL is empty");
        }
        if self.server_port == 0 {
            anyhow::bail!("SERVER_PORT must be greater than 0");
        }
        if self.admin_api_key.len() < 16 {
            anyhow::bail!("ADMIN_API_KEY must be at least 16 characters");
        }
        if self.cart_ttl_secs == 0 {
            anyhow::bail!("CART_TTL_SECS must be greater than 0");
        }
        if self.cart_ttl_secs > MAX_CART_TTL_SECS {
            anyhow::bail!("CART_TTL_SECS must be at most {}", MAX_CART_TTL_SECS);
        }
        if self.momo.timeout_secs == 0 {
            anyhow::bail!("MOMO_TIMEOUT_SECS must be greater than 0");
        }

        url::Url::parse(&self.momo.endpoint).context("MOMO_ENDPOINT is not a valid URL")?;
        url::Url::parse(&self.momo.redirect_url)
            .context("MOMO_REDIRECT_URL is not a valid URL")?;
        url::Url::parse(&self.momo.ipn_url).context("MOMO_IPN_URL is not a valid URL")?;

        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{} must be set", key))
}

pub fn parse_allowed_ips(raw: &str) -> anyhow::Result<AllowedIps> {
    let value = raw.trim();
    if value == "*" {
        return Ok(AllowedIps::Any);
    }

    let cidrs = value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::parse::<IpNet>)
        .collect::<Result<Vec<_>, _>>()?;

    if cidrs.is_empty() {
        anyhow::bail!("MOMO_IPN_ALLOWED_IPS must be '*' or a comma-separated list of CIDRs");
    }

    Ok(AllowedIps::Cidrs(cidrs))
}

/// Hides the password in a connection URL.
pub fn mask_password(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("****"));
            parsed.to_string()
        }
        _ => url.to_string(),
    }
}

/// Keeps the first and last two characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}****{}", head, tail)
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        server_port: 3000,
        database_url: "postgres://shop:pw@localhost:5432/shop".to_string(),
        redis_url: "redis://localhost:6379".to_string(),
        app_env: "development".to_string(),
        admin_api_key: "test-admin-key-0123456789".to_string(),
        cart_ttl_secs: DEFAULT_CART_TTL_SECS,
        log_format: LogFormat::Text,
        log_request_body: false,
        cors_allowed_origin: None,
        momo: MomoSettings {
            endpoint: DEFAULT_MOMO_ENDPOINT.to_string(),
            partner_code: "MOMOTEST".to_string(),
            access_key: "access".to_string(),
            secret_key: "secret".to_string(),
            redirect_url: "http://localhost:3000/payment/result".to_string(),
            ipn_url: "http://localhost:3000/payment/momo/ipn".to_string(),
            request_type: "captureWallet".to_string(),
            timeout_secs: 30,
        },
        momo_ipn_allowed_ips: AllowedIps::Any,
        trusted_proxy_depth: 0,
        bank_account: BankAccount {
            account_number: "0123456789".to_string(),
            account_name: "CONG TY MERN".to_string(),
        },
    }
}
