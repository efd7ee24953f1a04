use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Default request body limit (20MB). Data-URI payloads are base64, so this
/// bounds uploads to roughly 15MB of original file.
const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Default timeout for a single model call.
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Deserialize)]
pub struct FlowsConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub models: ModelConfig,
    pub google: GoogleConfig,
    pub http: HttpConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Which backend answers flow prompts.
    pub provider: ProviderKind,
    /// Model for structured JSON output (e.g., gemini-2.0-flash)
    pub text_model: String,
    /// Sampling temperature passed to every flow call, if set.
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub api_key: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub max_body_bytes: usize,
    /// Front-end origin allowed by CORS. `None` allows any origin.
    pub allowed_origin: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

/// Model backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    /// Scripted replies, for local development without an API key.
    Mock,
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "FLOWS_PROVIDER must be 'gemini' or 'mock', got '{}'",
                other
            ))),
        }
    }
}

impl FlowsConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let provider: ProviderKind = get_env("FLOWS_PROVIDER", Some("gemini"), is_prod)?.parse()?;
        if is_prod && provider == ProviderKind::Mock {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "The mock provider cannot be used in production"
            )));
        }

        // The key is only mandatory when Gemini actually answers.
        let api_key = match provider {
            ProviderKind::Gemini => get_env("GOOGLE_API_KEY", None, is_prod)?,
            ProviderKind::Mock => env::var("GOOGLE_API_KEY").unwrap_or_default(),
        };

        Ok(FlowsConfig {
            common: common_config,
            models: ModelConfig {
                provider,
                text_model: get_env("GENAI_TEXT_MODEL", Some("gemini-2.0-flash"), is_prod)?,
                temperature: parsed_env("FLOWS_TEMPERATURE")?,
            },
            google: GoogleConfig {
                api_key,
                api_base: optional_env("GEMINI_API_BASE").unwrap_or_else(|| {
                    crate::services::providers::gemini::GEMINI_API_BASE.to_string()
                }),
                timeout_secs: parsed_env("GEMINI_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_GEMINI_TIMEOUT_SECS),
            },
            http: HttpConfig {
                max_body_bytes: parsed_env("FLOWS_MAX_BODY_BYTES")?
                    .unwrap_or(DEFAULT_MAX_BODY_BYTES),
                allowed_origin: optional_env("FLOWS_ALLOWED_ORIGIN"),
            },
            observability: ObservabilityConfig {
                log_level: optional_env("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                otlp_endpoint: optional_env("OTLP_ENDPOINT"),
            },
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Optional variable parsed as `T`. Set but unparseable is an error.
fn parsed_env<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    parse_setting(key, optional_env(key))
}

fn parse_setting<T>(key: &str, value: Option<String>) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!(
                    "{} has an invalid value '{}': {}",
                    key,
                    raw,
                    e
                ))
            })
        })
        .transpose()
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
