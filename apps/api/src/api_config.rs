use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use flowdash_core::AppError;
use flowdash_domain::ClientVersion;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Remote config store holding published rule documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleStoreConfig {
    Memory,
    Redis {
        url: String,
        key_prefix: String,
    },
    Nacos {
        server_addr: Url,
        namespace: Option<String>,
        timeout: Duration,
    },
}

impl RuleStoreConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Redis { .. } => "redis",
            Self::Nacos { .. } => "nacos",
        }
    }
}

/// Naming of per-app rule documents inside the config store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDocumentConfig {
    pub group: String,
    pub param_flow_postfix: String,
    pub system_postfix: String,
    pub authority_postfix: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub rule_store: RuleStoreConfig,
    pub rule_documents: RuleDocumentConfig,
    pub param_flow_min_client_version: ClientVersion,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let value_or = |name: &str, default: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_owned())
        };
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };

        let api_host = value_or("API_HOST", "127.0.0.1");
        let api_port = value_or("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))?;
        let frontend_url = value_or("FRONTEND_URL", "http://localhost:3000");

        let rule_store = match value_or("RULE_STORE", "memory").as_str() {
            "memory" => RuleStoreConfig::Memory,
            "redis" => RuleStoreConfig::Redis {
                url: required("REDIS_URL")?,
                key_prefix: value_or("REDIS_KEY_PREFIX", "flowdash:config"),
            },
            "nacos" => {
                let server_addr = Url::parse(&required("NACOS_SERVER_ADDR")?).map_err(|error| {
                    AppError::Validation(format!("invalid NACOS_SERVER_ADDR: {error}"))
                })?;
                let timeout_ms = value_or("NACOS_TIMEOUT_MS", "3000")
                    .parse::<u64>()
                    .map_err(|error| {
                        AppError::Validation(format!("invalid NACOS_TIMEOUT_MS: {error}"))
                    })?;
                RuleStoreConfig::Nacos {
                    server_addr,
                    namespace: lookup("NACOS_NAMESPACE").filter(|value| !value.trim().is_empty()),
                    timeout: Duration::from_millis(timeout_ms),
                }
            }
            other => {
                return Err(AppError::Validation(format!(
                    "RULE_STORE must be one of 'memory', 'redis' or 'nacos', got '{other}'"
                )));
            }
        };

        let rule_documents = RuleDocumentConfig {
            group: value_or("RULE_GROUP", "SENTINEL_GROUP"),
            param_flow_postfix: value_or("PARAM_FLOW_DATA_POSTFIX", "-param-rules"),
            system_postfix: value_or("SYSTEM_DATA_POSTFIX", "-system-rules"),
            authority_postfix: value_or("AUTHORITY_DATA_POSTFIX", "-authority-rules"),
        };

        let min_version = value_or("PARAM_FLOW_MIN_CLIENT_VERSION", "0.2.0");
        let param_flow_min_client_version =
            ClientVersion::parse(&min_version).ok_or_else(|| {
                AppError::Validation(format!(
                    "invalid PARAM_FLOW_MIN_CLIENT_VERSION '{min_version}'"
                ))
            })?;

        Ok(Self {
            api_host,
            api_port,
            frontend_url,
            rule_store,
            rule_documents,
            param_flow_min_client_version,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
