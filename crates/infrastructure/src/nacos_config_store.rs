//! Config store adapter speaking the Nacos v2 open API.

use async_trait::async_trait;
use flowdash_application::{
    ConfigEntry, ConfigKey, ConfigRevision, ConfigStore, PublishPrecondition,
};
use flowdash_core::{AppError, AppResult};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;
use url::Url;

const CONFIG_PATH: &str = "nacos/v2/cs/config";
const CONFIG_NOT_FOUND_CODE: i32 = 20004;

#[derive(Debug, Deserialize)]
struct NacosResponse<T> {
    code: i32,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<T>,
}

/// HTTP config store backed by a Nacos-compatible config server.
///
/// The server offers no compare-and-swap on this API, so preconditions are
/// checked with a read right before the write. Two writers racing inside that
/// window can still overwrite each other.
#[derive(Clone)]
pub struct NacosConfigStore {
    http_client: reqwest::Client,
    config_url: Url,
    namespace: Option<String>,
}

impl NacosConfigStore {
    /// Creates a store for the server at `server_addr`.
    pub fn new(
        http_client: reqwest::Client,
        server_addr: &Url,
        namespace: Option<String>,
    ) -> AppResult<Self> {
        let mut base = server_addr.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let config_url = base.join(CONFIG_PATH).map_err(|error| {
            AppError::Validation(format!("invalid config server address '{server_addr}': {error}"))
        })?;

        Ok(Self {
            http_client,
            config_url,
            namespace: namespace.filter(|value| !value.trim().is_empty()),
        })
    }

    fn key_params<'a>(&'a self, key: &'a ConfigKey) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![("dataId", key.data_id()), ("group", key.group())];
        if let Some(namespace) = self.namespace.as_deref() {
            params.push(("namespaceId", namespace));
        }
        params
    }
}

#[async_trait]
impl ConfigStore for NacosConfigStore {
    async fn read(&self, key: &ConfigKey) -> AppResult<Option<ConfigEntry>> {
        let response = self
            .http_client
            .get(self.config_url.clone())
            .query(&self.key_params(key))
            .send()
            .await
            .map_err(|error| {
                AppError::Store(format!("failed to read config '{key}': {error}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            AppError::Store(format!("failed to read config '{key}' response: {error}"))
        })?;

        interpret_read(key, status, &body)
    }

    async fn write(
        &self,
        key: &ConfigKey,
        content: String,
        precondition: &PublishPrecondition,
    ) -> AppResult<ConfigRevision> {
        if !matches!(precondition, PublishPrecondition::Any) {
            let current = self.read(key).await?;
            if !precondition.is_satisfied_by(current.as_ref().map(|entry| &entry.revision)) {
                return Err(AppError::Conflict(format!(
                    "config '{key}' was modified concurrently"
                )));
            }
        }

        let revision = ConfigRevision::of_content(&content);
        let mut form = self.key_params(key);
        form.push(("content", content.as_str()));
        form.push(("type", "json"));

        let response = self
            .http_client
            .post(self.config_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|error| {
                AppError::Store(format!("failed to publish config '{key}': {error}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            AppError::Store(format!("failed to read publish response for '{key}': {error}"))
        })?;

        interpret_write(key, status, &body)?;
        debug!(config = %key, revision = revision.as_str(), "published config to nacos");
        Ok(revision)
    }
}

fn interpret_read(key: &ConfigKey, status: StatusCode, body: &str) -> AppResult<Option<ConfigEntry>> {
    let parsed = serde_json::from_str::<NacosResponse<String>>(body);

    match status {
        status if status.is_success() => {
            let response = parsed.map_err(|error| {
                AppError::Store(format!("invalid config server response for '{key}': {error}"))
            })?;
            if response.code == CONFIG_NOT_FOUND_CODE {
                return Ok(None);
            }
            if response.code != 0 {
                return Err(AppError::Store(format!(
                    "config server rejected read of '{key}' with code {}: {}",
                    response.code,
                    response.message.unwrap_or_default()
                )));
            }
            Ok(response.data.map(ConfigEntry::new))
        }
        StatusCode::NOT_FOUND => match parsed {
            Ok(response) if response.code == CONFIG_NOT_FOUND_CODE => Ok(None),
            _ => Err(unsupported(key, status)),
        },
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => {
            Err(unsupported(key, status))
        }
        status => Err(AppError::Store(format!(
            "config server returned {status} reading '{key}': {body}"
        ))),
    }
}

fn interpret_write(key: &ConfigKey, status: StatusCode, body: &str) -> AppResult<()> {
    match status {
        status if status.is_success() => {
            let response = serde_json::from_str::<NacosResponse<bool>>(body).map_err(|error| {
                AppError::Store(format!("invalid config server response for '{key}': {error}"))
            })?;
            if response.code == 0 && response.data.unwrap_or(false) {
                Ok(())
            } else {
                Err(AppError::Store(format!(
                    "config server refused to publish '{key}' (code {}): {}",
                    response.code,
                    response.message.unwrap_or_default()
                )))
            }
        }
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => {
            Err(unsupported(key, status))
        }
        status => Err(AppError::Store(format!(
            "config server returned {status} publishing '{key}': {body}"
        ))),
    }
}

fn unsupported(key: &ConfigKey, status: StatusCode) -> AppError {
    AppError::Unsupported(format!(
        "config server does not recognize config operation for '{key}' ({status})"
    ))
}

#[cfg(test)]
mod tests {
    use flowdash_application::{ConfigKey, ConfigRevision};
    use flowdash_core::AppError;
    use reqwest::StatusCode;
    use url::Url;

    use super::{NacosConfigStore, interpret_read, interpret_write};

    fn key() -> ConfigKey {
        ConfigKey::new("checkout-param-rules", "SENTINEL_GROUP")
    }

    #[test]
    fn config_url_keeps_server_context_path() {
        let server = Url::parse("http://nacos.internal:8848/gateway").unwrap_or_else(|_| unreachable!());
        let store = NacosConfigStore::new(reqwest::Client::new(), &server, Some(" ".to_owned()))
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(
            store.config_url.as_str(),
            "http://nacos.internal:8848/gateway/nacos/v2/cs/config"
        );
        assert!(store.namespace.is_none());
    }

    #[test]
    fn successful_read_returns_content_with_revision() {
        let body = r#"{"code":0,"message":"success","data":"[{\"id\":1}]"}"#;
        let entry = interpret_read(&key(), StatusCode::OK, body)
            .unwrap_or_else(|_| unreachable!())
            .unwrap_or_else(|| unreachable!());

        assert_eq!(entry.content, r#"[{"id":1}]"#);
        assert_eq!(entry.revision, ConfigRevision::of_content(r#"[{"id":1}]"#));
    }

    #[test]
    fn missing_config_reads_as_none() {
        let body = r#"{"code":20004,"message":"config data not exist","data":null}"#;
        let result = interpret_read(&key(), StatusCode::NOT_FOUND, body);
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn unknown_endpoint_is_unsupported() {
        let result = interpret_read(&key(), StatusCode::NOT_FOUND, "<html>Not Found</html>");
        assert!(matches!(result, Err(AppError::Unsupported(_))));

        let result = interpret_write(&key(), StatusCode::METHOD_NOT_ALLOWED, "");
        assert!(matches!(result, Err(AppError::Unsupported(_))));
    }

    #[test]
    fn server_errors_are_store_failures() {
        let result = interpret_read(&key(), StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(matches!(result, Err(AppError::Store(_))));

        let refused = interpret_write(
            &key(),
            StatusCode::OK,
            r#"{"code":0,"message":"success","data":false}"#,
        );
        assert!(matches!(refused, Err(AppError::Store(_))));
    }

    #[test]
    fn accepted_publish_is_ok() {
        let result = interpret_write(
            &key(),
            StatusCode::OK,
            r#"{"code":0,"message":"success","data":true}"#,
        );
        assert!(result.is_ok());
    }
}
