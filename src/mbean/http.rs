//! Remote registry client
//!
//! Reads attributes through the JSON `/jmx` servlet exposed by Hadoop and
//! HBase daemons: `GET <base>/jmx?qry=<object name>` answers with
//! `{"beans": [{"name": ..., "<attribute>": ...}]}`.

use super::name::ResourceIdentifier;
use super::reader::{RegistryError, ResourceRegistry, BEAN_NAME_FIELD};
use super::value::AttributeValue;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Path of the JSON servlet below the endpoint base URL
const JMX_PATH: &str = "jmx";

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Truncate a response body and strip control characters before logging it
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = body
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|&i| i <= MAX_LOG_BODY_LENGTH)
            .last()
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Registry backed by a remote `/jmx` endpoint
#[derive(Clone)]
pub struct JmxHttpRegistry {
    client: Client,
    endpoint: Url,
}

impl JmxHttpRegistry {
    /// Create a client for the daemon at `base_url`, e.g. `http://localhost:16010`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| RegistryError::Unavailable(format!("invalid endpoint {base_url}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(JMX_PATH)
            .map_err(|e| RegistryError::Unavailable(format!("invalid endpoint {base_url}: {e}")))?;

        let client = Client::builder()
            .user_agent(concat!("metric-probe/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::Unavailable(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// Full URL of the JSON servlet
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch the beans matching `id`
    async fn query(&self, id: &ResourceIdentifier) -> Result<Option<Vec<Value>>, RegistryError> {
        let name = id.canonical_name();
        tracing::debug!("GET {} qry={}", self.endpoint, name);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("qry", name.as_str())])
            .send()
            .await
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RegistryError::Unavailable(format!("failed to read response body: {e}")))?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            tracing::debug!("Registry error: {} - {}", status, sanitize_for_log(&body));
            return Err(RegistryError::Status(status.as_u16()));
        }

        let mut parsed: Value = serde_json::from_str(&body)
            .map_err(|e| RegistryError::MalformedResponse(e.to_string()))?;

        match parsed.get_mut("beans").map(Value::take) {
            Some(Value::Array(beans)) => Ok(Some(beans)),
            _ => Err(RegistryError::MalformedResponse(
                "missing \"beans\" array".to_string(),
            )),
        }
    }
}

impl ResourceRegistry for JmxHttpRegistry {
    async fn try_read(
        &self,
        id: &ResourceIdentifier,
        attribute: &str,
    ) -> Result<Option<AttributeValue>, RegistryError> {
        if attribute == BEAN_NAME_FIELD {
            return Ok(None);
        }

        let Some(beans) = self.query(id).await? else {
            return Ok(None);
        };

        Ok(beans
            .iter()
            .find_map(|bean| bean.get(attribute))
            .map(AttributeValue::from))
    }
}
