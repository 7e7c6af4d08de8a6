use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use taskapp_core::task::{Task, TaskFilter, TaskService};
use taskapp_core::{Error, Result};

use crate::config::ClientConfig;
use crate::error::ConfigError;

/// Header carrying the shared application key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Stateless client for the `/tasks` endpoint
///
/// One attempt per call: no retries, no backoff, transport defaults for
/// timeouts.
#[derive(Debug, Clone)]
pub struct HttpTaskClient {
    client: Client,
    base_url: Url,
}

impl HttpTaskClient {
    pub fn new(config: ClientConfig) -> std::result::Result<Self, ConfigError> {
        let mut api_key =
            HeaderValue::from_str(config.api_key()).map_err(|_| ConfigError::InvalidApiKey)?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: config.base_url().clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/<id>` with the id encoded as a single path segment
    fn task_url(&self, id: &str) -> Result<Url> {
        if id.is_empty() {
            return Err(Error::InvalidData("Task ID is missing".to_string()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidData("Base URL cannot take a task id".to_string()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    // Serialized here rather than with `RequestBuilder::json` so a payload
    // failure surfaces as `Encoding` instead of a reqwest builder error.
    fn json_body(&self, request: RequestBuilder, task: &Task) -> Result<RequestBuilder> {
        let body = serde_json::to_vec(&task.payload()).map_err(|e| Error::Encoding(e.to_string()))?;
        Ok(request.header(CONTENT_TYPE, "application/json").body(body))
    }

    /// Send and reject every non-2xx status
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Task service responded");

        if status.is_success() {
            Ok(response)
        } else {
            warn!(status = status.as_u16(), "Task service returned an error status");
            Err(Error::from_status(status.as_u16()))
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.bytes().await.map_err(transport_error)?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::NoData);
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl TaskService for HttpTaskClient {
    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        debug!(?filter, "GET {}", self.base_url);
        let request = self.client.get(self.base_url.clone()).query(filter);
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn create(&self, task: &Task) -> Result<Task> {
        debug!(title = %task.title, "POST {}", self.base_url);
        let request = self.json_body(self.client.post(self.base_url.clone()), task)?;
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn update(&self, task: &Task) -> Result<Task> {
        let url = self.task_url(task.require_id()?)?;
        debug!("PUT {}", url);
        let request = self.json_body(self.client.put(url), task)?;
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = self.task_url(id)?;
        debug!("DELETE {}", url);
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

/// Map a failure from reqwest to the service taxonomy
fn transport_error(err: reqwest::Error) -> Error {
    if err.is_redirect() {
        Error::InvalidResponse
    } else if err.is_decode() {
        Error::Decoding(error_chain(&err))
    } else if err.is_builder() {
        Error::InvalidData(error_chain(&err))
    } else {
        Error::Network(error_chain(&err))
    }
}

/// The error message followed by its sources, so "connection refused"
/// survives reqwest's generic top-level message
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> HttpTaskClient {
        HttpTaskClient::new(ClientConfig::new(base, "key").unwrap()).unwrap()
    }

    #[test]
    fn test_task_url() {
        let client = client("http://localhost:3000/tasks");
        assert_eq!(
            client.task_url("65f0").unwrap().as_str(),
            "http://localhost:3000/tasks/65f0"
        );
    }

    #[test]
    fn test_task_url_with_trailing_slash() {
        let client = client("http://localhost:3000/api/tasks/");
        assert_eq!(
            client.task_url("1").unwrap().as_str(),
            "http://localhost:3000/api/tasks/1"
        );
    }

    #[test]
    fn test_task_url_encodes_id() {
        let client = client("http://localhost:3000/tasks");
        assert_eq!(
            client.task_url("a/b c").unwrap().as_str(),
            "http://localhost:3000/tasks/a%2Fb%20c"
        );
    }

    #[test]
    fn test_task_url_rejects_empty_id() {
        let client = client("http://localhost:3000/tasks");
        assert_eq!(
            client.task_url(""),
            Err(Error::InvalidData("Task ID is missing".to_string()))
        );
    }

    #[test]
    fn test_rejects_api_key_with_newline() {
        let config = ClientConfig::new("http://localhost:3000/tasks", "bad\nkey").unwrap();
        assert!(matches!(
            HttpTaskClient::new(config),
            Err(ConfigError::InvalidApiKey)
        ));
    }
}
