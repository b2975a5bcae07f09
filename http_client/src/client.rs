use async_trait::async_trait;
use flowsync_defs::{resource_id, DeleteOutcome, OrchestratorApi, ResourceKind, SyncError, UpdateStyle};
use flowsync_utils::{Credentials, ServerConfig};
use log::debug;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::{json, Value};

/// Largest page the filter endpoints hand out.
pub const PAGE_SIZE: usize = 200;

pub struct OrchestratorClient {
    http: reqwest::Client,
    base: Url,
    credentials: Credentials,
}

impl OrchestratorClient {
    pub fn new(config: &ServerConfig) -> Result<Self, SyncError> {
        let base = Url::parse(&config.api_url).map_err(|e| {
            SyncError::Config(format!("Invalid API URL '{}': {}", config.api_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(SyncError::Config(format!(
                "Invalid API URL '{}'",
                config.api_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base,
            credentials: config.credentials.clone(),
        })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        let request = self.http.request(method, url.clone());
        let request = match &self.credentials {
            Credentials::Bearer { token } => request.bearer_auth(token),
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        };
        request.header("Content-Type", "application/json")
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response, SyncError> {
        request.send().await.map_err(|e| SyncError::Transport {
            url: url.to_string(),
            status: None,
            message: e.to_string(),
        })
    }

    async fn post_json(&self, url: &Url, body: &Value) -> Result<Value, SyncError> {
        debug!(
            "POST {} with payload: {}",
            url,
            serde_json::to_string_pretty(body).unwrap_or_default()
        );
        let response = self
            .send(self.request(Method::POST, url).json(body), url)
            .await?;
        handle_response(response, url).await
    }
}

async fn handle_response(response: Response, url: &Url) -> Result<Value, SyncError> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status == StatusCode::UNPROCESSABLE_ENTITY {
        return Err(SyncError::Validation {
            url: url.to_string(),
            body,
        });
    }
    if !status.is_success() {
        return Err(SyncError::Transport {
            url: url.to_string(),
            status: Some(status.as_u16()),
            message: body,
        });
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| SyncError::Transport {
        url: url.to_string(),
        status: Some(status.as_u16()),
        message: format!("Failed to parse JSON response: {}", e),
    })
}

#[async_trait]
impl OrchestratorApi for OrchestratorClient {
    async fn list(&self, kind: ResourceKind) -> Result<Vec<Value>, SyncError> {
        let url = self.endpoint(&[kind.collection(), "filter"]);
        let mut resources = vec![];
        let mut offset = 0;

        loop {
            let page = self
                .post_json(&url, &json!({ "limit": PAGE_SIZE, "offset": offset }))
                .await?;
            let items = match page {
                Value::Array(items) => items,
                other => {
                    return Err(SyncError::Transport {
                        url: url.to_string(),
                        status: None,
                        message: format!("Expected a list of {}s, got: {}", kind, other),
                    })
                }
            };
            let count = items.len();
            resources.extend(items);
            if count < PAGE_SIZE {
                break;
            }
            offset += count;
        }

        debug!("Retrieved {} {}s from the server", resources.len(), kind);
        Ok(resources)
    }

    async fn read_flow_by_name(&self, name: &str) -> Result<Option<Value>, SyncError> {
        let url = self.endpoint(&["flows", "name", name]);
        let response = self.send(self.request(Method::GET, &url), &url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        handle_response(response, &url).await.map(Some)
    }

    async fn read_flow_by_id(&self, id: &str) -> Result<Value, SyncError> {
        let url = self.endpoint(&["flows", id]);
        let response = self.send(self.request(Method::GET, &url), &url).await?;
        handle_response(response, &url).await
    }

    async fn create_flow(&self, name: &str) -> Result<String, SyncError> {
        let url = self.endpoint(&["flows", ""]);
        let flow = self.post_json(&url, &json!({ "name": name })).await?;
        resource_id(&flow).ok_or_else(|| SyncError::Transport {
            url: url.to_string(),
            status: None,
            message: format!("Response for flow '{}' has no id: {}", name, flow),
        })
    }

    async fn create(&self, kind: ResourceKind, body: &Value) -> Result<Value, SyncError> {
        let url = self.endpoint(&[kind.collection(), ""]);
        self.post_json(&url, body).await
    }

    async fn update(&self, kind: ResourceKind, id: &str, body: &Value) -> Result<(), SyncError> {
        match kind.update_style() {
            UpdateStyle::Upsert => {
                let url = self.endpoint(&[kind.collection(), ""]);
                self.post_json(&url, body).await?;
            }
            UpdateStyle::ReplaceById => {
                let url = self.endpoint(&[kind.collection(), id]);
                debug!(
                    "PUT {} with payload: {}",
                    url,
                    serde_json::to_string_pretty(body).unwrap_or_default()
                );
                let response = self
                    .send(self.request(Method::PUT, &url).json(body), &url)
                    .await?;
                handle_response(response, &url).await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<DeleteOutcome, SyncError> {
        let url = self.endpoint(&[kind.collection(), id]);
        let response = self.send(self.request(Method::DELETE, &url), &url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(DeleteOutcome::AlreadyGone);
        }
        handle_response(response, &url).await?;
        Ok(DeleteOutcome::Deleted)
    }
}
