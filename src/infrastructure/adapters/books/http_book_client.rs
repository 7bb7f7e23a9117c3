//! HTTP Book Client - 调用生成服务 HTTP 接口
//!
//! 实现 BookApiPort trait
//!
//! 生成服务 API:
//! POST {base}/books/generate           Request: BookRequest (JSON)  Response: GenerationStatus
//! GET  {base}/books/generate/{job_id}  Response: GenerationStatus（complete 时带 result）
//! 错误响应: {"detail": "..."}

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{ApiError, BookApiPort, CredentialsPort};
use crate::domain::book::GenerationRequest;
use crate::domain::job::{GenerationStatus, JobId};

/// 401 且服务端未给出原因时的提示
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// HTTP 客户端配置
#[derive(Debug, Clone)]
pub struct HttpBookClientConfig {
    /// API 基础 URL（含 /api/v1 前缀）
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpBookClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpBookClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 生成服务客户端
///
/// 每个请求自动附带 bearer token；401 时强制登出
pub struct HttpBookClient {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialsPort>,
}

impl HttpBookClient {
    pub fn new(
        config: HttpBookClientConfig,
        credentials: Arc<dyn CredentialsPort>,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ApiError::NetworkError(format!("Invalid base URL {}: {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::NetworkError(format!(
                "Invalid base URL {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// 在基础路径后追加路径段（自动转义）
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn generate_url(&self) -> Url {
        self.endpoint(&["books", "generate"])
    }

    fn status_url(&self, job_id: &JobId) -> Url {
        self.endpoint(&["books", "generate", job_id.as_str()])
    }

    /// 健康检查挂在服务根路径
    fn health_url(&self) -> Url {
        self.base_url
            .join("/health")
            .unwrap_or_else(|_| self.base_url.clone())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request = match self.credentials.bearer_token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = extract_detail(&body);

            if status == StatusCode::UNAUTHORIZED {
                tracing::warn!("Generation service rejected credentials, signing out");
                self.credentials.sign_out();
                return Err(ApiError::Unauthorized(
                    detail.unwrap_or_else(|| SESSION_EXPIRED_MESSAGE.to_string()),
                ));
            }

            let message = detail
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
            return Err(ApiError::service(status.as_u16(), message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to decode response: {}", e)))
    }
}

#[async_trait]
impl BookApiPort for HttpBookClient {
    async fn submit_job(&self, request: &GenerationRequest) -> Result<GenerationStatus, ApiError> {
        let url = self.generate_url();
        tracing::debug!(
            url = %url,
            title = %request.title,
            page_count = request.page_count,
            "Sending generation request"
        );

        let status: GenerationStatus = self.send(self.client.post(url).json(request)).await?;

        tracing::info!(job_id = %status.job_id, status = %status.status, "Generation request accepted");
        Ok(status)
    }

    async fn job_status(&self, job_id: &JobId) -> Result<GenerationStatus, ApiError> {
        let url = self.status_url(job_id);
        tracing::trace!(url = %url, "Fetching job status");
        self.send(self.client.get(url)).await
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else if e.is_connect() {
        ApiError::NetworkError(format!("Cannot connect to generation service: {}", e))
    } else {
        ApiError::NetworkError(e.to_string())
    }
}

/// 解析 `{"detail": ...}`；detail 可能是字符串，也可能是校验错误列表
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail")?;

    let message = match detail {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    };

    (!message.is_empty()).then_some(message)
}
