use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::types::{
    CodeAssistantRequest, CodeAssistantResponse, ImageSummaryRequest, ImageSummaryResponse,
    ImagesResponse, ImpactAnalysisRequest, ImpactAnalysisResponse, PageRequest, PageTypeResponse,
    SearchRequest, SearchResponse, TestSupportRequest, TestSupportResponse, VideoSummaryResponse,
};
use super::AssistantApi;
use crate::config::{AssistantConfig, RequestConfig};
use crate::error::{AssistantError, AssistantResult};
use crate::planner::ContentType;

/// HTTP client for the remote assistant API
#[derive(Clone)]
pub struct AssistantClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    request_config: RequestConfig,
}

impl AssistantClient {
    /// Create a new assistant client
    pub fn new(config: &AssistantConfig, request_config: RequestConfig) -> AssistantResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(AssistantError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            request_config,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body to an endpoint and decode the JSON reply.
    ///
    /// Failures are returned as-is; a failed call aborts the whole run so
    /// nothing here retries.
    async fn post<B, R>(&self, endpoint: &str, body: &B) -> AssistantResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/api/{}", self.base_url, endpoint);
        let start = Instant::now();

        debug!(endpoint = %endpoint, "Calling assistant API");

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(|e| {
            error!(endpoint = %endpoint, error = %e, "Assistant API request failed");
            if e.is_timeout() {
                AssistantError::Timeout {
                    timeout_ms: self.request_config.timeout_ms,
                }
            } else {
                AssistantError::Http(e)
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(
                endpoint = %endpoint,
                status = status.as_u16(),
                latency_ms = start.elapsed().as_millis(),
                "Assistant API returned an error status"
            );
            return Err(AssistantError::Api {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message: error_body,
            });
        }

        let parsed: R = response
            .json()
            .await
            .map_err(|e| AssistantError::InvalidResponse {
                endpoint: endpoint.to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        info!(
            endpoint = %endpoint,
            latency_ms = start.elapsed().as_millis(),
            "Assistant API call succeeded"
        );

        Ok(parsed)
    }
}

#[async_trait]
impl AssistantApi for AssistantClient {
    async fn page_type(&self, space: &str, page: &str) -> AssistantResult<ContentType> {
        let response: PageTypeResponse = self
            .post(
                "page-type",
                &PageRequest {
                    space_key: space,
                    page_title: page,
                },
            )
            .await?;
        Ok(response
            .content_type
            .as_deref()
            .map(ContentType::from_label)
            .unwrap_or_default())
    }

    async fn search(&self, space: &str, pages: &[String], query: &str) -> AssistantResult<String> {
        let response: SearchResponse = self
            .post(
                "search",
                &SearchRequest {
                    space_key: space,
                    page_titles: pages,
                    query,
                },
            )
            .await?;
        Ok(response.response)
    }

    async fn code_assistant(
        &self,
        space: &str,
        page: &str,
        instruction: &str,
    ) -> AssistantResult<CodeAssistantResponse> {
        self.post(
            "code-assistant",
            &CodeAssistantRequest {
                space_key: space,
                page_title: page,
                instruction,
            },
        )
        .await
    }

    async fn images(&self, space: &str, page: &str) -> AssistantResult<Vec<String>> {
        let response: ImagesResponse = self
            .post(
                "images",
                &PageRequest {
                    space_key: space,
                    page_title: page,
                },
            )
            .await?;
        Ok(response.images)
    }

    async fn image_summary(
        &self,
        space: &str,
        page: &str,
        image_url: &str,
    ) -> AssistantResult<String> {
        let response: ImageSummaryResponse = self
            .post(
                "image-summary",
                &ImageSummaryRequest {
                    space_key: space,
                    page_title: page,
                    image_url,
                },
            )
            .await?;
        Ok(response.summary)
    }

    async fn video_summary(&self, space: &str, page: &str) -> AssistantResult<VideoSummaryResponse> {
        self.post(
            "video-summarizer",
            &PageRequest {
                space_key: space,
                page_title: page,
            },
        )
        .await
    }

    async fn impact_analysis(
        &self,
        space: &str,
        old_page: &str,
        new_page: &str,
        question: &str,
    ) -> AssistantResult<ImpactAnalysisResponse> {
        self.post(
            "impact-analyzer",
            &ImpactAnalysisRequest {
                space_key: space,
                old_page_title: old_page,
                new_page_title: new_page,
                question,
            },
        )
        .await
    }

    async fn test_strategy(
        &self,
        space: &str,
        code_page: &str,
        test_page: &str,
        question: &str,
    ) -> AssistantResult<String> {
        let response: TestSupportResponse = self
            .post(
                "test-support",
                &TestSupportRequest {
                    space_key: space,
                    code_page_title: code_page,
                    test_input_page_title: test_page,
                    question,
                },
            )
            .await?;
        Ok(response.test_strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = AssistantConfig {
            base_url: "http://localhost:8000/".to_string(),
            api_key: Some("test_key".to_string()),
        };

        let client = AssistantClient::new(&config, RequestConfig::default());
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url(), "http://localhost:8000");
    }
}
