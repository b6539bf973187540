//! Remote assistant API: the collaborator every tool executor delegates to.
//!
//! [`AssistantApi`] is the seam the engine depends on; [`AssistantClient`]
//! is the HTTP+JSON implementation.

mod client;
mod types;

pub use client::*;
pub use types::*;

use async_trait::async_trait;

use crate::error::AssistantResult;
use crate::planner::ContentType;

/// Capabilities consumed by the goal engine.
///
/// Every method is a single request/response; any error is a hard failure
/// for the run that issued it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Look up the content type of a page. Unknown types resolve to text.
    async fn page_type(&self, space: &str, page: &str) -> AssistantResult<ContentType>;

    /// Answer `query` using only the given pages.
    async fn search(&self, space: &str, pages: &[String], query: &str) -> AssistantResult<String>;

    /// Run the code assistant. An empty instruction only fetches the original code.
    async fn code_assistant(
        &self,
        space: &str,
        page: &str,
        instruction: &str,
    ) -> AssistantResult<CodeAssistantResponse>;

    /// List image URLs embedded in a page.
    async fn images(&self, space: &str, page: &str) -> AssistantResult<Vec<String>>;

    /// Summarize one image.
    async fn image_summary(
        &self,
        space: &str,
        page: &str,
        image_url: &str,
    ) -> AssistantResult<String>;

    /// Summarize the video on a page.
    async fn video_summary(&self, space: &str, page: &str) -> AssistantResult<VideoSummaryResponse>;

    /// Compare two page versions.
    async fn impact_analysis(
        &self,
        space: &str,
        old_page: &str,
        new_page: &str,
        question: &str,
    ) -> AssistantResult<ImpactAnalysisResponse>;

    /// Produce a markdown test strategy for a code page given a test-input page.
    async fn test_strategy(
        &self,
        space: &str,
        code_page: &str,
        test_page: &str,
        question: &str,
    ) -> AssistantResult<String>;
}
