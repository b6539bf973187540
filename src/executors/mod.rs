//! Tool executors.
//!
//! One executor per per-page capability, plus the two-page analyzers in
//! [`pairwise`]. Each executor calls the remote assistant and normalizes the
//! reply into labeled [`Section`]s; [`render_sections`] turns those into the
//! display string.

mod code;
mod format;
mod image;
mod pairwise;
mod search;
mod video;

pub use code::*;
pub use format::*;
pub use image::*;
pub use pairwise::*;
pub use search::*;
pub use video::*;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::assistant::AssistantApi;
use crate::error::AssistantResult;
use crate::planner::{PageInstruction, ToolTag};

/// Shown when a tool produced no output at all.
pub const EMPTY_OUTPUT_MESSAGE: &str = "_No output was produced._";

/// Output of one page's tool run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub page: String,
    pub instruction: String,
    /// Tool the matcher assigned.
    pub tool: ToolTag,
    /// Tool that actually ran; differs when a two-page tool was assigned to one page.
    pub executed_with: ToolTag,
    /// Sub-actions sent to the code assistant, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_code: Option<String>,
    pub outputs: Vec<Section>,
    pub formatted: String,
}

impl ToolResult {
    fn new(assignment: &PageInstruction, executed_with: ToolTag, outputs: Vec<Section>) -> Self {
        let formatted = if outputs.is_empty() {
            EMPTY_OUTPUT_MESSAGE.to_string()
        } else {
            render_sections(&outputs)
        };
        Self {
            page: assignment.page.title.clone(),
            instruction: assignment.instruction.clone(),
            tool: assignment.tool,
            executed_with,
            actions: Vec::new(),
            original_code: None,
            outputs,
            formatted,
        }
    }
}

/// Tool that runs for an assigned tag. Two-page tools have no per-page
/// executor and fall back to search, as does anything unrecognised.
pub fn executor_for(tool: ToolTag) -> ToolTag {
    match tool {
        ToolTag::CodeAssistant | ToolTag::ImageInsights | ToolTag::VideoSummarizer => tool,
        ToolTag::AiPoweredSearch | ToolTag::ImpactAnalyzer | ToolTag::TestSupport => {
            ToolTag::AiPoweredSearch
        }
    }
}

/// Dispatches page instructions to the per-capability executors.
#[derive(Clone)]
pub struct ToolExecutors {
    api: Arc<dyn AssistantApi>,
}

impl ToolExecutors {
    pub fn new(api: Arc<dyn AssistantApi>) -> Self {
        Self { api }
    }

    /// Run the assigned tool for one page.
    ///
    /// `actions` are the related sub-actions; only the code assistant uses them.
    pub async fn execute(
        &self,
        space: &str,
        assignment: &PageInstruction,
        actions: &[String],
    ) -> AssistantResult<ToolResult> {
        let start = Instant::now();
        let page = assignment.page.title.as_str();
        let executed_with = executor_for(assignment.tool);
        let api = self.api.as_ref();

        let result = match executed_with {
            ToolTag::CodeAssistant => {
                let outcome = run_code_assistant(api, space, page, actions).await?;
                let mut result = ToolResult::new(assignment, executed_with, outcome.sections);
                result.actions = actions.to_vec();
                result.original_code = Some(outcome.original_code);
                result
            }
            ToolTag::ImageInsights => {
                let sections = run_image_insights(api, space, page).await?;
                ToolResult::new(assignment, executed_with, sections)
            }
            ToolTag::VideoSummarizer => {
                let sections = run_video_summary(api, space, page).await?;
                ToolResult::new(assignment, executed_with, sections)
            }
            _ => {
                let sections = run_search(api, space, page, &assignment.instruction).await?;
                ToolResult::new(assignment, executed_with, sections)
            }
        };

        info!(
            page = %page,
            tool = %assignment.tool,
            executed_with = %executed_with,
            sections = result.outputs.len(),
            latency_ms = start.elapsed().as_millis(),
            "Tool executed"
        );
        Ok(result)
    }

    pub async fn impact(
        &self,
        space: &str,
        old_page: &str,
        new_page: &str,
        question: &str,
    ) -> AssistantResult<ImpactResult> {
        analyze_impact(self.api.as_ref(), space, old_page, new_page, question).await
    }

    pub async fn test_strategy(
        &self,
        space: &str,
        code_page: &str,
        test_page: &str,
        question: &str,
    ) -> AssistantResult<TestStrategyResult> {
        generate_test_strategy(self.api.as_ref(), space, code_page, test_page, question).await
    }
}
