//! Goal engine: validation, planning, execution and aggregation of one run.
//!
//! A run is strictly ordered: page types are resolved, the goal is split and
//! matched, each page's tool runs in page order, and only then do the
//! two-page analyzers run. Any collaborator failure aborts the run and
//! nothing is recorded.

mod aggregate;

pub use aggregate::*;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::assistant::AssistantApi;
use crate::error::{AppResult, ValidationError};
use crate::executors::{PairwiseTriggers, ToolExecutors};
use crate::history::{HistoryEntry, HistoryStore};
use crate::planner::{
    split_instructions, ClassifiedInstruction, Page, PageInstruction, PagePlan, ToolClassifier,
    MIN_INSTRUCTION_LEN,
};

/// A goal must be long enough to yield at least one instruction.
pub fn validate_goal(goal: &str) -> Result<(), ValidationError> {
    let goal = goal.trim();
    if goal.is_empty() {
        return Err(ValidationError::MissingGoal);
    }
    if goal.chars().count() <= MIN_INSTRUCTION_LEN {
        return Err(ValidationError::Field {
            field: "goal".to_string(),
            reason: format!("must be longer than {} characters", MIN_INSTRUCTION_LEN),
        });
    }
    Ok(())
}

/// Inputs for one goal run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    pub goal: String,
    pub space: String,
    /// Selected page titles, in selection order.
    pub pages: Vec<String>,
}

impl RunContext {
    pub fn new(goal: impl Into<String>, space: impl Into<String>, pages: Vec<String>) -> Self {
        Self {
            goal: goal.into(),
            space: space.into(),
            pages,
        }
    }

    /// Reject runs missing a goal, a space or a page selection.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_goal(&self.goal)?;
        if self.space.trim().is_empty() {
            return Err(ValidationError::MissingSpace);
        }
        if self.pages.is_empty() {
            return Err(ValidationError::NoPagesSelected);
        }
        if self.pages.iter().any(|page| page.trim().is_empty()) {
            return Err(ValidationError::Field {
                field: "pages".to_string(),
                reason: "page titles must not be blank".to_string(),
            });
        }
        Ok(())
    }
}

/// Routing decisions for a goal, computed without calling any tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub goal: String,
    pub instructions: Vec<ClassifiedInstruction>,
    pub assignments: Vec<PageInstruction>,
    /// Related sub-actions per assignment.
    pub actions: Vec<Vec<String>>,
    pub pairwise: PairwiseTriggers,
}

/// Decompose a goal against pages whose content types are already known.
pub fn plan_goal(goal: &str, pages: &[Page], classifier: &ToolClassifier) -> PlanReport {
    let instructions = split_instructions(goal);
    let plan = PagePlan::build(pages, &instructions, classifier);
    let actions = (0..plan.assignments.len())
        .map(|index| plan.related_actions(index))
        .collect();
    PlanReport {
        goal: goal.to_string(),
        pairwise: PairwiseTriggers::detect(pages.len(), &instructions),
        instructions: plan.instructions,
        assignments: plan.assignments,
        actions,
    }
}

/// Runs goals against the remote assistant.
#[derive(Clone)]
pub struct GoalEngine {
    api: Arc<dyn AssistantApi>,
    executors: ToolExecutors,
    classifier: ToolClassifier,
}

impl GoalEngine {
    pub fn new(api: Arc<dyn AssistantApi>) -> Self {
        Self {
            executors: ToolExecutors::new(Arc::clone(&api)),
            api,
            classifier: ToolClassifier::new(),
        }
    }

    pub fn classifier(&self) -> &ToolClassifier {
        &self.classifier
    }

    /// Look up each selected page's content type, in selection order.
    pub async fn resolve_pages(&self, ctx: &RunContext) -> AppResult<Vec<Page>> {
        let mut pages = Vec::with_capacity(ctx.pages.len());
        for title in &ctx.pages {
            let content_type = self.api.page_type(&ctx.space, title).await?;
            debug!(page = %title, content_type = %content_type, "Resolved page type");
            pages.push(Page::new(title.clone(), content_type));
        }
        Ok(pages)
    }

    /// Execute one goal end to end.
    pub async fn run(&self, ctx: &RunContext) -> AppResult<RunResult> {
        ctx.validate()?;
        let start = Instant::now();

        info!(
            space = %ctx.space,
            pages = ctx.pages.len(),
            goal_len = ctx.goal.len(),
            "Starting goal run"
        );

        match self.execute(ctx).await {
            Ok(result) => {
                info!(
                    tools = result.tools_triggered.len(),
                    pairwise = result.pairwise_count(),
                    latency_ms = start.elapsed().as_millis(),
                    "Goal run completed"
                );
                Ok(result)
            }
            Err(e) => {
                error!(
                    error = %e,
                    latency_ms = start.elapsed().as_millis(),
                    "Goal run failed"
                );
                Err(e)
            }
        }
    }

    /// Run a goal and, only if it succeeds, record it in `history`.
    pub async fn run_and_record(
        &self,
        ctx: &RunContext,
        history: &HistoryStore,
    ) -> AppResult<Arc<HistoryEntry>> {
        let result = self.run(ctx).await?;
        Ok(history.record(ctx, result))
    }

    async fn execute(&self, ctx: &RunContext) -> AppResult<RunResult> {
        let pages = self.resolve_pages(ctx).await?;
        let instructions = split_instructions(&ctx.goal);
        let plan = PagePlan::build(&pages, &instructions, &self.classifier);

        let mut aggregator = Aggregator::new(&ctx.goal, &ctx.space, &pages, &instructions);

        for (index, assignment) in plan.assignments.iter().enumerate() {
            let actions = plan.related_actions(index);
            let result = self
                .executors
                .execute(&ctx.space, assignment, &actions)
                .await?;
            aggregator.record_page(assignment, result);
        }

        let triggers = PairwiseTriggers::detect(pages.len(), &instructions);
        if let [first, second] = pages.as_slice() {
            if let Some(trigger) = &triggers.impact {
                let impact = self
                    .executors
                    .impact(&ctx.space, &first.title, &second.title, &ctx.goal)
                    .await?;
                aggregator.record_impact(trigger, impact);
            }
            if let Some(trigger) = &triggers.test_strategy {
                let strategy = self
                    .executors
                    .test_strategy(&ctx.space, &first.title, &second.title, &ctx.goal)
                    .await?;
                aggregator.record_test_strategy(trigger, strategy);
            }
        }

        Ok(aggregator.finish())
    }
}
