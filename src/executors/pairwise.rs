//! Two-page tools: impact analysis and test-strategy generation.
//!
//! Both only run when exactly two pages are selected. With more pages the
//! old/new (or code/test-input) roles would be ambiguous, so neither fires.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use super::format::fenced;
use crate::assistant::{AssistantApi, ImpactAnalysisResponse};
use crate::error::AssistantResult;
use crate::planner::{triggers_impact_analysis, triggers_test_strategy};

/// Risk tier reported by the impact analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Parse the reported tier, deriving it from the score when the label is unusable.
    pub fn resolve(label: &str, score: f64) -> Self {
        match label.trim().to_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            _ => RiskLevel::from_score(score),
        }
    }

    pub fn from_score(score: f64) -> Self {
        if score >= 7.0 {
            RiskLevel::High
        } else if score >= 4.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        f.write_str(s)
    }
}

/// Comparison of two pages treated as old and new versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    pub old_page: String,
    pub new_page: String,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub files_changed: u64,
    pub percentage_change: f64,
    pub risk_level: RiskLevel,
    /// Clamped to 0..=10.
    pub risk_score: f64,
    pub diff: String,
    pub summary: String,
}

impl ImpactResult {
    pub fn from_response(old_page: &str, new_page: &str, response: ImpactAnalysisResponse) -> Self {
        let risk_score = if response.risk_score.is_finite() {
            response.risk_score.clamp(0.0, 10.0)
        } else {
            0.0
        };
        Self {
            old_page: old_page.to_string(),
            new_page: new_page.to_string(),
            lines_added: response.lines_added,
            lines_removed: response.lines_removed,
            files_changed: response.files_changed,
            percentage_change: response.percentage_change,
            risk_level: RiskLevel::resolve(&response.risk_level, risk_score),
            risk_score,
            diff: response.diff,
            summary: response.impact_analysis,
        }
    }

    /// Markdown report: metrics table, risk, summary and the diff.
    pub fn render(&self) -> String {
        let mut out = format!(
            "**Comparing** `{}` → `{}`\n\n\
             | Metric | Value |\n|---|---|\n\
             | Lines added | {} |\n| Lines removed | {} |\n\
             | Files changed | {} |\n| Change | {:.1}% |\n\n\
             **Risk:** {} ({:.1}/10)",
            self.old_page,
            self.new_page,
            self.lines_added,
            self.lines_removed,
            self.files_changed,
            self.percentage_change,
            self.risk_level,
            self.risk_score,
        );
        if !self.summary.trim().is_empty() {
            out.push_str("\n\n#### Impact Summary\n\n");
            out.push_str(self.summary.trim());
        }
        if !self.diff.trim().is_empty() {
            out.push_str("\n\n#### Diff\n\n");
            out.push_str(&fenced(&self.diff, "diff"));
        }
        out
    }
}

/// Markdown test strategy for a code page given a test-input page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStrategyResult {
    pub code_page: String,
    pub test_page: String,
    pub strategy: String,
}

impl TestStrategyResult {
    pub fn render(&self) -> String {
        format!(
            "**Code:** `{}` · **Test input:** `{}`\n\n{}",
            self.code_page,
            self.test_page,
            self.strategy.trim()
        )
    }
}

/// Instructions that switch on each pairwise tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseTriggers {
    pub impact: Option<String>,
    pub test_strategy: Option<String>,
}

impl PairwiseTriggers {
    /// Find the first instruction triggering each tool. Nothing fires
    /// unless exactly two pages are selected.
    pub fn detect(page_count: usize, instructions: &[String]) -> Self {
        if page_count != 2 {
            return Self::default();
        }
        Self {
            impact: instructions
                .iter()
                .find(|i| triggers_impact_analysis(i))
                .cloned(),
            test_strategy: instructions
                .iter()
                .find(|i| triggers_test_strategy(i))
                .cloned(),
        }
    }

    pub fn count(&self) -> usize {
        usize::from(self.impact.is_some()) + usize::from(self.test_strategy.is_some())
    }
}

pub async fn analyze_impact(
    api: &dyn AssistantApi,
    space: &str,
    old_page: &str,
    new_page: &str,
    question: &str,
) -> AssistantResult<ImpactResult> {
    let response = api.impact_analysis(space, old_page, new_page, question).await?;
    let result = ImpactResult::from_response(old_page, new_page, response);
    info!(
        old_page = %old_page,
        new_page = %new_page,
        risk = %result.risk_level,
        risk_score = result.risk_score,
        "Impact analysis complete"
    );
    Ok(result)
}

pub async fn generate_test_strategy(
    api: &dyn AssistantApi,
    space: &str,
    code_page: &str,
    test_page: &str,
    question: &str,
) -> AssistantResult<TestStrategyResult> {
    let strategy = api
        .test_strategy(space, code_page, test_page, question)
        .await?;
    info!(code_page = %code_page, test_page = %test_page, "Test strategy generated");
    Ok(TestStrategyResult {
        code_page: code_page.to_string(),
        test_page: test_page.to_string(),
        strategy,
    })
}
