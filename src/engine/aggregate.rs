//! Result aggregation: run metadata, reasoning narrative and display tabs.

use serde::{Deserialize, Serialize};

use crate::executors::{fenced, ImpactResult, TestStrategyResult, ToolResult};
use crate::planner::{Page, PageInstruction, ToolTag};

/// Everything one goal run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub goal: String,
    pub space: String,
    pub pages: Vec<Page>,
    pub instructions: Vec<String>,
    /// One per page, in page order.
    pub results: Vec<ToolResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<ImpactResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_strategy: Option<TestStrategyResult>,
    /// One entry per page result or pairwise call, in execution order.
    pub tools_triggered: Vec<String>,
    pub why_used: Vec<String>,
    pub how_derived: Vec<String>,
    pub reasoning: String,
}

impl RunResult {
    /// Distinct tools in first-use order.
    pub fn tools_used(&self) -> Vec<&str> {
        let mut tools: Vec<&str> = Vec::new();
        for tool in &self.tools_triggered {
            if !tools.contains(&tool.as_str()) {
                tools.push(tool.as_str());
            }
        }
        tools
    }

    pub fn pairwise_count(&self) -> usize {
        usize::from(self.impact.is_some()) + usize::from(self.test_strategy.is_some())
    }

    /// Reasoning tab, then one tab per page, then the pairwise tabs.
    pub fn tabs(&self) -> Vec<ResultTab> {
        let mut tabs = vec![ResultTab::new("reasoning", "Reasoning", self.reasoning.clone())];

        for (index, result) in self.results.iter().enumerate() {
            tabs.push(ResultTab::new(
                format!("page-{}", index + 1),
                format!("{} · {}", result.page, result.executed_with.display_name()),
                page_tab_content(result),
            ));
        }
        if let Some(impact) = &self.impact {
            tabs.push(ResultTab::new("impact", "Impact Analysis", impact.render()));
        }
        if let Some(strategy) = &self.test_strategy {
            tabs.push(ResultTab::new("test-strategy", "Test Strategy", strategy.render()));
        }
        tabs
    }
}

/// One display tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTab {
    pub id: String,
    pub title: String,
    pub content: String,
}

impl ResultTab {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}

fn page_tab_content(result: &ToolResult) -> String {
    let mut content = format!("**Instruction:** {}\n\n{}", result.instruction, result.formatted);
    if let Some(original) = result.original_code.as_deref().filter(|c| !c.trim().is_empty()) {
        content.push_str("\n\n#### Original Code\n\n");
        content.push_str(&fenced(original, ""));
    }
    content
}

/// Collects per-page and pairwise outputs in a fixed order.
#[derive(Debug)]
pub struct Aggregator {
    goal: String,
    space: String,
    pages: Vec<Page>,
    instructions: Vec<String>,
    results: Vec<ToolResult>,
    impact: Option<ImpactResult>,
    test_strategy: Option<TestStrategyResult>,
    tools_triggered: Vec<String>,
    why_used: Vec<String>,
    how_derived: Vec<String>,
}

impl Aggregator {
    pub fn new(goal: &str, space: &str, pages: &[Page], instructions: &[String]) -> Self {
        Self {
            goal: goal.to_string(),
            space: space.to_string(),
            pages: pages.to_vec(),
            instructions: instructions.to_vec(),
            results: Vec::new(),
            impact: None,
            test_strategy: None,
            tools_triggered: Vec::new(),
            why_used: Vec::new(),
            how_derived: Vec::new(),
        }
    }

    pub fn record_page(&mut self, assignment: &PageInstruction, result: ToolResult) {
        let tool = result.executed_with;
        self.tools_triggered.push(tool.to_string());

        let mut why = format!(
            "{} for \"{}\" ({} page): {}",
            tool,
            assignment.page.title,
            assignment.page.content_type,
            tool.purpose()
        );
        if assignment.tool != tool {
            why.push_str(&format!(
                " (assigned {}, which needs two pages, so search ran instead)",
                assignment.tool
            ));
        }
        self.why_used.push(why);

        let mut how = format!(
            "\"{}\" -> \"{}\": {}",
            assignment.instruction,
            assignment.page.title,
            assignment.pass.describe()
        );
        if result.actions.len() > 1 {
            how.push_str(&format!("; related actions: {}", result.actions.join(" | ")));
        }
        self.how_derived.push(how);

        self.results.push(result);
    }

    pub fn record_impact(&mut self, trigger: &str, impact: ImpactResult) {
        self.tools_triggered.push(ToolTag::ImpactAnalyzer.to_string());
        self.why_used.push(format!(
            "{} compared \"{}\" (old) with \"{}\" (new): {}",
            ToolTag::ImpactAnalyzer,
            impact.old_page,
            impact.new_page,
            ToolTag::ImpactAnalyzer.purpose()
        ));
        self.how_derived.push(format!(
            "\"{}\" asked for a comparison with exactly two pages selected",
            trigger
        ));
        self.impact = Some(impact);
    }

    pub fn record_test_strategy(&mut self, trigger: &str, strategy: TestStrategyResult) {
        self.tools_triggered.push(ToolTag::TestSupport.to_string());
        self.why_used.push(format!(
            "{} used \"{}\" as code and \"{}\" as test input: {}",
            ToolTag::TestSupport,
            strategy.code_page,
            strategy.test_page,
            ToolTag::TestSupport.purpose()
        ));
        self.how_derived.push(format!(
            "\"{}\" asked for tests with exactly two pages selected",
            trigger
        ));
        self.test_strategy = Some(strategy);
    }

    pub fn finish(self) -> RunResult {
        let mut result = RunResult {
            goal: self.goal,
            space: self.space,
            pages: self.pages,
            instructions: self.instructions,
            results: self.results,
            impact: self.impact,
            test_strategy: self.test_strategy,
            tools_triggered: self.tools_triggered,
            why_used: self.why_used,
            how_derived: self.how_derived,
            reasoning: String::new(),
        };
        result.reasoning = reasoning_narrative(&result);
        result
    }
}

/// Markdown narrative: goal, pages, tools, numbered why/how, counts.
pub fn reasoning_narrative(result: &RunResult) -> String {
    let pages = result
        .pages
        .iter()
        .map(|page| format!("- **{}** ({})", page.title, page.content_type))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "## Goal\n\n{}\n\n## Pages\n\n{}\n\n## Tools Used\n\n{}\n\n\
         ## Why These Tools\n\n{}\n\n## How Instructions Were Derived\n\n{}\n\n\
         ## Processing\n\n- Instructions derived: {}\n- Pages processed: {}\n- Pairwise analyses: {}",
        result.goal.trim(),
        pages,
        result.tools_used().join(", "),
        numbered(&result.why_used),
        numbered(&result.how_derived),
        result.instructions.len(),
        result.results.len(),
        result.pairwise_count(),
    )
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}
