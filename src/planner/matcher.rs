use serde::{Deserialize, Serialize};
use tracing::debug;

use super::classifier::{resolve_by_content_type, resolve_with_override};
use super::{
    split_actions, ClassifiedInstruction, MatchPass, Page, PageInstruction, ToolClassifier,
    ToolTag,
};

/// Instruction used when a goal produced no instructions at all.
pub const DEFAULT_INSTRUCTION: &str = "Analyze this content";

/// Outcome of matching: one assignment per page plus leftover instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePlan {
    /// Classified instructions in goal order.
    pub instructions: Vec<ClassifiedInstruction>,
    /// Exactly one entry per page, in page order.
    pub assignments: Vec<PageInstruction>,
    /// Indices into `instructions` no page consumed.
    pub unused: Vec<usize>,
}

impl PagePlan {
    /// Classify `instructions` and match them to `pages`.
    pub fn build(pages: &[Page], instructions: &[String], classifier: &ToolClassifier) -> Self {
        let classified: Vec<ClassifiedInstruction> = instructions
            .iter()
            .map(|text| classifier.classify_instruction(text))
            .collect();
        match_pages(pages, classified)
    }

    /// Sub-actions the code assistant should run for the assignment at `index`.
    ///
    /// The assigned instruction is split into related actions. Leftover
    /// instructions that classify as code work are appended to the first
    /// code-assistant assignment only, so no action runs twice.
    pub fn related_actions(&self, index: usize) -> Vec<String> {
        let Some(assignment) = self.assignments.get(index) else {
            return Vec::new();
        };

        let mut actions = split_actions(&assignment.instruction);
        if assignment.tool != ToolTag::CodeAssistant {
            return actions;
        }

        let first_code = self
            .assignments
            .iter()
            .position(|a| a.tool == ToolTag::CodeAssistant);
        if first_code == Some(index) {
            for &unused in &self.unused {
                let leftover = &self.instructions[unused];
                if leftover.primary() == ToolTag::CodeAssistant {
                    actions.extend(split_actions(&leftover.text));
                }
            }
        }
        actions
    }
}

/// Assign exactly one instruction and tool to every page.
///
/// - Pass 1: an unused instruction that names the page (plain, underscore- or
///   hyphen-joined title); tool by content-type preference.
/// - Pass 2: the first unused instruction; keyword override, then preference.
/// - Pass 3: nothing unused is left, so reuse the first instruction (or
///   [`DEFAULT_INSTRUCTION`]) with search.
///
/// Each pass sees only instructions no earlier pass or page consumed.
pub fn match_pages(pages: &[Page], instructions: Vec<ClassifiedInstruction>) -> PagePlan {
    let mut used = vec![false; instructions.len()];

    let explicit: Vec<Option<PageInstruction>> = pages
        .iter()
        .map(|page| {
            let index = find_mention(page, &instructions, &used)?;
            used[index] = true;
            let instruction = &instructions[index];
            Some(assign(
                page,
                &instruction.text,
                resolve_by_content_type(page.content_type, instruction),
                MatchPass::ExplicitMention,
            ))
        })
        .collect();

    let assignments: Vec<PageInstruction> = explicit
        .into_iter()
        .zip(pages)
        .map(|(matched, page)| match matched {
            Some(assignment) => assignment,
            None => fallback(page, &instructions, &mut used),
        })
        .collect();

    for assignment in &assignments {
        debug!(
            page = %assignment.page.title,
            tool = %assignment.tool,
            pass = ?assignment.pass,
            instruction = %assignment.instruction,
            "Page matched"
        );
    }

    let unused = used
        .iter()
        .enumerate()
        .filter(|(_, used)| !**used)
        .map(|(index, _)| index)
        .collect();

    PagePlan {
        instructions,
        assignments,
        unused,
    }
}

fn fallback(page: &Page, instructions: &[ClassifiedInstruction], used: &mut [bool]) -> PageInstruction {
    if let Some(index) = used.iter().position(|u| !u) {
        used[index] = true;
        let instruction = &instructions[index];
        return assign(
            page,
            &instruction.text,
            resolve_with_override(page.content_type, instruction),
            MatchPass::ContentType,
        );
    }

    match instructions.first() {
        Some(first) => assign(page, &first.text, ToolTag::AiPoweredSearch, MatchPass::Reused),
        None => assign(
            page,
            DEFAULT_INSTRUCTION,
            ToolTag::AiPoweredSearch,
            MatchPass::Synthetic,
        ),
    }
}

fn find_mention(page: &Page, instructions: &[ClassifiedInstruction], used: &[bool]) -> Option<usize> {
    let variants = title_variants(&page.title);
    if variants.is_empty() {
        return None;
    }
    instructions.iter().enumerate().find_map(|(index, instruction)| {
        if used[index] {
            return None;
        }
        let text = instruction.text.to_lowercase();
        variants
            .iter()
            .any(|variant| text.contains(variant.as_str()))
            .then_some(index)
    })
}

/// Lowercase title plus its underscore- and hyphen-joined forms.
fn title_variants(title: &str) -> Vec<String> {
    let lower = title.trim().to_lowercase();
    if lower.is_empty() {
        return Vec::new();
    }
    let words: Vec<&str> = lower.split_whitespace().collect();
    let mut variants = vec![lower.clone()];
    for joined in [words.join("_"), words.join("-")] {
        if !variants.contains(&joined) {
            variants.push(joined);
        }
    }
    variants
}

fn assign(page: &Page, instruction: &str, tool: ToolTag, pass: MatchPass) -> PageInstruction {
    PageInstruction {
        page: page.clone(),
        instruction: instruction.to_string(),
        tool,
        pass,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{split_instructions, ContentType};

    fn plan(pages: &[Page], goal: &str) -> PagePlan {
        PagePlan::build(pages, &split_instructions(goal), &ToolClassifier::new())
    }

    fn plan_for_text(goal: &str) -> PagePlan {
        plan(&[Page::new("Notes", ContentType::Text)], goal)
    }

    #[test]
    fn test_single_text_page_search() {
        let pages = vec![Page::new("Intro", ContentType::Text)];
        let plan = plan(&pages, "summarize this");

        assert_eq!(plan.assignments.len(), 1);
        let a = &plan.assignments[0];
        assert_eq!(a.instruction, "summarize this");
        assert_eq!(a.tool, ToolTag::AiPoweredSearch);
        assert_eq!(a.pass, MatchPass::ContentType);
        assert!(plan.unused.is_empty());
    }

    #[test]
    fn test_explicit_mention_wins_over_page_order() {
        let pages = vec![
            Page::new("Report", ContentType::Text),
            Page::new("Diagram", ContentType::Image),
        ];
        let plan = plan(&pages, "summarize the Diagram image");

        let diagram = &plan.assignments[1];
        assert_eq!(diagram.instruction, "summarize the Diagram image");
        assert_eq!(diagram.tool, ToolTag::ImageInsights);
        assert_eq!(diagram.pass, MatchPass::ExplicitMention);

        let report = &plan.assignments[0];
        assert_eq!(report.pass, MatchPass::Reused);
        assert_eq!(report.tool, ToolTag::AiPoweredSearch);
        assert_eq!(report.instruction, "summarize the Diagram image");
    }

    #[test]
    fn test_explicit_mention_on_text_page_keeps_specialised_tool() {
        let pages = vec![
            Page::new("Report", ContentType::Text),
            Page::new("Diagram", ContentType::Text),
        ];
        let plan = plan(&pages, "look at the Diagram image");
        assert_eq!(plan.assignments[1].tool, ToolTag::ImageInsights);
    }

    #[test]
    fn test_text_page_prefers_search_when_offered() {
        let pages = vec![Page::new("Intro", ContentType::Text)];
        let plan = plan(&pages, "explain the error handling in Intro");

        let a = &plan.assignments[0];
        assert_eq!(a.pass, MatchPass::ExplicitMention);
        assert_eq!(a.tool, ToolTag::AiPoweredSearch);

        let plan = plan_for_text("summarize the Diagram image");
        assert_eq!(plan.assignments[0].tool, ToolTag::AiPoweredSearch);
        assert_eq!(plan.assignments[0].pass, MatchPass::ContentType);
    }

    #[test]
    fn test_title_variants_match() {
        let pages = vec![
            Page::new("Intro Page", ContentType::Text),
            Page::new("Release Notes", ContentType::Text),
        ];
        let plan = plan(&pages, "describe release-notes, explain intro_page");
        assert_eq!(plan.assignments[0].instruction, "explain intro_page");
        assert_eq!(plan.assignments[0].pass, MatchPass::ExplicitMention);
        assert_eq!(plan.assignments[1].instruction, "describe release-notes");
        assert_eq!(plan.assignments[1].pass, MatchPass::ExplicitMention);
    }

    #[test]
    fn test_content_type_preference_in_fallback() {
        let pages = vec![
            Page::new("talk.mp4", ContentType::Video),
            Page::new("utils.py", ContentType::Code),
        ];
        let plan = plan(&pages, "summarize this video and refactor that code");
        assert_eq!(plan.assignments[0].tool, ToolTag::VideoSummarizer);
        assert_eq!(plan.assignments[0].instruction, "summarize this video");
        assert_eq!(plan.assignments[1].tool, ToolTag::CodeAssistant);
        assert_eq!(plan.assignments[1].instruction, "refactor that code");
    }

    #[test]
    fn test_image_page_keyword_override() {
        let pages = vec![Page::new("Architecture", ContentType::Image)];
        // "fix" would otherwise compete with the diagram keyword
        let plan = plan(&pages, "fix the diagram layout");
        assert_eq!(plan.assignments[0].tool, ToolTag::ImageInsights);
    }

    #[test]
    fn test_fallback_keeps_instruction_tool_when_type_not_offered() {
        let pages = vec![
            Page::new("v1", ContentType::Text),
            Page::new("v2", ContentType::Text),
        ];
        let plan = plan(&pages, "show the difference");
        assert_eq!(plan.assignments[0].tool, ToolTag::ImpactAnalyzer);
        assert_eq!(plan.assignments[0].pass, MatchPass::ContentType);
        assert_eq!(plan.assignments[1].tool, ToolTag::AiPoweredSearch);
        assert_eq!(plan.assignments[1].pass, MatchPass::Reused);
    }

    #[test]
    fn test_every_page_assigned_without_instructions() {
        let pages = vec![
            Page::new("A", ContentType::Text),
            Page::new("B", ContentType::Code),
        ];
        let plan = match_pages(&pages, Vec::new());
        assert_eq!(plan.assignments.len(), 2);
        for a in &plan.assignments {
            assert_eq!(a.instruction, DEFAULT_INSTRUCTION);
            assert_eq!(a.tool, ToolTag::AiPoweredSearch);
            assert_eq!(a.pass, MatchPass::Synthetic);
        }
    }

    #[test]
    fn test_one_assignment_per_page_for_many_shapes() {
        let goals = ["", "x", "summarize this", "a, b, c", "fix bugs and add docs; test it"];
        for page_count in 0..5 {
            let pages: Vec<Page> = (0..page_count)
                .map(|i| Page::new(format!("page {}", i), ContentType::Text))
                .collect();
            for goal in goals {
                let plan = plan(&pages, goal);
                assert_eq!(plan.assignments.len(), pages.len());
                for (a, p) in plan.assignments.iter().zip(&pages) {
                    assert_eq!(&a.page, p);
                }
            }
        }
    }

    #[test]
    fn test_instruction_consumed_once() {
        let pages = vec![
            Page::new("Alpha", ContentType::Text),
            Page::new("Beta", ContentType::Text),
        ];
        // both instructions mention Alpha; Beta gets the second by fallback
        let plan = plan(&pages, "summarize alpha, explain alpha again");
        assert_eq!(plan.assignments[0].instruction, "summarize alpha");
        assert_eq!(plan.assignments[1].instruction, "explain alpha again");
        assert_eq!(plan.assignments[1].pass, MatchPass::ContentType);
    }

    #[test]
    fn test_blank_title_never_matches_explicitly() {
        let pages = vec![Page::new("  ", ContentType::Text)];
        let plan = plan(&pages, "summarize this");
        assert_eq!(plan.assignments[0].pass, MatchPass::ContentType);
    }

    #[test]
    fn test_related_actions_include_leftover_code_work() {
        let pages = vec![Page::new("utils.py", ContentType::Code)];
        let plan = plan(&pages, "optimize and add logging");

        assert_eq!(plan.assignments[0].instruction, "optimize");
        assert_eq!(plan.unused, vec![1]);
        assert_eq!(plan.related_actions(0), vec!["optimize", "add logging"]);
    }

    #[test]
    fn test_related_actions_skip_non_code_leftovers() {
        let pages = vec![Page::new("utils.py", ContentType::Code)];
        let plan = plan(&pages, "refactor the parser, summarize the video");
        assert_eq!(plan.related_actions(0), vec!["refactor the parser"]);
        assert!(plan.related_actions(5).is_empty());
    }
}
