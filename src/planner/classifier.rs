use once_cell::sync::Lazy;
use regex::Regex;

use super::{ClassifiedInstruction, ContentType, ToolTag};

/// Any spelling of "summarize" the rules accept (summarise, summerize, sumarize, summary).
const SUMMARIZE: &str = r"summ?[ae]r(?:i[sz]|y)";
const IMAGE_NOUNS: &str = r"(?:image|picture|photo|screenshot)";
const VIDEO_KEYWORDS: &str = r"video|transcri(?:be|pt)";
const IMAGE_KEYWORDS: &str = r"image|chart|diagram|visual";
const CODE_KEYWORDS: &str = r"debug|refactor|fix|bug|error|optimi[sz]|performance|documentation|docs|comment|dead code|unused|logging|log";
const CONVERSION: &str = r"\bconvert|\bto (?:python|java|javascript|typescript|rust|go|golang|ruby|kotlin|swift|php|scala)\b|\bto (?:c\+\+|c#)";

static PAIRWISE_IMPACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)impact|compare|difference|diff|change").expect("valid impact trigger regex")
});

static PAIRWISE_TEST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)test|qa").expect("valid test trigger regex"));

static VIDEO_OVERRIDE: Lazy<Regex> = Lazy::new(|| ci(VIDEO_KEYWORDS));
static IMAGE_OVERRIDE: Lazy<Regex> = Lazy::new(|| ci(IMAGE_KEYWORDS));
static CODE_OVERRIDE: Lazy<Regex> = Lazy::new(|| ci(&format!("{}|{}", CODE_KEYWORDS, CONVERSION)));

static DEFAULT_RULES: Lazy<Vec<KeywordRule>> = Lazy::new(|| {
    vec![
        KeywordRule::new(
            "video_summary",
            &format!(r"{s}.*video|video.*{s}", s = SUMMARIZE),
            ToolTag::VideoSummarizer,
        ),
        KeywordRule::new(
            "image_summary",
            &format!(r"{s}.*{i}|{i}.*{s}", s = SUMMARIZE, i = IMAGE_NOUNS),
            ToolTag::ImageInsights,
        ),
        KeywordRule::new("code_conversion", CONVERSION, ToolTag::CodeAssistant),
        KeywordRule::new("video", VIDEO_KEYWORDS, ToolTag::VideoSummarizer),
        KeywordRule::new("image", IMAGE_KEYWORDS, ToolTag::ImageInsights),
        KeywordRule::new("code", CODE_KEYWORDS, ToolTag::CodeAssistant),
        KeywordRule::new("impact", r"impact|change|difference|diff", ToolTag::ImpactAnalyzer),
        KeywordRule::new("test", r"test|qa", ToolTag::TestSupport),
        KeywordRule::new(
            "search",
            &format!(
                r"{}|\btext\b|\bpages?\b|explain|search|\bfind\b|\bwhat\b|describe",
                SUMMARIZE
            ),
            ToolTag::AiPoweredSearch,
        ),
    ]
});

fn ci(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).expect("valid keyword rule regex")
}

/// One row of the classification table.
#[derive(Debug)]
pub struct KeywordRule {
    pub name: &'static str,
    pub tool: ToolTag,
    pattern: Regex,
}

impl KeywordRule {
    fn new(name: &'static str, pattern: &str, tool: ToolTag) -> Self {
        Self {
            name,
            tool,
            pattern: ci(pattern),
        }
    }

    pub fn matches(&self, instruction: &str) -> bool {
        self.pattern.is_match(instruction)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Deterministic keyword classifier.
///
/// Rules are evaluated top to bottom and the first match wins; there is no
/// scoring. When nothing matches the instruction goes to search.
#[derive(Debug, Clone, Copy)]
pub struct ToolClassifier {
    rules: &'static [KeywordRule],
}

impl Default for ToolClassifier {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.as_slice(),
        }
    }
}

impl ToolClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[KeywordRule] {
        self.rules
    }

    /// The first rule whose pattern matches, if any.
    pub fn matching_rule(&self, instruction: &str) -> Option<&KeywordRule> {
        self.rules.iter().find(|rule| rule.matches(instruction))
    }

    /// The cascade winner for an instruction.
    pub fn classify(&self, instruction: &str) -> ToolTag {
        self.matching_rule(instruction)
            .map(|rule| rule.tool)
            .unwrap_or(ToolTag::AiPoweredSearch)
    }

    /// Every tool the instruction matched, in rule order, deduplicated.
    ///
    /// Search is appended when nothing matched at all, so the list is never
    /// empty and its head always equals [`ToolClassifier::classify`].
    pub fn candidates(&self, instruction: &str) -> Vec<ToolTag> {
        let mut tools: Vec<ToolTag> = Vec::new();
        for rule in self.rules {
            if !tools.contains(&rule.tool) && rule.matches(instruction) {
                tools.push(rule.tool);
            }
        }
        if tools.is_empty() {
            tools.push(ToolTag::AiPoweredSearch);
        }
        tools
    }

    pub fn classify_instruction(&self, instruction: &str) -> ClassifiedInstruction {
        ClassifiedInstruction {
            text: instruction.to_string(),
            candidates: self.candidates(instruction),
        }
    }

    /// Decide the tool for an instruction, biased by the page's content type when known.
    pub fn classify_for_page(&self, instruction: &str, content_type: Option<ContentType>) -> ToolTag {
        let classified = self.classify_instruction(instruction);
        match content_type {
            Some(content_type) => resolve_with_override(content_type, &classified),
            None => classified.primary(),
        }
    }
}

/// Prefer the content type's own tool when the instruction offers it,
/// otherwise take the instruction's primary tool.
pub fn resolve_by_content_type(
    content_type: ContentType,
    instruction: &ClassifiedInstruction,
) -> ToolTag {
    let preferred = content_type.preferred_tool();
    if instruction.offers(preferred) {
        preferred
    } else {
        instruction.primary()
    }
}

/// Keyword override for a typed page: an image page asked about a chart
/// gets image insights regardless of what else the instruction matched.
pub fn content_type_override(content_type: ContentType, instruction: &str) -> Option<ToolTag> {
    let pattern: &Regex = match content_type {
        ContentType::Video => &*VIDEO_OVERRIDE,
        ContentType::Image => &*IMAGE_OVERRIDE,
        ContentType::Code => &*CODE_OVERRIDE,
        ContentType::Text => return None,
    };
    pattern
        .is_match(instruction)
        .then(|| content_type.preferred_tool())
}

/// Override first, then content-type preference.
pub fn resolve_with_override(
    content_type: ContentType,
    instruction: &ClassifiedInstruction,
) -> ToolTag {
    content_type_override(content_type, &instruction.text)
        .unwrap_or_else(|| resolve_by_content_type(content_type, instruction))
}

/// Whether an instruction asks for a comparison of two pages.
pub fn triggers_impact_analysis(instruction: &str) -> bool {
    PAIRWISE_IMPACT.is_match(instruction)
}

/// Whether an instruction asks for a test strategy.
pub fn triggers_test_strategy(instruction: &str) -> bool {
    PAIRWISE_TEST.is_match(instruction)
}
