//! Goal decomposition and tool routing.
//!
//! Everything in this module is pure and synchronous:
//! - [`split_instructions`] / [`split_actions`]: goal and sub-action splitting
//! - [`ToolClassifier`]: ordered keyword rule table mapping instructions to tools
//! - [`match_pages`]: three-pass assignment of one instruction and tool per page
//!
//! The engine resolves page content types remotely, then hands everything
//! here to build a [`PagePlan`] before any tool runs.

mod classifier;
mod matcher;
mod splitter;

pub use classifier::*;
pub use matcher::*;
pub use splitter::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Page classification used to bias tool selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Code,
    Image,
    Video,
}

impl ContentType {
    /// Parse a content-type label, treating anything unrecognised as text.
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }

    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Code => "code",
            ContentType::Image => "image",
            ContentType::Video => "video",
        }
    }

    /// The tool a page of this type prefers when an instruction offers it.
    pub fn preferred_tool(&self) -> ToolTag {
        match self {
            ContentType::Text => ToolTag::AiPoweredSearch,
            ContentType::Code => ToolTag::CodeAssistant,
            ContentType::Image => ToolTag::ImageInsights,
            ContentType::Video => ToolTag::VideoSummarizer,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(ContentType::Text),
            "code" => Ok(ContentType::Code),
            "image" => Ok(ContentType::Image),
            "video" => Ok(ContentType::Video),
            other => Err(format!("Unknown content type: {}", other)),
        }
    }
}

/// Capability selected to satisfy an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolTag {
    AiPoweredSearch,
    CodeAssistant,
    ImageInsights,
    VideoSummarizer,
    ImpactAnalyzer,
    TestSupport,
}

impl ToolTag {
    /// Every tag, in declaration order.
    pub const ALL: [ToolTag; 6] = [
        ToolTag::AiPoweredSearch,
        ToolTag::CodeAssistant,
        ToolTag::ImageInsights,
        ToolTag::VideoSummarizer,
        ToolTag::ImpactAnalyzer,
        ToolTag::TestSupport,
    ];

    /// Wire name (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolTag::AiPoweredSearch => "ai_powered_search",
            ToolTag::CodeAssistant => "code_assistant",
            ToolTag::ImageInsights => "image_insights",
            ToolTag::VideoSummarizer => "video_summarizer",
            ToolTag::ImpactAnalyzer => "impact_analyzer",
            ToolTag::TestSupport => "test_support",
        }
    }

    /// Human-readable name used in tab titles.
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolTag::AiPoweredSearch => "AI Powered Search",
            ToolTag::CodeAssistant => "Code Assistant",
            ToolTag::ImageInsights => "Image Insights",
            ToolTag::VideoSummarizer => "Video Summarizer",
            ToolTag::ImpactAnalyzer => "Impact Analyzer",
            ToolTag::TestSupport => "Test Support",
        }
    }

    /// One-line description of what the tool is for.
    pub fn purpose(&self) -> &'static str {
        match self {
            ToolTag::AiPoweredSearch => "answers questions and summarizes page text",
            ToolTag::CodeAssistant => "analyzes, converts and modifies code",
            ToolTag::ImageInsights => "summarizes images, charts and diagrams",
            ToolTag::VideoSummarizer => "summarizes videos with quotes and timestamps",
            ToolTag::ImpactAnalyzer => "compares two page versions and rates the risk",
            ToolTag::TestSupport => "builds a test strategy from code and test input",
        }
    }
}

impl fmt::Display for ToolTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown tool: {}", s))
    }
}

/// A selected page together with its resolved content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    #[serde(default)]
    pub content_type: ContentType,
}

impl Page {
    pub fn new(title: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            title: title.into(),
            content_type,
        }
    }
}

/// An instruction with every tool its text matched, highest priority first.
///
/// `candidates` is never empty; see [`ToolClassifier::candidates`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedInstruction {
    pub text: String,
    pub candidates: Vec<ToolTag>,
}

impl ClassifiedInstruction {
    /// The cascade winner.
    pub fn primary(&self) -> ToolTag {
        self.candidates
            .first()
            .copied()
            .unwrap_or(ToolTag::AiPoweredSearch)
    }

    pub fn offers(&self, tool: ToolTag) -> bool {
        self.candidates.contains(&tool)
    }
}

/// Which matcher pass produced a [`PageInstruction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPass {
    /// The instruction names the page.
    ExplicitMention,
    /// First unused instruction, tool biased by the page's content type.
    ContentType,
    /// No instruction left; reused the first one with search.
    Reused,
    /// No instruction at all; synthetic default with search.
    Synthetic,
}

impl MatchPass {
    pub fn describe(&self) -> &'static str {
        match self {
            MatchPass::ExplicitMention => "instruction mentions the page by name",
            MatchPass::ContentType => "first unused instruction, tool chosen by content type",
            MatchPass::Reused => "no unused instruction left, reused the first instruction",
            MatchPass::Synthetic => "no instructions derived, used the default instruction",
        }
    }
}

/// The resolved execution unit for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInstruction {
    pub page: Page,
    pub instruction: String,
    pub tool: ToolTag,
    pub pass: MatchPass,
}
