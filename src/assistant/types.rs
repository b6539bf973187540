use serde::{Deserialize, Serialize};

/// Request naming a single page in a space
#[derive(Debug, Clone, Serialize)]
pub struct PageRequest<'a> {
    pub space_key: &'a str,
    pub page_title: &'a str,
}

/// Page classification returned by the page-type lookup
#[derive(Debug, Clone, Deserialize)]
pub struct PageTypeResponse {
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Search scoped to a set of pages
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    pub space_key: &'a str,
    pub page_titles: &'a [String],
    pub query: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub response: String,
}

/// Code assistant call; an empty instruction only detects the original code
#[derive(Debug, Clone, Serialize)]
pub struct CodeAssistantRequest<'a> {
    pub space_key: &'a str,
    pub page_title: &'a str,
    pub instruction: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CodeAssistantResponse {
    #[serde(default)]
    pub original_code: String,
    #[serde(default)]
    pub modified_code: Option<String>,
    #[serde(default)]
    pub converted_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageSummaryRequest<'a> {
    pub space_key: &'a str,
    pub page_title: &'a str,
    pub image_url: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageSummaryResponse {
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VideoSummaryResponse {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub quotes: Vec<String>,
    #[serde(default)]
    pub timestamps: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactAnalysisRequest<'a> {
    pub space_key: &'a str,
    pub old_page_title: &'a str,
    pub new_page_title: &'a str,
    pub question: &'a str,
}

/// Metrics and narrative comparing two page versions
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ImpactAnalysisResponse {
    #[serde(default)]
    pub lines_added: u64,
    #[serde(default)]
    pub lines_removed: u64,
    #[serde(default)]
    pub files_changed: u64,
    #[serde(default)]
    pub percentage_change: f64,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default)]
    pub diff: String,
    #[serde(default)]
    pub impact_analysis: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestSupportRequest<'a> {
    pub space_key: &'a str,
    pub code_page_title: &'a str,
    pub test_input_page_title: &'a str,
    pub question: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestSupportResponse {
    #[serde(default)]
    pub test_strategy: String,
}
