use super::format::Section;
use crate::assistant::{AssistantApi, VideoSummaryResponse};
use crate::error::AssistantResult;

pub const SUMMARY_LABEL: &str = "Summary";
pub const KEY_QUOTES_LABEL: &str = "Key Quotes";
pub const TIMESTAMPS_LABEL: &str = "Timestamps";

pub async fn run_video_summary(
    api: &dyn AssistantApi,
    space: &str,
    page: &str,
) -> AssistantResult<Vec<Section>> {
    let response = api.video_summary(space, page).await?;
    Ok(video_sections(&response))
}

/// Summary, quotes and timestamps; empty parts are left out.
pub fn video_sections(response: &VideoSummaryResponse) -> Vec<Section> {
    let mut sections = Vec::new();
    if !response.summary.trim().is_empty() {
        sections.push(Section::new(SUMMARY_LABEL, response.summary.trim()));
    }
    if let Some(quotes) = bullets(&response.quotes) {
        sections.push(Section::new(KEY_QUOTES_LABEL, quotes));
    }
    if let Some(timestamps) = bullets(&response.timestamps) {
        sections.push(Section::new(TIMESTAMPS_LABEL, timestamps));
    }
    sections
}

fn bullets(items: &[String]) -> Option<String> {
    let lines: Vec<String> = items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| format!("- {}", item))
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}
