use tracing::debug;

use super::format::Section;
use crate::assistant::AssistantApi;
use crate::error::AssistantResult;

pub const SEARCH_RESPONSE_LABEL: &str = "Search Response";

/// Query scoped to the one page the instruction was assigned to.
pub async fn run_search(
    api: &dyn AssistantApi,
    space: &str,
    page: &str,
    instruction: &str,
) -> AssistantResult<Vec<Section>> {
    let pages = [page.to_string()];
    let response = api.search(space, &pages, instruction).await?;
    debug!(page = %page, response_len = response.len(), "Search answered");
    Ok(vec![Section::new(SEARCH_RESPONSE_LABEL, response.trim())])
}
