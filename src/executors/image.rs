use tracing::{debug, info};

use super::format::Section;
use crate::assistant::AssistantApi;
use crate::error::AssistantResult;

pub const NO_IMAGES_LABEL: &str = "Image Insights";
pub const NO_IMAGES_MESSAGE: &str = "No images found on this page.";

/// Summarize every image on the page independently, numbered in page order.
pub async fn run_image_insights(
    api: &dyn AssistantApi,
    space: &str,
    page: &str,
) -> AssistantResult<Vec<Section>> {
    let images = api.images(space, page).await?;
    info!(page = %page, images = images.len(), "Summarizing page images");

    if images.is_empty() {
        return Ok(vec![Section::new(NO_IMAGES_LABEL, NO_IMAGES_MESSAGE)]);
    }

    let mut sections = Vec::with_capacity(images.len());
    for (index, url) in images.iter().enumerate() {
        let summary = api.image_summary(space, page, url).await?;
        debug!(page = %page, image = index + 1, "Image summarized");
        sections.push(Section::new(
            format!("Image {}", index + 1),
            format!("{}\n\n_Source: {}_", summary.trim(), url),
        ));
    }
    Ok(sections)
}
