use serde::{Deserialize, Serialize};

/// Heading prefix that opens a section in rendered output.
const SECTION_HEADING: &str = "### ";
/// Shortest run of backticks that opens a code fence.
const MIN_FENCE_LEN: usize = 3;

/// One labeled block of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub label: String,
    pub body: String,
}

impl Section {
    pub fn new(label: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            body: body.into(),
        }
    }
}

/// Wrap text in a code fence, optionally tagged with a language.
///
/// The fence is one backtick longer than the longest backtick run in the
/// body, so fences already present in the body stay inside it.
pub fn fenced(body: &str, language: &str) -> String {
    let longest = body
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat((longest + 1).max(MIN_FENCE_LEN));
    format!("{}{}\n{}\n{}", fence, language, body.trim_end_matches('\n'), fence)
}

/// Tracks whether a line sits inside a backtick code fence.
///
/// A fence closes only on a line of at least as many backticks as opened
/// it, with nothing else after them.
#[derive(Debug, Default)]
struct FenceTracker {
    open: Option<usize>,
}

impl FenceTracker {
    fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one line; returns true when it opened or closed a fence.
    fn observe(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        let run = trimmed.chars().take_while(|c| *c == '`').count();
        if run < MIN_FENCE_LEN {
            return false;
        }
        match self.open {
            None => {
                self.open = Some(run);
                true
            }
            Some(open) if run >= open && trimmed[run..].trim().is_empty() => {
                self.open = None;
                true
            }
            Some(_) => false,
        }
    }
}

/// Render sections as markdown, one `### label` heading per section.
///
/// Headings of level one to three inside a body are pushed down to level
/// four so that [`parse_sections`] sees exactly the sections rendered here.
pub fn render_sections(sections: &[Section]) -> String {
    sections
        .iter()
        .map(|section| {
            format!(
                "{}{}\n\n{}",
                SECTION_HEADING,
                section.label.trim(),
                demote_headings(section.body.trim_matches('\n'))
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Recover sections from [`render_sections`] output.
///
/// Text before the first heading is ignored, as are heading-like lines
/// inside code fences.
pub fn parse_sections(rendered: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut body: Vec<&str> = Vec::new();
    let mut fence = FenceTracker::default();

    for line in rendered.lines() {
        if !fence.in_fence() {
            if let Some(label) = line.strip_prefix(SECTION_HEADING) {
                if let Some(last) = sections.last_mut() {
                    last.body = body.join("\n").trim_matches('\n').to_string();
                }
                body.clear();
                sections.push(Section::new(label.trim(), ""));
                continue;
            }
        }
        fence.observe(line);
        if !sections.is_empty() {
            body.push(line);
        }
    }

    if let Some(last) = sections.last_mut() {
        last.body = body.join("\n").trim_matches('\n').to_string();
    }
    sections
}

fn demote_headings(body: &str) -> String {
    let mut fence = FenceTracker::default();
    body.lines()
        .map(|line| {
            if fence.observe(line) || fence.in_fence() {
                return line.to_string();
            }
            let hashes = line.chars().take_while(|c| *c == '#').count();
            if (1..=3).contains(&hashes) && line[hashes..].starts_with(' ') {
                format!("####{}", &line[hashes..])
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
