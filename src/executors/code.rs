//! Code assistant executor: detection call, then one call per related sub-action.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::format::{fenced, Section};
use crate::assistant::{AssistantApi, CodeAssistantResponse};
use crate::error::AssistantResult;
use crate::prompts::{
    ADD_LOGGING_PROMPT, DOCUMENT_CODE_PROMPT, OPTIMIZE_CODE_PROMPT, REFACTOR_CODE_PROMPT,
    REMOVE_DEAD_CODE_PROMPT, SUMMARIZE_CODE_PROMPT,
};

pub const AI_ACTION_LABEL: &str = "AI Action";
pub const CONVERSION_LABEL: &str = "Conversion";
pub const MODIFICATION_LABEL: &str = "Modification";

static CONVERSION_REQUEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bconvert|\btranslate|\bport\b|\brewrite in\b|\bto (?:python|java|javascript|typescript|rust|go|golang|ruby|kotlin|swift|php|scala)\b|\bto (?:c\+\+|c#)")
        .expect("valid conversion regex")
});

/// Canonical code actions, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeAction {
    RemoveDeadCode,
    AddLogging,
    Document,
    Optimize,
    Refactor,
    Summarize,
}

static CODE_ACTION_PATTERNS: Lazy<Vec<(CodeAction, Regex)>> = Lazy::new(|| {
    [
        (CodeAction::RemoveDeadCode, r"dead code|unused|unreachable"),
        (CodeAction::AddLogging, r"logging|\blogs?\b|\blogger"),
        (CodeAction::Document, r"document|\bdocs?\b|docstring|comment"),
        (CodeAction::Optimize, r"optimi[sz]|performance|faster|speed up"),
        (CodeAction::Refactor, r"refactor|clean ?up|restructure"),
        (CodeAction::Summarize, r"summ?[ae]r(?:i[sz]|y)|explain|what does"),
    ]
    .into_iter()
    .map(|(action, pattern)| {
        (
            action,
            Regex::new(&format!("(?i){}", pattern)).expect("valid code action regex"),
        )
    })
    .collect()
});

impl CodeAction {
    /// Map a sub-action to a canonical template, if it names one.
    pub fn detect(action: &str) -> Option<Self> {
        CODE_ACTION_PATTERNS
            .iter()
            .find(|(_, pattern)| pattern.is_match(action))
            .map(|(code_action, _)| *code_action)
    }

    pub fn prompt(&self) -> &'static str {
        match self {
            CodeAction::Summarize => SUMMARIZE_CODE_PROMPT,
            CodeAction::Optimize => OPTIMIZE_CODE_PROMPT,
            CodeAction::Document => DOCUMENT_CODE_PROMPT,
            CodeAction::Refactor => REFACTOR_CODE_PROMPT,
            CodeAction::RemoveDeadCode => REMOVE_DEAD_CODE_PROMPT,
            CodeAction::AddLogging => ADD_LOGGING_PROMPT,
        }
    }
}

/// Output bucket a sub-action lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeBucket {
    AiAction,
    Conversion,
    Modification,
}

impl CodeBucket {
    pub const ORDER: [CodeBucket; 3] = [
        CodeBucket::AiAction,
        CodeBucket::Conversion,
        CodeBucket::Modification,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CodeBucket::AiAction => AI_ACTION_LABEL,
            CodeBucket::Conversion => CONVERSION_LABEL,
            CodeBucket::Modification => MODIFICATION_LABEL,
        }
    }
}

/// How one sub-action will be sent to the code assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeStep {
    pub action: String,
    pub bucket: CodeBucket,
    pub instruction: String,
}

impl CodeStep {
    /// Template if one matches, otherwise the sub-action verbatim as a
    /// conversion or a generic modification.
    pub fn for_action(action: &str) -> Self {
        let (bucket, instruction) = match CodeAction::detect(action) {
            Some(code_action) => (CodeBucket::AiAction, code_action.prompt().to_string()),
            None if CONVERSION_REQUEST.is_match(action) => {
                (CodeBucket::Conversion, action.to_string())
            }
            None => (CodeBucket::Modification, action.to_string()),
        };
        Self {
            action: action.to_string(),
            bucket,
            instruction,
        }
    }

    fn pick_output(&self, response: CodeAssistantResponse) -> String {
        let CodeAssistantResponse {
            modified_code,
            converted_code,
            ..
        } = response;
        let output = match self.bucket {
            CodeBucket::Conversion => converted_code.or(modified_code),
            CodeBucket::AiAction | CodeBucket::Modification => modified_code.or(converted_code),
        };
        output.unwrap_or_default()
    }
}

/// Original code plus bucketed outputs.
#[derive(Debug, Clone, Default)]
pub struct CodeOutcome {
    pub original_code: String,
    pub sections: Vec<Section>,
}

/// Fetch the original code, then run each sub-action sequentially.
pub async fn run_code_assistant(
    api: &dyn AssistantApi,
    space: &str,
    page: &str,
    actions: &[String],
) -> AssistantResult<CodeOutcome> {
    let detected = api.code_assistant(space, page, "").await?;
    debug!(
        page = %page,
        original_len = detected.original_code.len(),
        "Fetched original code"
    );

    let mut buckets: Vec<(CodeBucket, Vec<String>)> = CodeBucket::ORDER
        .iter()
        .map(|bucket| (*bucket, Vec::new()))
        .collect();

    for action in actions {
        let step = CodeStep::for_action(action);
        info!(page = %page, action = %step.action, bucket = ?step.bucket, "Running code action");

        let response = api.code_assistant(space, page, &step.instruction).await?;
        let output = step.pick_output(response);
        if output.trim().is_empty() {
            continue;
        }
        if let Some((_, outputs)) = buckets.iter_mut().find(|(b, _)| *b == step.bucket) {
            outputs.push(fenced(&output, ""));
        }
    }

    let sections = buckets
        .into_iter()
        .filter(|(_, outputs)| !outputs.is_empty())
        .map(|(bucket, outputs)| Section::new(bucket.label(), outputs.join("\n\n")))
        .collect();

    Ok(CodeOutcome {
        original_code: detected.original_code,
        sections,
    })
}
