//! Canonical code-assistant instructions.
//!
//! Sub-actions that match one of these templates are sent to the code
//! assistant with the template text instead of the user's wording, so the
//! same request always produces the same instruction. Keeping them together
//! makes them easy to review and version.

/// Instruction for explaining what a piece of code does.
pub const SUMMARIZE_CODE_PROMPT: &str = r#"Summarize what this code does. Describe its purpose, its main functions or classes, their inputs and outputs, and any notable side effects. Do not modify the code."#;

/// Instruction for performance work.
pub const OPTIMIZE_CODE_PROMPT: &str = r#"Optimize this code for performance and resource usage without changing its observable behavior.

Guidelines:
- Remove redundant computation and repeated lookups
- Prefer efficient data structures and algorithms
- Keep public signatures unchanged
- Return the complete optimized code"#;

/// Instruction for adding documentation.
pub const DOCUMENT_CODE_PROMPT: &str = r#"Add clear documentation to this code.

Guidelines:
- Add docstrings or doc comments to every public function, class and module
- Explain parameters, return values and raised errors
- Add brief inline comments only where the logic is not obvious
- Do not change any behavior
- Return the complete documented code"#;

/// Instruction for structural cleanup.
pub const REFACTOR_CODE_PROMPT: &str = r#"Refactor this code to improve readability and maintainability without changing its behavior.

Guidelines:
- Extract long functions into smaller well-named helpers
- Remove duplication
- Use descriptive names for variables and functions
- Return the complete refactored code"#;

/// Instruction for pruning unused code.
pub const REMOVE_DEAD_CODE_PROMPT: &str = r#"Remove dead code from this file: unused imports, unused variables, unreachable branches and functions that are never called. Do not change any behavior that is still reachable. Return the complete cleaned code."#;

/// Instruction for adding logging.
pub const ADD_LOGGING_PROMPT: &str = r#"Add logging to this code using the language's standard logging facility.

Guidelines:
- Log entry and exit of important functions at debug level
- Log errors and caught exceptions with context at error level
- Do not log secrets or personal data
- Return the complete code with logging added"#;
