//! Batch splitting, line classification, and error-line annotation.
//!
//! A batch is the raw multi-line text an agent produced for one slide-edit
//! turn. Lines that do not look like statements are treated as commentary and
//! skipped; only lines matching the statement grammar are executed.

use std::sync::LazyLock;

use regex::Regex;

/// Marker prefix placed on the failing line in an annotated batch.
pub const ERROR_LINE_PREFIX: &str = "--> Error Line: ";

/// A line is executable iff it is a lowercase snake-case identifier of at
/// least two segments followed by a non-empty parenthesized argument list.
static STATEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+_[a-z]+\(.+\)$").unwrap());

/// Split a batch into its action lines.
pub fn split_batch(actions: &str) -> Vec<&str> {
    actions.trim().split('\n').collect()
}

/// Whether a line matches the executable-statement grammar.
pub fn is_statement_form(line: &str) -> bool {
    STATEMENT_RE.is_match(line)
}

/// Whether a line attempts a function definition. Agents may only call
/// whitelisted operations, never redefine them; the documentation pack renders
/// signatures with a `def` prefix, so echoed documentation is caught here too.
pub fn is_definition(line: &str) -> bool {
    line.trim_start().starts_with("def")
}

/// Render the whole batch with the failing line replaced in place by the
/// error marker. Lines before and after are unchanged.
pub fn annotate_error_line(lines: &[&str], failing_idx: usize) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            if idx == failing_idx {
                format!("{ERROR_LINE_PREFIX}{line}")
            } else {
                (*line).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
