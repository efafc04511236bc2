//! The action interpreter: runs one batch of agent statements against a slide.
//!
//! A batch either applies completely or is rejected at its first failing line.
//! Rejection never propagates as an error to the caller: the interpreter
//! always returns a structured outcome carrying the annotated batch and the
//! captured failure trace, which is exactly the context a corrective retry
//! loop needs. The retry policy itself (and its attempt counter) lives with
//! the caller, not here.

use anyhow::{Result, anyhow, bail};
use tracing::{debug, warn};

use crate::core::batch::{annotate_error_line, is_definition, is_statement_form, split_batch};
use crate::core::history::History;
use crate::core::parser::parse_statement;
use crate::core::registry::Registry;
use crate::slide::SlidePage;

/// Interpreter settings.
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    /// Truncate stored/returned failure traces beyond this many bytes.
    pub trace_limit_bytes: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            trace_limit_bytes: 100_000,
        }
    }
}

/// Result of interpreting one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every line was either commentary or a statement that executed.
    Applied,
    /// Execution stopped at the first failing line; nothing after it ran.
    Rejected {
        /// The whole batch with the failing line replaced by the error marker.
        annotated: String,
        /// Captured failure trace for the failing line.
        trace: String,
    },
}

/// Executes action batches and records their outcomes.
///
/// One interpreter instance accumulates history across many batches. It is
/// single-threaded by design; concurrent batches against the same slide need
/// external serialization.
pub struct Interpreter {
    registry: Registry,
    history: History,
    config: InterpreterConfig,
}

impl Interpreter {
    pub fn new(config: InterpreterConfig) -> Result<Self> {
        Ok(Self {
            registry: Registry::agent()?,
            history: History::new(),
            config,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Interpret one batch of action text against a slide.
    ///
    /// Lines are processed in order; the first failure short-circuits the
    /// batch and leaves its batch history entry at the pessimistic mark.
    pub fn execute(&mut self, actions: &str, slide: &mut SlidePage) -> BatchOutcome {
        let lines = split_batch(actions);
        self.history.begin_batch(slide.slide_idx, actions);

        let mut found_statement = false;
        for (idx, line) in lines.iter().copied().enumerate() {
            let is_last = idx + 1 == lines.len();
            let mut entry_for_line = false;
            match self.run_line(line, is_last, &mut found_statement, &mut entry_for_line, slide) {
                Ok(()) => {}
                Err(err) => {
                    let trace = truncate_trace(&format!("{err:#}"), self.config.trace_limit_bytes);
                    if entry_for_line {
                        self.history.attach_trace(&trace);
                    }
                    warn!(line = idx, %trace, "batch rejected");
                    return BatchOutcome::Rejected {
                        annotated: annotate_error_line(&lines, idx),
                        trace,
                    };
                }
            }
        }

        self.history.mark_batch_correct();
        debug!(slide_idx = slide.slide_idx, "batch applied");
        BatchOutcome::Applied
    }

    fn run_line(
        &mut self,
        line: &str,
        is_last: bool,
        found_statement: &mut bool,
        entry_for_line: &mut bool,
        slide: &mut SlidePage,
    ) -> Result<()> {
        if is_definition(line) {
            bail!("function definitions must not be output; emit only whitelisted calls");
        }
        if !is_statement_form(line) {
            if is_last && !*found_statement {
                bail!("no executable statement found in the output; emit one call per line");
            }
            // Commentary/prose, not an error.
            return Ok(());
        }
        *found_statement = true;

        // The grammar guarantees an opening parenthesis.
        let name = line.split('(').next().unwrap_or_default();
        let Some(op) = self.registry.get(name) else {
            bail!("the operation {name} is not defined");
        };
        let op = op.clone();

        self.history.begin_statement(line);
        *entry_for_line = true;

        let call = parse_statement(line).map_err(|err| anyhow!("malformed statement: {err}"))?;
        let bound = op.bind(&call.args)?;
        (op.handler)(slide, &bound)?;

        self.history.mark_statement_correct();
        debug!(statement = line, "statement applied");
        Ok(())
    }
}

fn truncate_trace(trace: &str, limit: usize) -> String {
    if trace.len() <= limit {
        return trace.to_string();
    }
    let mut end = limit;
    while end > 0 && !trace.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}\n[trace truncated {} bytes]",
        &trace[..end],
        trace.len() - end
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::HistoryMark;
    use crate::test_support::{picture, slide_with_shapes, text_shape};

    fn interpreter() -> Interpreter {
        Interpreter::new(InterpreterConfig::default()).expect("interpreter")
    }

    #[test]
    fn batch_of_queueing_statements_applies() {
        let mut slide = slide_with_shapes(1, vec![text_shape(3, &[&["a", "b"]])]);
        let mut interp = interpreter();

        let outcome = interp.execute(
            "del_span(3, 0, 1)\nreplace_text(3, 0, 0, 'Hello')",
            &mut slide,
        );

        assert_eq!(outcome, BatchOutcome::Applied);
        let pending = &slide.shape(3).expect("shape").pending;
        assert_eq!(pending.delete.len(), 1);
        assert_eq!(pending.replace.len(), 1);

        assert_eq!(interp.history().batches()[0].mark, HistoryMark::ApiCallCorrect);
        let marks: Vec<HistoryMark> = interp
            .history()
            .statements()
            .iter()
            .map(|entry| entry.mark)
            .collect();
        assert_eq!(marks, vec![HistoryMark::CodeRunCorrect, HistoryMark::CodeRunCorrect]);
    }

    #[test]
    fn commentary_lines_are_skipped_silently() {
        let mut slide = slide_with_shapes(0, vec![text_shape(3, &[&["a"]])]);
        let mut interp = interpreter();

        let outcome = interp.execute(
            "I will now fix the title.\nreplace_text(3, 0, 0, 'Title')\nDone.",
            &mut slide,
        );

        assert_eq!(outcome, BatchOutcome::Applied);
        assert_eq!(interp.history().statements().len(), 1);
    }

    #[test]
    fn unknown_operation_rejects_and_marks_the_line() {
        let mut slide = slide_with_shapes(0, vec![text_shape(3, &[&["a"]])]);
        let mut interp = interpreter();

        let outcome = interp.execute(
            "replace_text(3, 0, 0, 'ok')\nmake_rainbow(3)\nreplace_text(3, 0, 0, 'never')",
            &mut slide,
        );

        let BatchOutcome::Rejected { annotated, trace } = outcome else {
            panic!("expected rejection");
        };
        assert!(trace.contains("the operation make_rainbow is not defined"));
        assert_eq!(
            annotated,
            "replace_text(3, 0, 0, 'ok')\n--> Error Line: make_rainbow(3)\nreplace_text(3, 0, 0, 'never')"
        );
        // The line after the failure never ran and produced no entry; the
        // unknown operation itself is rejected before an entry is made.
        assert_eq!(interp.history().statements().len(), 1);
        assert_eq!(interp.history().statements()[0].line, "replace_text(3, 0, 0, 'ok')");
        assert_eq!(interp.history().batches()[0].mark, HistoryMark::ApiCallError);
    }

    #[test]
    fn prose_only_batch_fails_on_the_final_line() {
        let mut slide = slide_with_shapes(0, vec![text_shape(3, &[&["a"]])]);
        let mut interp = interpreter();

        let outcome = interp.execute("Let me think.\nNo edits needed, I believe.", &mut slide);

        let BatchOutcome::Rejected { annotated, trace } = outcome else {
            panic!("expected rejection");
        };
        assert!(trace.contains("no executable statement found"));
        assert!(annotated.ends_with("--> Error Line: No edits needed, I believe."));
    }

    #[test]
    fn definition_lines_fail_even_when_later_lines_would_succeed() {
        let mut slide = slide_with_shapes(0, vec![text_shape(3, &[&["a"]])]);
        let mut interp = interpreter();

        let outcome = interp.execute(
            "def replace_text(div_id, paragraph_id, span_id, text):\nreplace_text(3, 0, 0, 'x')",
            &mut slide,
        );

        let BatchOutcome::Rejected { trace, .. } = outcome else {
            panic!("expected rejection");
        };
        assert!(trace.contains("function definitions must not be output"));
        assert!(interp.history().statements().is_empty());
    }

    #[test]
    fn single_statement_batch_applies() {
        let mut slide = slide_with_shapes(0, vec![picture(9, "/tmp/x.png")]);
        let mut interp = interpreter();

        let outcome = interp.execute("del_image(9)", &mut slide);
        assert_eq!(outcome, BatchOutcome::Applied);
        assert!(slide.shape(9).is_none());
    }

    #[test]
    fn missing_element_records_a_traced_statement_entry() {
        let mut slide = slide_with_shapes(0, vec![text_shape(3, &[&["a"]])]);
        let mut interp = interpreter();

        let outcome = interp.execute("del_image(9)", &mut slide);

        let BatchOutcome::Rejected { annotated, trace } = outcome else {
            panic!("expected rejection");
        };
        assert!(trace.contains("cannot find element 9"));
        assert_eq!(annotated, "--> Error Line: del_image(9)");

        let entries = interp.history().statements();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mark, HistoryMark::CodeRunError);
        assert!(entries[0].trace.as_deref().expect("trace").contains("cannot find element 9"));
    }

    #[test]
    fn malformed_arguments_are_traced_on_their_own_entry() {
        let mut slide = slide_with_shapes(0, vec![text_shape(3, &[&["a"]])]);
        let mut interp = interpreter();

        let outcome = interp.execute("replace_text(3, 0, 0, undefined_name)", &mut slide);

        let BatchOutcome::Rejected { trace, .. } = outcome else {
            panic!("expected rejection");
        };
        assert!(trace.contains("malformed statement"));
        let entries = interp.history().statements();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].trace.is_some());
    }

    #[test]
    fn traces_are_truncated_to_the_configured_limit() {
        assert_eq!(truncate_trace("short", 100), "short");
        let truncated = truncate_trace(&"x".repeat(64), 10);
        assert!(truncated.starts_with("xxxxxxxxxx\n[trace truncated 54 bytes]"));
    }

    #[test]
    fn history_accumulates_across_batches() {
        let mut slide = slide_with_shapes(2, vec![text_shape(3, &[&["a"]])]);
        let mut interp = interpreter();

        interp.execute("replace_text(3, 0, 0, 'one')", &mut slide);
        interp.execute("not a statement", &mut slide);

        let batches = interp.history().batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].mark, HistoryMark::ApiCallCorrect);
        assert_eq!(batches[1].mark, HistoryMark::ApiCallError);
        assert_eq!(batches[1].slide_idx, 2);
    }
}
