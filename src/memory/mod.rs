//! Session trace memory and the token-budgeted context window builder.
//!
//! A [`TraceMemory`] holds the ordered history of action descriptions for one
//! agent session, plus the current objective and note. Its central operation
//! is [`TraceMemory::render_context`]: render the history into the fixed
//! context template, keeping the largest contiguous *suffix* of the trace
//! that fits a caller-supplied token budget. Recency bias is structural — an
//! older chunk is never kept at the expense of a newer one.

pub mod splitter;
pub mod store;
pub mod tokenizer;

use crate::config::MemoryConfig;
use crate::error::MemoryError;
use splitter::TextSplitter;
use tokenizer::{EstimateTokenizer, Tokenizer};

/// The fixed context template. The literal line structure is part of the
/// external contract; prompts downstream depend on it.
pub const CONTEXT_TEMPLATE: &str = "The Objective is from the perspective of the User
Objective: {objective}
Note: {note}
{actions_trace}";

fn render_template(objective: &str, note: &str, actions_trace: &str) -> String {
    CONTEXT_TEMPLATE
        .replacen("{objective}", objective, 1)
        .replacen("{note}", note, 1)
        .replacen("{actions_trace}", actions_trace, 1)
}

/// Trace, objective and note for one agent session.
///
/// Owned exclusively by that session; create one per session rather than
/// sharing process-wide state.
pub struct TraceMemory {
    objective: String,
    note: String,
    trace: Vec<String>,
    splitter: TextSplitter,
    tokenizer: Box<dyn Tokenizer>,
}

impl TraceMemory {
    /// A fresh, empty memory using the default character-ratio tokenizer.
    pub fn new(config: &MemoryConfig) -> Self {
        Self::with_tokenizer(config, Box::new(EstimateTokenizer::new()))
    }

    /// A fresh, empty memory counting tokens with the given tokenizer.
    pub fn with_tokenizer(config: &MemoryConfig, tokenizer: Box<dyn Tokenizer>) -> Self {
        Self {
            objective: "N/A".to_string(),
            note: "N/A".to_string(),
            trace: Vec::new(),
            splitter: TextSplitter::new(config.chunk_size),
            tokenizer,
        }
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    /// Replace the current objective.
    pub fn set_objective(&mut self, objective: impl Into<String>) {
        self.objective = objective.into();
    }

    /// Replace the current note.
    pub fn set_note(&mut self, note: impl Into<String>) {
        self.note = note.into();
    }

    /// Append one action description to the end of the trace.
    pub fn append(&mut self, description: impl Into<String>) {
        let description = description.into();
        tracing::debug!(entries = self.trace.len() + 1, "appending trace entry");
        self.trace.push(description);
    }

    /// Remove the last `n` entries. Fails without touching the trace when `n`
    /// exceeds its length; the request is never clamped.
    pub fn revert(&mut self, n: usize) -> Result<(), MemoryError> {
        if n > self.trace.len() {
            return Err(MemoryError::HistoryUnderflow {
                requested: n,
                available: self.trace.len(),
            });
        }
        self.trace.truncate(self.trace.len() - n);
        tracing::debug!(reverted = n, remaining = self.trace.len(), "reverted trace");
        Ok(())
    }

    /// Empty the trace. Objective and note are left as they are.
    pub fn clear(&mut self) {
        self.trace.clear();
    }

    /// Render the context string for a token budget.
    ///
    /// The joined trace is chunked, and the window of chunks grows backward
    /// from the newest chunk while the *entire rendered template* counts
    /// strictly below `max_tokens`. The result is always a rendering over a
    /// contiguous suffix of chunks, down to the empty suffix. When even the
    /// empty-trace rendering is at or over budget it is returned anyway —
    /// there is no smaller representation to fall back to.
    pub fn render_context(&self, max_tokens: usize) -> String {
        let joined = self.trace.join("\n");
        let chunks = self.splitter.split(&joined);
        tracing::debug!(
            chunks = chunks.len(),
            budget = max_tokens,
            "building context window"
        );
        match chunks.len() {
            // Nothing to fit: render directly, no budget search.
            0 => self.render_with(""),
            1 => self.render_with(&chunks[0]),
            _ => {
                let mut best = self.render_with("");
                for take in 1..=chunks.len() {
                    let window = chunks[chunks.len() - take..].join("\n");
                    let candidate = self.render_with(&window);
                    if self.tokenizer.count_tokens(&candidate) < max_tokens {
                        best = candidate;
                    } else {
                        break;
                    }
                }
                best
            }
        }
    }

    /// Render the context that fits next to `prompt` within a total budget:
    /// the prompt's own token count is deducted first.
    pub fn context_for_prompt(&self, prompt: &str, max_total_tokens: usize) -> String {
        let prompt_tokens = self.tokenizer.count_tokens(prompt);
        self.render_context(max_total_tokens.saturating_sub(prompt_tokens))
    }

    fn render_with(&self, actions_trace: &str) -> String {
        render_template(&self.objective, &self.note, actions_trace)
    }
}

impl std::fmt::Debug for TraceMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceMemory")
            .field("objective", &self.objective)
            .field("note", &self.note)
            .field("trace_len", &self.trace.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_with_chunk_size(chunk_size: usize) -> TraceMemory {
        TraceMemory::new(&MemoryConfig { chunk_size })
    }

    fn memory() -> TraceMemory {
        TraceMemory::new(&MemoryConfig::default())
    }

    #[test]
    fn test_template_line_structure() {
        let rendered = render_template("Find file", "N/A", "did things");
        assert_eq!(
            rendered,
            "The Objective is from the perspective of the User\nObjective: Find file\nNote: N/A\ndid things"
        );
    }

    #[test]
    fn test_append_preserves_order() {
        let mut memory = memory();
        memory.append("first");
        memory.append("second");
        memory.append("third");
        assert_eq!(memory.trace(), ["first", "second", "third"]);
    }

    #[test]
    fn test_revert_removes_exactly_last_n() {
        let mut memory = memory();
        for entry in ["a", "b", "c", "d"] {
            memory.append(entry);
        }
        memory.revert(2).unwrap();
        assert_eq!(memory.trace(), ["a", "b"]);
    }

    #[test]
    fn test_revert_underflow_leaves_trace_unchanged() {
        let mut memory = memory();
        memory.append("only");
        let err = memory.revert(2).unwrap_err();
        assert_eq!(
            err,
            MemoryError::HistoryUnderflow {
                requested: 2,
                available: 1,
            }
        );
        assert_eq!(memory.trace(), ["only"]);
    }

    #[test]
    fn test_revert_full_length_is_allowed() {
        let mut memory = memory();
        memory.append("a");
        memory.append("b");
        memory.revert(2).unwrap();
        assert!(memory.trace().is_empty());
    }

    #[test]
    fn test_clear_keeps_objective_and_note() {
        let mut memory = memory();
        memory.set_objective("Find file");
        memory.set_note("half done");
        memory.append("step");
        memory.clear();
        assert!(memory.trace().is_empty());
        assert_eq!(memory.objective(), "Find file");
        assert_eq!(memory.note(), "half done");
    }

    #[test]
    fn test_empty_trace_renders_template() {
        let mut memory = memory();
        memory.set_objective("Find file");
        memory.set_note("N/A");
        let rendered = memory.render_context(1000);
        assert_eq!(
            rendered,
            "The Objective is from the perspective of the User\nObjective: Find file\nNote: N/A\n"
        );
    }

    #[test]
    fn test_single_chunk_rendered_without_budget_search() {
        let mut memory = memory();
        memory.append("Listed /home");
        // One chunk: returned even under an impossible budget.
        let rendered = memory.render_context(0);
        assert!(rendered.ends_with("Listed /home"));
    }

    #[test]
    fn test_tiny_budget_falls_back_to_empty_window() {
        let mut memory = memory_with_chunk_size(10);
        memory.append("Listed /home");
        memory.append("Created /home/x");
        let rendered = memory.render_context(1);
        assert_eq!(rendered, memory.render_context(0));
        assert!(!rendered.contains("Listed"));
        assert!(!rendered.contains("Created"));
    }

    #[test]
    fn test_large_budget_includes_full_trace() {
        let mut memory = memory_with_chunk_size(16);
        for i in 0..10 {
            memory.append(format!("performed step {i}"));
        }
        let rendered = memory.render_context(100_000);
        assert!(rendered.contains("performed step 0"));
        assert!(rendered.contains("performed step 9"));
    }

    #[test]
    fn test_window_is_a_suffix() {
        let mut memory = memory_with_chunk_size(24);
        for i in 0..20 {
            memory.append(format!("step number {i:02} done"));
        }
        // Budgets from tiny to huge: whenever any step is present, every
        // newer step must be present too.
        for budget in [1, 20, 40, 60, 120, 100_000] {
            let rendered = memory.render_context(budget);
            let included: Vec<usize> = (0..20)
                .filter(|i| rendered.contains(&format!("step number {i:02} done")))
                .collect();
            if let Some(&oldest) = included.first() {
                assert_eq!(included, (oldest..20).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_included_text_monotone_in_budget() {
        let mut memory = memory_with_chunk_size(24);
        for i in 0..20 {
            memory.append(format!("step number {i:02} done"));
        }
        let mut last_len = 0;
        for budget in (0..400).step_by(10) {
            let rendered = memory.render_context(budget);
            assert!(rendered.len() >= last_len, "window shrank at budget {budget}");
            last_len = rendered.len();
        }
    }

    #[test]
    fn test_objective_length_eats_into_budget() {
        let long_objective = "x".repeat(600);
        let mut with_long = memory_with_chunk_size(20);
        let mut with_short = memory_with_chunk_size(20);
        with_long.set_objective(long_objective);
        with_short.set_objective("short");
        for i in 0..10 {
            with_long.append(format!("performed step {i}"));
            with_short.append(format!("performed step {i}"));
        }
        let budget = 120;
        let long_render = with_long.render_context(budget);
        let short_render = with_short.render_context(budget);
        let count = |s: &str| {
            (0..10)
                .filter(|i| s.contains(&format!("performed step {i}")))
                .count()
        };
        assert!(count(&long_render) < count(&short_render));
    }

    #[test]
    fn test_context_for_prompt_deducts_prompt_tokens() {
        let mut memory = memory_with_chunk_size(20);
        for i in 0..10 {
            memory.append(format!("performed step {i}"));
        }
        let total = 150;
        let with_prompt = memory.context_for_prompt(&"p".repeat(300), total);
        let without_prompt = memory.context_for_prompt("", total);
        assert!(with_prompt.len() <= without_prompt.len());
    }

    #[test]
    fn test_context_for_prompt_saturates_at_zero() {
        let mut memory = memory_with_chunk_size(10);
        memory.append("Listed /home");
        memory.append("Created /home/x");
        // Prompt alone exceeds the total budget: degenerate empty-window
        // rendering comes back rather than a panic or an error.
        let rendered = memory.context_for_prompt(&"p".repeat(10_000), 50);
        assert!(!rendered.contains("Listed"));
        assert!(rendered.starts_with("The Objective is from the perspective of the User"));
    }
}
