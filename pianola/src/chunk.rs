//! Streaming segmentation of a demo script into steps and directives.
//!
//! The reader never parses the language.  A chunk ends wherever the next
//! line starts at column zero with a non-whitespace character; indented
//! lines and blank lines extend the current chunk.  That one rule is what
//! lets a multi-line expression travel as a single step.

use tracing::debug;

/// Control line recognized by its exact trimmed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `# ^^^ clear ^^^`: forget all bindings, print nothing.
    ClearSilent,
    /// `# --- clear ---`: forget all bindings and print a divider.
    ClearWithDivider,
    /// `# ---`: print a divider.
    Divider,
    /// `#`: print one blank line.
    Blank,
}

impl Directive {
    /// The directive a trimmed unit stands for, if its text matches a
    /// sentinel exactly.  Anything else, including near-misses, is an
    /// ordinary step.
    pub fn from_step_text(text: &str) -> Option<Directive> {
        match text {
            "# ^^^ clear ^^^" => Some(Directive::ClearSilent),
            "# --- clear ---" => Some(Directive::ClearWithDivider),
            "# ---" => Some(Directive::Divider),
            "#" => Some(Directive::Blank),
            _ => None,
        }
    }

    /// The exact script text that produces this directive.
    pub fn sentinel(self) -> &'static str {
        match self {
            Directive::ClearSilent => "# ^^^ clear ^^^",
            Directive::ClearWithDivider => "# --- clear ---",
            Directive::Divider => "# ---",
            Directive::Blank => "#",
        }
    }
}

/// One executable unit of script text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Trimmed text, possibly spanning several lines.
    pub text: String,
    /// Zero-based ordinal among the executable steps of the stream.
    /// Directives do not consume ordinals.
    pub index: usize,
}

/// What the reader hands the playback loop: either something to evaluate
/// or a control line to apply immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Step(Step),
    Directive(Directive),
}

/// Splits a character stream into [`Chunk`]s.
pub struct ChunkReader<I> {
    source: I,
    buf: String,
    prev: Option<char>,
    steps: usize,
    done: bool,
}

impl<I: Iterator<Item = char>> ChunkReader<I> {
    pub fn new(source: I) -> Self {
        Self {
            source,
            buf: String::new(),
            prev: None,
            steps: 0,
            done: false,
        }
    }

    fn emit(&mut self, text: String) -> Chunk {
        debug!(text = %text, "read chunk");
        match Directive::from_step_text(&text) {
            Some(d) => Chunk::Directive(d),
            None => {
                let step = Step {
                    text,
                    index: self.steps,
                };
                self.steps += 1;
                Chunk::Step(step)
            }
        }
    }
}

impl<I: Iterator<Item = char>> Iterator for ChunkReader<I> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.done {
            return None;
        }
        loop {
            match self.source.next() {
                None => {
                    self.done = true;
                    let text = self.buf.trim().to_owned();
                    self.buf.clear();
                    if text.is_empty() {
                        return None;
                    }
                    return Some(self.emit(text));
                }
                Some(c) => {
                    // A column-zero non-whitespace character right after a
                    // newline closes the buffered unit.
                    let boundary =
                        self.prev == Some('\n') && !matches!(c, ' ' | '\t' | '\n' | '\r');
                    self.prev = Some(c);
                    if boundary {
                        let text = self.buf.trim().to_owned();
                        self.buf.clear();
                        self.buf.push(c);
                        if !text.is_empty() {
                            return Some(self.emit(text));
                        }
                    } else {
                        self.buf.push(c);
                    }
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
