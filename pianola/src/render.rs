//! Terminal output for playback frames.
//!
//! The renderer owns the sink and the theme.  Everything it prints is
//! transcript and stays on screen, except the transient part of each
//! frame (scope panel, advance prompt) whose height it reports through
//! [`FrameMetrics`]; [`Renderer::retreat`] erases exactly that many lines
//! before the next step is drawn.

use std::io::{self, Write};

use crossterm::{cursor, queue, terminal};
use tracing::debug;

use crate::scope::Scope;
use crate::theme::Theme;
use crate::value::Value;

/// Fallback width when the sink is not a terminal.
const DEFAULT_WIDTH: usize = 80;

/// Line count of the transient part of the frame just drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMetrics {
    /// Lines the scope panel occupied: zero for an empty scope, otherwise
    /// the rule, the heading, and one line per binding.
    pub panel_lines: usize,
}

impl FrameMetrics {
    /// The advance prompt adds one transient line in interactive sessions.
    pub const PROMPT_LINES: usize = 1;

    /// How many lines to erase before redrawing.
    pub fn erase_lines(&self, interactive: bool) -> usize {
        if interactive {
            self.panel_lines + Self::PROMPT_LINES
        } else {
            self.panel_lines
        }
    }
}

/// Writes playback frames to a terminal (or any sink).
pub struct Renderer {
    out: Box<dyn Write>,
    theme: Theme,
    fixed_width: Option<usize>,
}

impl Renderer {
    pub fn new(out: impl Write + 'static, theme: Theme) -> Self {
        Self {
            out: Box::new(out),
            theme,
            fixed_width: None,
        }
    }

    /// Pin the width instead of asking the terminal.  For tests and
    /// non-terminal sinks.
    pub fn with_width(mut self, width: usize) -> Self {
        self.fixed_width = Some(width);
        self
    }

    /// Current width, re-queried per frame so a resize takes effect on the
    /// next redraw.
    fn width(&self) -> usize {
        match self.fixed_width {
            Some(w) => w,
            None => terminal::size()
                .map(|(w, _)| w as usize)
                .unwrap_or(DEFAULT_WIDTH),
        }
    }

    /// Identity line plus a rule underneath; printed once per session.
    pub fn banner(&mut self, identity: &str) -> io::Result<()> {
        writeln!(self.out, "{}", self.theme.banner(identity))?;
        self.rule()
    }

    /// Horizontal rule on its own line.
    pub fn rule(&mut self) -> io::Result<()> {
        let width = self.width();
        writeln!(self.out, "{}", self.theme.rule(width))
    }

    pub fn blank_line(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// Echo a step the way an interpreter would: `>>>` ahead of the first
    /// line, `...` ahead of continuations, comment tails dimmed from the
    /// first `#` to the end of the line.
    pub fn step_text(&mut self, text: &str) -> io::Result<()> {
        for (i, line) in text.lines().enumerate() {
            let marker = self.theme.step_marker(i == 0);
            match line.split_once('#') {
                Some((head, tail)) => {
                    let comment = self.theme.comment(&format!("#{tail}"));
                    writeln!(self.out, "{marker} {head}{comment}")?;
                }
                None => writeln!(self.out, "{marker} {line}")?,
            }
        }
        Ok(())
    }

    /// Result line(s), wrapped to the width.
    pub fn value(&mut self, value: &Value) -> io::Result<()> {
        let width = self.width();
        for row in wrap(&value.to_string(), width) {
            writeln!(self.out, "{}", self.theme.value(&row))?;
        }
        Ok(())
    }

    /// Diagnostic line.
    pub fn error(&mut self, diagnostic: &str) -> io::Result<()> {
        writeln!(self.out, "{}", self.theme.error(diagnostic))
    }

    /// Draw the scope panel: a rule, the `Locals` heading, and one row per
    /// binding, starring names in `dirty`.  Returns the metrics the caller
    /// needs to erase the panel later.
    pub fn scope_panel(&mut self, scope: &Scope, dirty: &[String]) -> io::Result<FrameMetrics> {
        if scope.is_empty() {
            return Ok(FrameMetrics { panel_lines: 0 });
        }
        let width = self.width();
        self.rule()?;
        writeln!(self.out, "{}", self.theme.header("Locals"))?;
        let mut lines = 2;
        for (name, value) in scope.iter() {
            let budget = width.saturating_sub(name.chars().count() + 3);
            let shown = shorten(&value.to_string(), budget);
            let mark = self.theme.changed_mark(dirty.iter().any(|d| d == name));
            writeln!(self.out, "{mark}{} = {shown}", self.theme.name(name))?;
            lines += 1;
        }
        debug!(lines, "drew scope panel");
        Ok(FrameMetrics { panel_lines: lines })
    }

    /// Print the advance prompt and flush, leaving the cursor on the line.
    pub fn prompt(&mut self) -> io::Result<()> {
        let text = self.theme.prompt("(q to quit, anything else to continue):");
        write!(self.out, "{text} ")?;
        self.out.flush()
    }

    /// Erase the last `lines` lines by moving up and clearing to the end
    /// of the screen.  A zero count leaves the transcript untouched.
    pub fn retreat(&mut self, lines: usize) -> io::Result<()> {
        if lines == 0 {
            return Ok(());
        }
        debug!(lines, "erasing frame");
        let rows = u16::try_from(lines).unwrap_or(u16::MAX);
        queue!(
            self.out,
            cursor::MoveUp(rows),
            terminal::Clear(terminal::ClearType::FromCursorDown)
        )?;
        self.out.flush()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Hard-wrap to `width` columns, preserving embedded newlines.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for line in text.split('\n') {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            rows.push(String::new());
            continue;
        }
        for piece in chars.chunks(width) {
            rows.push(piece.iter().collect());
        }
    }
    rows
}

/// Collapse whitespace runs and clip to `width`, appending `...` when
/// content was dropped.  Prefers word boundaries.
fn shorten(text: &str, width: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }
    let mut out = String::new();
    for w in &words {
        let sep = usize::from(!out.is_empty());
        if out.chars().count() + sep + w.chars().count() + 3 > width {
            break;
        }
        if sep == 1 {
            out.push(' ');
        }
        out.push_str(w);
    }
    if out.is_empty() {
        // Not even the first word fits next to the ellipsis.
        out = collapsed.chars().take(width.saturating_sub(3)).collect();
    }
    out.push_str("...");
    out.chars().take(width).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
