//! The playback loop.
//!
//! One synchronous loop owns every component: it pulls chunks from the
//! reader, presents them, waits for the operator, and erases the
//! transient part of the frame before moving on.  Nothing here is
//! concurrent; the loop holds exclusive ownership of the scope, the
//! renderer, and the operator input.

use std::io::{self, BufRead};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::chunk::{Chunk, ChunkReader, Directive, Step};
use crate::eval::{EvalOutcome, Evaluator};
use crate::render::{FrameMetrics, Renderer};
use crate::scope::Scope;

/// How the session advances from one step to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// Prompt the operator after every step.
    Interactive,
    /// Sleep between steps; no operator involved.
    Timer(Duration),
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// The script ran out of chunks.
    Finished,
    /// The operator asked to stop.
    Quit,
}

enum Signal {
    Advance,
    Quit,
}

/// Drives one demo from source text to an [`Ending`].
pub struct Player<E, In> {
    renderer: Renderer,
    evaluator: E,
    input: In,
    wait: Wait,
    scope: Scope,
}

impl<E: Evaluator, In: BufRead> Player<E, In> {
    pub fn new(renderer: Renderer, evaluator: E, input: In, wait: Wait) -> Self {
        Self {
            renderer,
            evaluator,
            input,
            wait,
            scope: Scope::new(),
        }
    }

    /// Bindings accumulated so far.  Mostly useful to tests.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Play the whole source.  Only sink and operator-input failures end
    /// the session early; step failures are part of the show.
    pub fn run(&mut self, source: &str) -> io::Result<Ending> {
        self.renderer.banner(&self.evaluator.banner())?;
        let interactive = matches!(self.wait, Wait::Interactive);
        for chunk in ChunkReader::new(source.chars()) {
            match chunk {
                Chunk::Directive(directive) => self.apply_directive(directive)?,
                Chunk::Step(step) => {
                    let metrics = self.present(&step)?;
                    match self.wait_for_advance()? {
                        Signal::Quit => {
                            debug!("operator quit");
                            return Ok(Ending::Quit);
                        }
                        Signal::Advance => {
                            self.renderer.retreat(metrics.erase_lines(interactive))?;
                        }
                    }
                }
            }
        }
        // The exhausted script leaves its final scope on screen.
        let dirty = self.scope.flush_dirty();
        self.renderer.scope_panel(&self.scope, &dirty)?;
        self.renderer.flush()?;
        Ok(Ending::Finished)
    }

    /// One frame: step text, its outcome, and the scope panel.
    fn present(&mut self, step: &Step) -> io::Result<FrameMetrics> {
        debug!(index = step.index, text = %step.text, "presenting step");
        self.renderer.step_text(&step.text)?;
        match self.evaluator.evaluate(&step.text, &mut self.scope) {
            EvalOutcome::Value(v) => self.renderer.value(&v)?,
            EvalOutcome::NoValue => {}
            EvalOutcome::Error(e) => {
                debug!(diagnostic = %e, "step failed");
                self.renderer.error(&e)?;
            }
        }
        let dirty = self.scope.flush_dirty();
        self.renderer.scope_panel(&self.scope, &dirty)
    }

    /// Directives take effect immediately, with no wait and no erase.
    fn apply_directive(&mut self, directive: Directive) -> io::Result<()> {
        debug!(?directive, "applying directive");
        match directive {
            Directive::ClearSilent => self.scope.clear(),
            Directive::ClearWithDivider => {
                self.scope.clear();
                self.renderer.rule()?;
            }
            Directive::Divider => self.renderer.rule()?,
            Directive::Blank => self.renderer.blank_line()?,
        }
        Ok(())
    }

    fn wait_for_advance(&mut self) -> io::Result<Signal> {
        match self.wait {
            Wait::Timer(pause) => {
                self.renderer.flush()?;
                thread::sleep(pause);
                Ok(Signal::Advance)
            }
            Wait::Interactive => {
                self.renderer.prompt()?;
                let mut line = String::new();
                let n = self.input.read_line(&mut line)?;
                // EOF on the operator stream means quit.
                if n == 0 || line.trim().eq_ignore_ascii_case("q") {
                    return Ok(Signal::Quit);
                }
                Ok(Signal::Advance)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::ExprEvaluator;
    use crate::theme::Theme;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    fn run_timer(source: &str) -> (String, Ending) {
        let buf = SharedBuf::default();
        let renderer = Renderer::new(buf.clone(), Theme::plain()).with_width(32);
        let mut player = Player::new(
            renderer,
            ExprEvaluator::new(),
            io::empty(),
            Wait::Timer(Duration::ZERO),
        );
        let ending = player.run(source).expect("run failed");
        (buf.contents(), ending)
    }

    fn run_interactive(source: &str, keys: &str) -> (String, Ending) {
        let buf = SharedBuf::default();
        let renderer = Renderer::new(buf.clone(), Theme::plain()).with_width(32);
        let mut player = Player::new(
            renderer,
            ExprEvaluator::new(),
            io::Cursor::new(keys.to_string()),
            Wait::Interactive,
        );
        let ending = player.run(source).expect("run failed");
        (buf.contents(), ending)
    }

    #[test]
    fn transcript_shows_steps_and_values() {
        let (out, ending) = run_timer("x = 6\nx * 7\n");
        assert_eq!(ending, Ending::Finished);
        assert!(out.contains(">>> x = 6\n"), "{out}");
        assert!(out.contains(">>> x * 7\n42\n"), "{out}");
    }

    #[test]
    fn banner_comes_first() {
        let (out, _) = run_timer("1\n");
        assert!(out.starts_with("pianola "), "{out}");
    }

    #[test]
    fn step_failures_keep_playing() {
        let (out, ending) = run_timer("boom + 1\ndone = 1\n");
        assert_eq!(ending, Ending::Finished);
        assert!(out.contains("name \"boom\" is not defined"), "{out}");
        assert!(out.contains("done = 1"), "{out}");
    }

    #[test]
    fn quit_stops_before_the_next_step() {
        let (out, ending) = run_interactive("1 + 1\n2 + 2\n", "q\n");
        assert_eq!(ending, Ending::Quit);
        assert!(out.contains(">>> 1 + 1\n"), "{out}");
        assert!(!out.contains(">>> 2 + 2"), "{out}");
    }

    #[test]
    fn quit_token_is_trimmed_and_case_folded() {
        for keys in ["Q\n", "  q  \n", "\tQ\t\n"] {
            let (_, ending) = run_interactive("1\n2\n", keys);
            assert_eq!(ending, Ending::Quit, "keys {keys:?}");
        }
        let (_, ending) = run_interactive("1\n", "qq\n");
        assert_eq!(ending, Ending::Finished);
    }

    #[test]
    fn eof_on_operator_stream_quits() {
        let (_, ending) = run_interactive("1\n2\n", "");
        assert_eq!(ending, Ending::Quit);
    }

    #[test]
    fn directives_never_prompt() {
        // Empty operator stream: any prompt would turn into a quit.
        let (out, ending) = run_interactive("# ---\n#\n", "");
        assert_eq!(ending, Ending::Finished);
        assert!(!out.contains("(q to quit"), "{out}");
        // Banner rule plus the divider directive.
        assert_eq!(out.matches(&"-".repeat(32)).count(), 2, "{out}");
    }

    #[test]
    fn clear_directive_forgets_bindings() {
        let (out, _) = run_timer("x = 1\n# ^^^ clear ^^^\ny = 2\n");
        let final_panel = out.rsplit("Locals").next().unwrap();
        assert!(final_panel.contains("y = 2"), "{out}");
        assert!(!final_panel.contains("x = 1"), "{out}");
    }

    #[test]
    fn clear_with_divider_prints_a_rule() {
        let (out, _) = run_timer("x = 1\n# --- clear ---\n");
        // Banner rule, one in-loop panel rule, the directive rule.
        assert_eq!(out.matches(&"-".repeat(32)).count(), 3, "{out}");
        // The cleared scope suppresses the final panel.
        assert_eq!(out.matches("Locals").count(), 1, "{out}");
    }

    #[test]
    fn erase_covers_panel_and_prompt_when_interactive() {
        let (out, _) = run_interactive("x = 1\n", "\n");
        // Panel is 3 lines (rule, heading, one binding) plus the prompt.
        assert!(out.contains("\x1b[4A"), "{out:?}");
        assert!(out.contains("\x1b[J"), "{out:?}");
    }

    #[test]
    fn erase_covers_only_the_panel_on_a_timer() {
        let (out, _) = run_timer("x = 1\n1 + 1\n");
        assert!(out.contains("\x1b[3A"), "{out:?}");
    }

    #[test]
    fn nothing_to_erase_emits_no_escapes() {
        // Scope stays empty, so the frame has no transient lines at all.
        let (out, _) = run_timer("1 + 1\n");
        assert!(!out.contains('\x1b'), "{out:?}");
    }

    #[test]
    fn final_panel_is_rendered_again_after_the_last_step() {
        let (out, _) = run_timer("x = 1\n");
        assert_eq!(out.matches("Locals").count(), 2, "{out}");
        // The in-loop panel starred the fresh binding; the final one does not.
        assert!(out.contains("*x = 1"), "{out}");
        assert!(out.contains(" x = 1"), "{out}");
    }

    #[test]
    fn directives_do_not_reach_the_evaluator() {
        #[derive(Clone, Default)]
        struct CountingEval(Arc<Mutex<usize>>);

        impl Evaluator for CountingEval {
            fn banner(&self) -> String {
                "counting".into()
            }
            fn evaluate(&mut self, _text: &str, _scope: &mut Scope) -> EvalOutcome {
                *self.0.lock().unwrap() += 1;
                EvalOutcome::NoValue
            }
        }

        let buf = SharedBuf::default();
        let calls = CountingEval::default();
        let seen = calls.clone();
        let renderer = Renderer::new(buf.clone(), Theme::plain()).with_width(32);
        let mut player = Player::new(renderer, calls, io::empty(), Wait::Timer(Duration::ZERO));
        player
            .run("# ---\n#\n# ^^^ clear ^^^\n# --- clear ---\n")
            .expect("run failed");
        assert_eq!(*seen.0.lock().unwrap(), 0);

        player.run("1 + 1\n# ---\n2 + 2\n").expect("run failed");
        assert_eq!(*seen.0.lock().unwrap(), 2);
    }

    #[test]
    fn scope_is_observable_after_a_run() {
        let buf = SharedBuf::default();
        let renderer = Renderer::new(buf.clone(), Theme::plain()).with_width(32);
        let mut player = Player::new(
            renderer,
            ExprEvaluator::new(),
            io::empty(),
            Wait::Timer(Duration::ZERO),
        );
        player.run("x = 2\nx *= 10\n").expect("run failed");
        assert_eq!(
            player.scope().get("x"),
            Some(&crate::value::Value::Int(20))
        );
    }
}
