use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;

use pianola::chunk::{Chunk, ChunkReader};
use pianola::eval::{EvalOutcome, Evaluator, ExprEvaluator};
use pianola::render::Renderer;
use pianola::scope::Scope;
use pianola::theme::Theme;
use pianola::{Ending, Player, Value, Wait};

// ── Helpers ───────────────────────────────────────────────────────────────────

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

/// Scripts as (indented?, word) lines.  Lowercase words can never form a
/// directive sentinel, and there are no blank lines to be trimmed away.
fn script_lines() -> impl Strategy<Value = Vec<(bool, String)>> {
    proptest::collection::vec((any::<bool>(), "[a-z]{1,8}"), 1..40)
}

proptest! {
    /// A chunk starts at column zero, keeps its continuation lines indented,
    /// and rejoining all chunks reproduces the source.
    #[test]
    fn chunks_rejoin_into_the_source(lines in script_lines()) {
        let mut source = String::new();
        for (i, (indent, word)) in lines.iter().enumerate() {
            if *indent && i > 0 {
                source.push_str("  ");
            }
            source.push_str(word);
            source.push('\n');
        }

        let steps: Vec<String> = ChunkReader::new(source.chars())
            .map(|chunk| match chunk {
                Chunk::Step(step) => step.text,
                Chunk::Directive(_) => unreachable!("lowercase lines cannot be directives"),
            })
            .collect();

        for text in &steps {
            let mut ls = text.lines();
            let head = ls.next().unwrap();
            prop_assert!(!head.starts_with(' ') && !head.starts_with('\t'));
            for continuation in ls {
                prop_assert!(continuation.starts_with(' '));
            }
        }
        prop_assert_eq!(steps.join("\n"), source.trim_end());
    }
}

proptest! {
    /// The chunker accepts arbitrary input, never yields an empty step, and
    /// numbers steps densely while skipping directives.
    #[test]
    fn chunker_survives_anything(s in "\\PC*") {
        let mut next_ordinal = 0;
        for chunk in ChunkReader::new(s.chars()) {
            match chunk {
                Chunk::Step(step) => {
                    prop_assert_eq!(step.index, next_ordinal);
                    prop_assert!(!step.text.trim().is_empty());
                    next_ordinal += 1;
                }
                Chunk::Directive(_) => {}
            }
        }
    }
}

proptest! {
    /// The panel occupies zero lines for an empty scope, otherwise a rule, a
    /// heading, and one line per binding; the metrics agree with the sink
    /// whether or not the theme styles the text.
    #[test]
    fn panel_line_count_follows_the_scope(n in 0usize..12) {
        for theme in [Theme::plain(), Theme::ansi()] {
            let buf = SharedBuf::default();
            let mut renderer = Renderer::new(buf.clone(), theme).with_width(40);
            let mut scope = Scope::new();
            for i in 0..n {
                scope.set(format!("v{i}"), Value::Int(i as i64));
            }
            let dirty = scope.flush_dirty();
            let metrics = renderer.scope_panel(&scope, &dirty).unwrap();
            let want = if n == 0 { 0 } else { n + 2 };
            prop_assert_eq!(metrics.panel_lines, want);
            prop_assert_eq!(buf.contents().lines().count(), want);
        }
    }
}

proptest! {
    /// Integer arithmetic in a step agrees with the host.
    #[test]
    fn integer_arithmetic_matches_the_host(a in -10_000i64..10_000, b in -10_000i64..10_000) {
        let mut scope = Scope::new();
        let mut eval = ExprEvaluator::new();
        let sum = eval.evaluate(&format!("{a} + {b}"), &mut scope);
        prop_assert_eq!(sum, EvalOutcome::Value(Value::Int(a + b)));
        let product = eval.evaluate(&format!("{a} * {b}"), &mut scope);
        prop_assert_eq!(product, EvalOutcome::Value(Value::Int(a * b)));
    }
}

proptest! {
    /// The quit token survives any surrounding whitespace and either case.
    #[test]
    fn padded_quit_tokens_always_quit(
        pad_l in "[ \t]{0,4}",
        pad_r in "[ \t]{0,4}",
        upper in any::<bool>(),
    ) {
        let q = if upper { "Q" } else { "q" };
        let keys = format!("{pad_l}{q}{pad_r}\n");
        let buf = SharedBuf::default();
        let renderer = Renderer::new(buf.clone(), Theme::plain()).with_width(32);
        let mut player = Player::new(
            renderer,
            ExprEvaluator::new(),
            Cursor::new(keys),
            Wait::Interactive,
        );
        let ending = player.run("1\n2\n").unwrap();
        prop_assert_eq!(ending, Ending::Quit);
    }
}

proptest! {
    /// Timer sessions always play every step to the end.
    #[test]
    fn timer_sessions_always_finish(lines in script_lines()) {
        let mut source = String::new();
        for (i, (indent, word)) in lines.iter().enumerate() {
            if *indent && i > 0 {
                source.push_str("  ");
            }
            source.push_str(word);
            source.push('\n');
        }
        let buf = SharedBuf::default();
        let renderer = Renderer::new(buf.clone(), Theme::plain()).with_width(48);
        let mut player = Player::new(
            renderer,
            ExprEvaluator::new(),
            io::empty(),
            Wait::Timer(Duration::ZERO),
        );
        let ending = player.run(&source).unwrap();
        prop_assert_eq!(ending, Ending::Finished);
        prop_assert!(buf.contents().contains(">>> "));
    }
}
