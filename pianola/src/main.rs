use std::fs;
use std::io;
use std::process;
use std::sync::Mutex;

use tracing::{debug, Level};

use pianola::cli;
use pianola::eval::ExprEvaluator;
use pianola::extract;
use pianola::render::Renderer;
use pianola::session::{Player, Wait};
use pianola::theme::Theme;

fn main() {
    // ── Arguments ─────────────────────────────────────────────────────────────
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("pianola: {e}");
            eprintln!("{}", cli::USAGE);
            process::exit(1);
        }
    };

    // ── Debug logging (-l<file>) ──────────────────────────────────────────────
    // The log path is resolved before any -w chdir takes effect.
    if let Some(path) = &args.log {
        let file = match fs::File::create(path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("pianola: cannot open log {}: {e}", path.display());
                process::exit(1);
            }
        };
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }

    // ── Styling: colour only when stdout is a terminal ────────────────────────
    let is_tty = unsafe { libc::isatty(libc::STDOUT_FILENO) != 0 };
    let theme = if is_tty { Theme::ansi() } else { Theme::plain() };

    // ── Working directory (-w<dir>) ───────────────────────────────────────────
    if let Some(dir) = &args.work_dir {
        println!(
            "{}",
            theme.banner(&format!("Changing directory to {}", dir.display()))
        );
        if let Err(e) = std::env::set_current_dir(dir) {
            eprintln!("pianola: cannot change directory to {}: {e}", dir.display());
            process::exit(1);
        }
    }

    // ── Script ────────────────────────────────────────────────────────────────
    let mut source = match fs::read_to_string(&args.script) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("pianola: cannot read {}: {e}", args.script.display());
            process::exit(1);
        }
    };
    if extract::is_markup(&args.script) {
        source = match extract::extract_steps(&source, extract::FENCE_TAGS) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("pianola: {e}");
                process::exit(1);
            }
        };
    }
    debug!(script = %args.script.display(), bytes = source.len(), "loaded script");

    // ── Playback ──────────────────────────────────────────────────────────────
    let wait = match args.timer {
        Some(pause) => Wait::Timer(pause),
        None => Wait::Interactive,
    };
    let renderer = Renderer::new(io::stdout(), theme);
    let mut player = Player::new(renderer, ExprEvaluator::new(), io::stdin().lock(), wait);
    match player.run(&source) {
        Ok(ending) => debug!(?ending, "session over"),
        Err(e) => {
            eprintln!("pianola: {e}");
            process::exit(1);
        }
    }
}
