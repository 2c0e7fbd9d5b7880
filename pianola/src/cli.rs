//! Command-line argument parsing.
//!
//! Usage:
//!   pianola [-w<dir>] [-t<seconds>] [-l<file>] <script>

use std::path::PathBuf;
use std::time::Duration;

// ── Public types ──────────────────────────────────────────────────────────────

/// One-line usage summary, printed alongside argument errors.
pub const USAGE: &str = "usage: pianola [-w <dir>] [-t <seconds>] [-l <file>] <script>";

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Demo script to play (positional).
    pub script: PathBuf,
    /// Directory to change into before playback (`-w<dir>`).
    pub work_dir: Option<PathBuf>,
    /// Seconds between steps; absent means interactive (`-t<seconds>`).
    pub timer: Option<Duration>,
    /// Debug log destination (`-l<file>`).
    pub log: Option<PathBuf>,
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(&raw[1..])
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            i += 1;
            positional.extend(argv[i..].iter().cloned());
            break;
        }

        // Long flags, in `--name value` and `--name=value` forms.
        if let Some(rest) = arg.strip_prefix("--") {
            let (name, inline) = match rest.split_once('=') {
                Some((n, v)) => (n, Some(v.to_owned())),
                None => (rest, None),
            };
            match name {
                "timer" => {
                    let secs = take_value("--timer", inline, argv, &mut i)?;
                    args.timer = Some(parse_interval(&secs)?);
                }
                "work-dir" => {
                    let dir = take_value("--work-dir", inline, argv, &mut i)?;
                    args.work_dir = Some(PathBuf::from(dir));
                }
                "log" => {
                    let file = take_value("--log", inline, argv, &mut i)?;
                    args.log = Some(PathBuf::from(file));
                }
                _ => return Err(format!("unknown option: --{name}")),
            }
            i += 1;
            continue;
        }

        // Non-flag argument.
        if !arg.starts_with('-') || arg == "-" {
            positional.push(arg.to_owned());
            i += 1;
            continue;
        }

        // Flag argument: iterate over characters after the leading `-`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                // -t<seconds>
                't' => {
                    let secs = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len(); // consumed rest of this arg
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-t requires an interval argument".to_owned());
                    };
                    args.timer = Some(parse_interval(&secs)?);
                }

                // -w<dir>
                'w' => {
                    let dir = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-w requires a directory argument".to_owned());
                    };
                    args.work_dir = Some(PathBuf::from(dir));
                }

                // -l<file>
                'l' => {
                    let file = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-l requires a file argument".to_owned());
                    };
                    args.log = Some(PathBuf::from(file));
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    // Exactly one positional argument: the script.
    match positional.len() {
        0 => return Err("missing script path".to_owned()),
        1 => args.script = PathBuf::from(positional.remove(0)),
        n => return Err(format!("too many arguments ({n})")),
    }

    Ok(args)
}

fn take_value(
    name: &str,
    inline: Option<String>,
    argv: &[String],
    i: &mut usize,
) -> Result<String, String> {
    if let Some(v) = inline {
        return Ok(v);
    }
    *i += 1;
    argv.get(*i)
        .cloned()
        .ok_or_else(|| format!("{name} requires a value"))
}

/// Seconds, possibly fractional, as a pause between steps.
fn parse_interval(text: &str) -> Result<Duration, String> {
    let secs: f64 = text
        .parse()
        .map_err(|_| format!("invalid timer interval: {text:?}"))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("invalid timer interval: {text:?}"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
