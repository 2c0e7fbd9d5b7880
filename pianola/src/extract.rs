//! Pulling demo steps out of Markdown documents.
//!
//! A `.md` source plays the code inside fenced blocks tagged with one of
//! the recognized language tags; the prose around them is dropped, and
//! each fence boundary becomes a divider in the playback stream.

use std::path::Path;

use regex::Regex;

use crate::chunk::Directive;

/// Fence tags whose blocks are played.
pub const FENCE_TAGS: &[&str] = &["pianola", "step"];

/// True when the path should be treated as a Markdown document.
pub fn is_markup(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some(ext) if ext.eq_ignore_ascii_case("md")
    )
}

/// Extract the playable script from a Markdown document.
///
/// Blocks are joined with a divider directive, so playback shows a rule
/// where the prose used to be.
pub fn extract_steps(doc: &str, tags: &[&str]) -> Result<String, String> {
    let alts: Vec<String> = tags.iter().map(|t| regex::escape(t)).collect();
    let pattern = format!(r"(?s)```(?:{})[ \t]*\r?\n(.*?)```", alts.join("|"));
    let re = Regex::new(&pattern).map_err(|e| format!("bad fence pattern: {e}"))?;
    let blocks: Vec<&str> = re
        .captures_iter(doc)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    Ok(blocks.join(&format!("\n{}\n", Directive::Divider.sentinel())))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulls_tagged_blocks() {
        let doc = "\
# A demo

Some prose.

```pianola
x = 1
```

More prose.

```step
x + 1
```
";
        let script = extract_steps(doc, FENCE_TAGS).unwrap();
        assert_eq!(script, "x = 1\n\n# ---\nx + 1\n");
    }

    #[test]
    fn ignores_other_fences() {
        let doc = "\
```rust
fn main() {}
```

```pianola
y = 2
```

```
plain fence
```

```PIANOLA
case matters
```
";
        let script = extract_steps(doc, FENCE_TAGS).unwrap();
        assert_eq!(script, "y = 2\n");
    }

    #[test]
    fn tag_prefixes_do_not_match() {
        let doc = "```stepper\nnot ours\n```\n";
        assert_eq!(extract_steps(doc, FENCE_TAGS).unwrap(), "");
    }

    #[test]
    fn no_blocks_yields_empty_script() {
        assert_eq!(extract_steps("just prose\n", FENCE_TAGS).unwrap(), "");
    }

    #[test]
    fn crlf_after_tag() {
        let doc = "```pianola\r\nz = 3\r\n```\r\n";
        assert_eq!(extract_steps(doc, FENCE_TAGS).unwrap(), "z = 3\r\n");
    }

    #[test]
    fn markup_paths() {
        assert!(is_markup(Path::new("demo.md")));
        assert!(is_markup(Path::new("demo.MD")));
        assert!(!is_markup(Path::new("demo.step")));
        assert!(!is_markup(Path::new("demo")));
    }
}
