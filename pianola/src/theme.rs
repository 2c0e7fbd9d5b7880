//! Color and attribute palette for playback output.
//!
//! Styling is decided once at startup and threaded through the renderer;
//! nothing consults the environment at print time.  The plain variant
//! keeps output byte-stable for pipes and tests.

use crossterm::style::{Attribute, Attributes, Color, ContentStyle};

fn style(fg: Option<Color>, attrs: &[Attribute]) -> ContentStyle {
    let mut style = ContentStyle::new();
    style.foreground_color = fg;
    let mut attributes = Attributes::default();
    for a in attrs {
        attributes.set(*a);
    }
    style.attributes = attributes;
    style
}

fn fg(color: Color) -> ContentStyle {
    style(Some(color), &[])
}

/// Styles for every piece of playback output.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    enabled: bool,
    marker: ContentStyle,
    comment: ContentStyle,
    value: ContentStyle,
    error: ContentStyle,
    rule: ContentStyle,
    header: ContentStyle,
    name: ContentStyle,
    mark: ContentStyle,
    banner: ContentStyle,
    prompt: ContentStyle,
}

impl Theme {
    /// Full-color palette for interactive terminals.
    pub fn ansi() -> Self {
        Self {
            enabled: true,
            marker: fg(Color::Magenta),
            comment: style(None, &[Attribute::Dim, Attribute::Italic]),
            value: fg(Color::DarkBlue),
            error: fg(Color::DarkRed),
            rule: style(Some(Color::Grey), &[Attribute::Dim, Attribute::Underlined]),
            header: fg(Color::Blue),
            name: fg(Color::DarkRed),
            mark: style(None, &[Attribute::Bold]),
            banner: style(Some(Color::Grey), &[Attribute::Italic]),
            prompt: fg(Color::DarkGreen),
        }
    }

    /// No styling at all; every painter returns its text untouched.
    pub fn plain() -> Self {
        Self {
            enabled: false,
            ..Self::ansi()
        }
    }

    fn paint(&self, style: ContentStyle, text: &str) -> String {
        if self.enabled {
            style.apply(text).to_string()
        } else {
            text.to_owned()
        }
    }

    /// `>>>` for the first line of a step, `...` for continuation lines.
    pub fn step_marker(&self, first: bool) -> String {
        self.paint(self.marker, if first { ">>>" } else { "..." })
    }

    /// Comment tail of a step line, from the `#` to the end of the line.
    pub fn comment(&self, text: &str) -> String {
        self.paint(self.comment, text)
    }

    /// Expression result line.
    pub fn value(&self, text: &str) -> String {
        self.paint(self.value, text)
    }

    /// Diagnostic line.
    pub fn error(&self, text: &str) -> String {
        self.paint(self.error, text)
    }

    /// Horizontal rule: underlined blanks in color, dashes when plain
    /// (underlined spaces are invisible without escape codes).
    pub fn rule(&self, width: usize) -> String {
        if self.enabled {
            self.paint(self.rule, &" ".repeat(width))
        } else {
            "-".repeat(width)
        }
    }

    /// Scope panel heading.
    pub fn header(&self, text: &str) -> String {
        self.paint(self.header, text)
    }

    /// Variable name in the scope panel.
    pub fn name(&self, text: &str) -> String {
        self.paint(self.name, text)
    }

    /// `*` ahead of names assigned since the previous frame, a blank
    /// column otherwise.
    pub fn changed_mark(&self, changed: bool) -> String {
        if changed {
            self.paint(self.mark, "*")
        } else {
            " ".to_owned()
        }
    }

    /// Session banner and other announcements.
    pub fn banner(&self, text: &str) -> String {
        self.paint(self.banner, text)
    }

    /// Advance prompt.
    pub fn prompt(&self, text: &str) -> String {
        self.paint(self.prompt, text)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_is_passthrough() {
        let theme = Theme::plain();
        assert_eq!(theme.step_marker(true), ">>>");
        assert_eq!(theme.step_marker(false), "...");
        assert_eq!(theme.value("42"), "42");
        assert_eq!(theme.error("boom"), "boom");
        assert_eq!(theme.changed_mark(true), "*");
        assert_eq!(theme.changed_mark(false), " ");
    }

    #[test]
    fn ansi_emits_escapes() {
        let theme = Theme::ansi();
        let painted = theme.value("42");
        assert!(painted.contains("42"));
        assert!(painted.contains('\x1b'));
        // Unchanged names still get their alignment column.
        assert_eq!(theme.changed_mark(false), " ");
    }

    #[test]
    fn rule_spans_the_width() {
        assert_eq!(Theme::plain().rule(8), "--------");
        let painted = Theme::ansi().rule(8);
        assert!(painted.contains("        "));
    }
}
