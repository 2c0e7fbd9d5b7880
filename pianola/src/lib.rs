//! Player piano for terminal demos.
//!
//! A demo script is a plain text file of expression steps.  Playback
//! shows each step the way a person at a REPL would have typed it,
//! evaluates it for real, and keeps a panel of accumulated bindings at
//! the bottom of the screen:
//!
//! - [`chunk`] splits the script into steps and `#`-sentinel directives
//! - [`eval`] runs each step against the shared [`scope::Scope`]
//! - [`render`] draws frames and erases their transient lines
//! - [`session`] ties the pieces into the present/wait/erase loop
//! - [`extract`] pulls fenced steps out of markdown documents
//!
//! # Quick start
//!
//! ```rust
//! use pianola::eval::ExprEvaluator;
//! use pianola::render::Renderer;
//! use pianola::{Ending, Player, Wait};
//! use pianola::theme::Theme;
//! use std::time::Duration;
//!
//! let renderer = Renderer::new(std::io::sink(), Theme::plain()).with_width(64);
//! let mut player = Player::new(
//!     renderer,
//!     ExprEvaluator::new(),
//!     std::io::empty(),
//!     Wait::Timer(Duration::ZERO),
//! );
//! let ending = player.run("x = 6\nx * 7").unwrap();
//! assert_eq!(ending, Ending::Finished);
//! ```

pub mod chunk;
pub mod cli;
pub mod eval;
pub mod extract;
pub mod render;
pub mod scope;
pub mod session;
pub mod theme;
pub mod value;

// Re-exports for convenience.
pub use session::{Ending, Player, Wait};
pub use value::Value;
