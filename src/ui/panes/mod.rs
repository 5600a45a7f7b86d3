//! TUI pane rendering modules
//!
//! - [`source`]: program text with the instruction under the program counter
//! - [`tape`]: hex view of the tape with the data pointer highlighted
//! - [`output`]: stdout and stderr channels
//! - [`status`]: status bar with keybindings and session state
//!
//! Each pane module exports a stateless `render_*` function; scroll offsets
//! live in [`crate::ui::App`].

pub mod output;
pub mod source;
pub mod status;
pub mod tape;

pub use output::render_output_pane;
pub use source::render_source_pane;
pub use status::render_status_bar;
pub use tape::render_tape_pane;
