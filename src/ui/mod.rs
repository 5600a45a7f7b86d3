//! Terminal debugger built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into four layers:
//!
//! - **[`app`]**: application state, keyboard event loop, pane focus and the
//!   cadence loop driving the stepped session
//! - **[`view`]**: the state shown on screen, rebuilt purely from protocol
//!   events
//! - **[`panes`]**: stateless render functions for each visible pane
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with a
//! [`StartRequest`] and call [`App::run`] to start the event loop.
//!
//! [`StartRequest`]: crate::protocol::StartRequest
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;
pub mod view;

pub use app::App;
pub use view::DebugView;
