//! Draftpad - a toolbar-driven post composer with an HTML preview
//!
//! The crate splits into three layers:
//! - [`core`] holds the composing engine: a markdown text buffer with
//!   toolbar actions, selection tracking, undo history and HTML
//!   serialization.
//! - [`dom`] parses saved HTML snapshots into a small arena DOM.
//! - [`ui`] renders the editor surface and the saved-post preview with egui.

pub mod app;
pub mod core;
pub mod dom;
pub mod ui;
