pub mod editor;
pub mod preview;
