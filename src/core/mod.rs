//! Core functionality: the composer model, its command vocabulary, HTML
//! serialization, and configuration

pub mod action;
pub mod composer;
pub mod config;
pub mod html;
