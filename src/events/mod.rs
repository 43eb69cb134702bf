//! Events delivered by the host.
//!
//! - [`input`] – pointer, text and key events consumed by the widgets

pub mod input;
