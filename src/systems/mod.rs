//! Per-tick logic that is not tied to one component type.
//!
//! Submodules overview
//! - [`animation`] – [`Animator`](animation::Animator): selects an animation
//!   from a set and advances its frames over time

pub mod animation;
