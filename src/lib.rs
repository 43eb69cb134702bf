//! MiGfx library.
//!
//! A small 2D component framework: entities own typed components (transform,
//! sprite, animated sprite, text and a handful of UI widgets) that validate
//! their required and incompatible peers, advance per tick, react to input
//! events and emit draw commands. Entities and animation data round-trip
//! through a compact binary format and through XML.

pub mod components;
pub mod entity;
pub mod error;
pub mod events;
pub mod primitives;
pub mod resources;
pub mod serialization;
pub mod systems;
