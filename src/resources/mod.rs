//! Long-lived data shared by components: animation definitions, tilesets,
//! loaded assets, the draw surface and configuration.
//!
//! Overview
//! - `animation` – frames, animations and identifier rules
//! - `animationstore` – named animation sets keyed by animation id
//! - `assets` – textures, fonts and sounds loaded once and shared by path
//! - `gameconfig` – view size, frame rate and animation speed from an INI file
//! - `rendertarget` – draw commands and the surface that receives them
//! - `tileset` – fixed-size tile grid over a texture
pub mod animation;
pub mod animationstore;
pub mod assets;
pub mod gameconfig;
pub mod rendertarget;
pub mod tileset;
