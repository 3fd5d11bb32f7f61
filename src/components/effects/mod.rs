//! Decorative canvas effects for the portfolio pages.
//!
//! Renders two decor layers onto one full-viewport canvas:
//! - Code-rain: faint falling glyph columns with trail fade
//! - Petals: drifting sakura petals, plus sparkles on click
//!
//! Animation is off entirely under reduced motion or save-data. The page
//! drives the engine through [`FxHandle`] (also published as `window.EBFX`).
//!
//! # Example
//!
//! ```ignore
//! use portfolio_fx::{EffectsLayer, EffectsState, EngineConfig, FxHandle};
//!
//! let state = RwSignal::new(EffectsState::new(true, false));
//! let handle = FxHandle::install(EngineConfig::default(), state).unwrap();
//!
//! view! { <EffectsLayer handle=handle /> }
//! ```

mod component;
pub mod config;
pub mod engine;
mod error;
pub mod gate;
mod host;
pub mod particles;
pub mod pointer;
pub mod render;
pub mod scheduler;
#[cfg(test)]
mod testing;
pub mod theme;
pub mod types;

pub use component::{EffectsLayer, FxHandle};
pub use config::{DensityProfile, EngineConfig};
pub use error::FxError;
pub use types::{EffectsState, Viewport};
