//! Screenplay document module.
//!
//! Provides the per-document facade that ties the element store, the format
//! engine, derived layout and production metadata together.

pub mod events;
pub mod manager;
pub mod settings;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience
pub use events::{DocumentEvent, ListenerId, Listeners};
pub use manager::{now_millis, ScreenplayManager};
pub use settings::ScreenplaySettings;

#[cfg(feature = "wasm")]
pub use wasm::JsScreenplay;
