//! Document module: the element model and the store that owns its order.

pub mod model;
pub mod store;

// Re-exports for convenience
pub use model::{Content, DualSide, DualSlot, Element, ElementId, ElementSeed, ElementType};
pub use store::{ElementStore, LockPolicy};
