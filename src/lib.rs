//! screenplay-core - Screenplay document model and formatting engine.
//!
//! The crate keeps a screenplay as a flat, ordered list of typed elements with
//! stable ids and derives everything a screenwriting editor needs from it:
//!
//! - **Formatting**: text classification plus the Tab/Enter element-type state machine
//! - **Layout**: line-budget pagination, scene numbers and (MORE)/(CONT'D)/CONTINUED marks
//! - **Production**: colored revision marks and breakdown tags anchored to text spans
//!
//! Import and export stay outside the crate: documents come in and go out as
//! `{type, text}` pairs.
//!
//! # Example
//!
//! ```rust
//! use screenplay_core::{Element, ElementType, KeyIntent, ScreenplayManager};
//!
//! let mut script = ScreenplayManager::new();
//! let id = script.push(Element::action("INT. KITCHEN - DAY"));
//!
//! // Enter commits the text first: the action becomes a scene heading and a
//! // fresh action element follows it.
//! let outcome = script.press_enter(KeyIntent::new(id, 18)).unwrap();
//! assert_eq!(script.get(&id).unwrap().kind, ElementType::SceneHeading);
//! assert_eq!(script.get(&outcome.focus).unwrap().kind, ElementType::Action);
//!
//! assert_eq!(script.get_pagination_result().scene_count, 1);
//! assert_eq!(script.get_scene_numbers()[0].label, "1");
//! ```

pub mod document;
pub mod error;
pub mod format;
pub mod layout;
pub mod production;
pub mod screenplay;

// Re-exports for convenience
pub use document::{
    Content, DualSide, DualSlot, Element, ElementId, ElementSeed, ElementStore, ElementType,
    LockPolicy,
};
pub use error::{ScriptError, ScriptResult};
pub use format::{classify, Classification, KeyAction, KeyIntent, KeyOutcome, Trigger};
pub use layout::{
    ContinuationKind, ContinuationMark, ContinuationOptions, ElementSpacing, Margins, NumberFormat,
    PageBreak, PageLayout, PaginationResult, SceneNumber, SceneNumbering, SceneNumberingOptions,
};
pub use production::{
    BreakdownCategory, BreakdownTag, BreakdownTagger, GroupBy, ReportGroup, ReportKey,
    RevisionColor, RevisionKind, RevisionMark, RevisionTracker, Span, TagId,
};
pub use screenplay::{DocumentEvent, ListenerId, ScreenplayManager, ScreenplaySettings};

#[cfg(feature = "wasm")]
pub use screenplay::JsScreenplay;
