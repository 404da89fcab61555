//! Derived page layout: pagination, scene numbers and continuation marks.

pub mod continuation;
pub mod model;
pub mod paginator;
pub mod scene_numbers;

pub use continuation::{
    annotate, clean_character_name, ContinuationKind, ContinuationMark, ContinuationOptions,
};
pub use model::{ElementSpacing, Margins, PageBreak, PageLayout, PaginationResult};
pub use paginator::{paginate, scene_count};
pub use scene_numbers::{
    format_label, letter_label, number_scenes, NumberFormat, SceneNumber, SceneNumbering,
    SceneNumberingOptions,
};
