//! Production metadata kept beside the document: revision marks and
//! breakdown tags, both anchored by element id and char span.

pub mod breakdown;
pub mod revisions;
pub mod span;

pub use breakdown::{
    BreakdownCategory, BreakdownTag, BreakdownTagger, GroupBy, ReportGroup, ReportKey, TagId,
};
pub use revisions::{AcceptedDeletion, RevisionColor, RevisionKind, RevisionMark, RevisionTracker};
pub use span::{changed_range, merge, Span};
