//! BreakdownTagger: production-category tags on spans of element text.
//!
//! Each tag snapshots the text of the scene heading it sat under when it was
//! created. Scene-grouped reports use that snapshot, so renaming or deleting
//! the heading later does not move the tag to another group.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use tracing::debug;

use super::span::Span;
use crate::document::{Element, ElementId, ElementType};
use crate::error::{ScriptError, ScriptResult};

// =============================================================================
// CATEGORY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownCategory {
    Cast,
    Stunts,
    Extras,
    Sfx,
    Vfx,
    Props,
    Vehicles,
    Wardrobe,
    Makeup,
    Animals,
    Music,
    Sound,
}

impl BreakdownCategory {
    pub const ALL: [BreakdownCategory; 12] = [
        BreakdownCategory::Cast,
        BreakdownCategory::Stunts,
        BreakdownCategory::Extras,
        BreakdownCategory::Sfx,
        BreakdownCategory::Vfx,
        BreakdownCategory::Props,
        BreakdownCategory::Vehicles,
        BreakdownCategory::Wardrobe,
        BreakdownCategory::Makeup,
        BreakdownCategory::Animals,
        BreakdownCategory::Music,
        BreakdownCategory::Sound,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BreakdownCategory::Cast => "cast",
            BreakdownCategory::Stunts => "stunts",
            BreakdownCategory::Extras => "extras",
            BreakdownCategory::Sfx => "sfx",
            BreakdownCategory::Vfx => "vfx",
            BreakdownCategory::Props => "props",
            BreakdownCategory::Vehicles => "vehicles",
            BreakdownCategory::Wardrobe => "wardrobe",
            BreakdownCategory::Makeup => "makeup",
            BreakdownCategory::Animals => "animals",
            BreakdownCategory::Music => "music",
            BreakdownCategory::Sound => "sound",
        }
    }
}

impl fmt::Display for BreakdownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreakdownCategory {
    type Err = ScriptError;

    fn from_str(s: &str) -> ScriptResult<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        BreakdownCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ScriptError::serialization(format!("unknown breakdown category '{}'", s)))
    }
}

// =============================================================================
// TAG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(Uuid);

impl TagId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TagId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TagId {
    type Err = ScriptError;

    fn from_str(s: &str) -> ScriptResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ScriptError::invalid_id(s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownTag {
    pub id: TagId,
    pub category: BreakdownCategory,
    /// Tagged text as it read when the tag was created.
    pub text: String,
    pub element_id: ElementId,
    pub span: Span,
    /// Heading of the enclosing scene at creation time.
    pub scene_heading_at_creation: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

/// How [`BreakdownTagger::report`] buckets tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    Category,
    Scene,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "group", content = "key", rename_all = "snake_case")]
pub enum ReportKey {
    Category(BreakdownCategory),
    /// `None` collects tags created before the first scene heading.
    Scene(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportGroup {
    pub key: ReportKey,
    pub tags: Vec<BreakdownTag>,
}

// =============================================================================
// TAGGER
// =============================================================================

/// Owns the tags of one open document, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownTagger {
    tags: Vec<BreakdownTag>,
}

impl BreakdownTagger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags `start..end` of `element_id`, reading the text and the enclosing
    /// scene heading from `elements`.
    pub fn tag(
        &mut self,
        elements: &[Element],
        element_id: ElementId,
        start: usize,
        end: usize,
        category: BreakdownCategory,
        created_at: i64,
    ) -> ScriptResult<TagId> {
        let position = elements
            .iter()
            .position(|e| e.id == element_id)
            .ok_or_else(|| ScriptError::not_found(element_id))?;
        let element = &elements[position];
        let text = element.text();
        let span = Span::checked(start, end, text.chars().count())?;
        if span.is_empty() {
            return Err(ScriptError::invalid_range(start, end, text.chars().count()));
        }

        let scene_heading_at_creation = elements[..=position]
            .iter()
            .rev()
            .find(|e| e.kind == ElementType::SceneHeading)
            .map(|heading| heading.text().into_owned());

        let tag = BreakdownTag {
            id: TagId::new(),
            category,
            text: text.chars().skip(span.start).take(span.len()).collect(),
            element_id,
            span,
            scene_heading_at_creation,
            created_at,
        };
        let id = tag.id;
        debug!(tag = %id, element = %element_id, %category, text = %tag.text, "breakdown tag created");
        self.tags.push(tag);
        Ok(id)
    }

    pub fn remove(&mut self, id: &TagId) -> ScriptResult<BreakdownTag> {
        let position = self
            .tags
            .iter()
            .position(|t| t.id == *id)
            .ok_or_else(|| ScriptError::not_found(id))?;
        let tag = self.tags.remove(position);
        debug!(tag = %id, "breakdown tag removed");
        Ok(tag)
    }

    /// Removes every tag on one element and returns their ids.
    pub fn clear_element(&mut self, element_id: &ElementId) -> Vec<TagId> {
        let mut removed = Vec::new();
        self.tags.retain(|t| {
            let keep = t.element_id != *element_id;
            if !keep {
                removed.push(t.id);
            }
            keep
        });
        removed
    }

    pub fn get(&self, id: &TagId) -> Option<&BreakdownTag> {
        self.tags.iter().find(|t| t.id == *id)
    }

    /// All tags in creation order, dangling ones included.
    pub fn tags(&self) -> &[BreakdownTag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Groups the tags whose element passes `is_live`. Empty groups are left
    /// out; categories follow the fixed enumeration order and scenes the order
    /// in which they were first tagged.
    pub fn report(
        &self,
        group_by: GroupBy,
        is_live: impl Fn(&ElementId) -> bool,
    ) -> Vec<ReportGroup> {
        let live: Vec<&BreakdownTag> = self.tags.iter().filter(|t| is_live(&t.element_id)).collect();

        match group_by {
            GroupBy::Category => BreakdownCategory::ALL
                .into_iter()
                .filter_map(|category| {
                    let tags: Vec<_> = live
                        .iter()
                        .filter(|t| t.category == category)
                        .map(|t| (*t).clone())
                        .collect();
                    (!tags.is_empty()).then_some(ReportGroup {
                        key: ReportKey::Category(category),
                        tags,
                    })
                })
                .collect(),
            GroupBy::Scene => {
                let mut groups: Vec<ReportGroup> = Vec::new();
                for tag in live {
                    let key = ReportKey::Scene(tag.scene_heading_at_creation.clone());
                    match groups.iter_mut().find(|g| g.key == key) {
                        Some(group) => group.tags.push(tag.clone()),
                        None => groups.push(ReportGroup {
                            key,
                            tags: vec![tag.clone()],
                        }),
                    }
                }
                groups
            }
        }
    }

    // =========================================================================
    // ANCHOR MAINTENANCE
    // =========================================================================

    pub fn shift_for_insert(&mut self, element_id: &ElementId, at: usize, count: usize) {
        for tag in self.tags.iter_mut().filter(|t| t.element_id == *element_id) {
            tag.span.shift_for_insert(at, count);
        }
    }

    /// Shifts this element's tags after `removed` was deleted. A tag whose
    /// whole span was deleted goes with it.
    pub fn shift_for_delete(&mut self, element_id: &ElementId, removed: Span) {
        self.tags.retain_mut(|tag| {
            let keep = tag.element_id != *element_id || tag.span.shift_for_delete(removed);
            if !keep {
                debug!(tag = %tag.id, "breakdown tag lost its text");
            }
            keep
        });
    }

    /// Drops tags whose element no longer exists. Returns how many went.
    pub fn retain_live(&mut self, is_live: impl Fn(&ElementId) -> bool) -> usize {
        let before = self.tags.len();
        self.tags.retain(|t| is_live(&t.element_id));
        before - self.tags.len()
    }
}
