//! WASM bindings for the screenplay module.
//!
//! This module provides JavaScript-friendly wrappers around the core
//! ScreenplayManager for use in browser editors. Ids cross the boundary as
//! strings; structured values go through `serde-wasm-bindgen`.

use js_sys::Function;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

use super::manager::ScreenplayManager;
use super::settings::ScreenplaySettings;
use crate::document::{DualSide, DualSlot, Element, ElementId, ElementSeed, ElementType, LockPolicy};
use crate::error::ScriptError;
use crate::format::KeyIntent;
use crate::layout::{ContinuationOptions, PageLayout, SceneNumberingOptions};
use crate::production::{BreakdownCategory, GroupBy, TagId};

/// Serialize a value to JsValue with maps as plain JS objects (not Map).
fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&Serializer::new().serialize_maps_as_objects(true))
}

// =============================================================================
// ERROR CONVERSION
// =============================================================================

impl From<ScriptError> for JsValue {
    fn from(err: ScriptError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}

/// Helper macro for Result conversion
macro_rules! js_result {
    ($expr:expr) => {
        $expr.map_err(|e: ScriptError| JsValue::from(e))
    };
}

fn parse_id(id: &str) -> Result<ElementId, JsValue> {
    js_result!(id.parse::<ElementId>())
}

fn parse_kind(kind: &str) -> Result<ElementType, JsValue> {
    js_result!(kind.parse::<ElementType>())
}

fn lock_policy(override_lock: bool) -> LockPolicy {
    if override_lock {
        LockPolicy::Override
    } else {
        LockPolicy::Respect
    }
}

// =============================================================================
// MAIN WRAPPER TYPE
// =============================================================================

/// JavaScript-friendly wrapper around ScreenplayManager.
#[wasm_bindgen]
pub struct JsScreenplay {
    inner: ScreenplayManager,
}

#[wasm_bindgen]
impl JsScreenplay {
    /// Creates an empty screenplay.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const script = new JsScreenplay();
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsScreenplay {
        JsScreenplay {
            inner: ScreenplayManager::new(),
        }
    }

    /// Builds a screenplay from an array of `{type, text}` objects.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const script = JsScreenplay.fromSeeds([
    ///   { type: 'scene_heading', text: 'INT. KITCHEN - DAY' },
    ///   { type: 'action', text: 'Steam rises.' },
    /// ]);
    /// ```
    #[wasm_bindgen(js_name = fromSeeds)]
    pub fn from_seeds(seeds: JsValue) -> Result<JsScreenplay, JsValue> {
        let seeds: Vec<ElementSeed> = from_value(seeds)?;
        let inner = js_result!(ScreenplayManager::from_seeds(seeds))?;
        Ok(JsScreenplay { inner })
    }

    /// Exports the document as an array of `{type, text}` objects.
    #[wasm_bindgen(js_name = toSeeds)]
    pub fn to_seeds(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.inner.to_seeds())?)
    }

    /// Gets every element as a JavaScript object.
    #[wasm_bindgen(js_name = getElements)]
    pub fn get_elements(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.inner.elements())?)
    }

    /// Gets one element, or null if the id is unknown.
    #[wasm_bindgen(js_name = getElement)]
    pub fn get_element(&self, id: &str) -> Result<JsValue, JsValue> {
        let id = parse_id(id)?;
        match self.inner.get(&id) {
            Some(element) => Ok(to_js_value(element)?),
            None => Ok(JsValue::NULL),
        }
    }

    /// Replaces settings from a JSON string.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// script.setSettingsJson('{"layout": {"lines_per_page": 50}}');
    /// ```
    #[wasm_bindgen(js_name = setSettingsJson)]
    pub fn set_settings_json(&mut self, json: &str) -> Result<(), JsValue> {
        let settings = js_result!(ScreenplaySettings::from_json(json))?;
        js_result!(self.inner.set_settings(settings))
    }

    #[wasm_bindgen(js_name = setLayout)]
    pub fn set_layout(&mut self, layout: JsValue) -> Result<(), JsValue> {
        let layout: PageLayout = from_value(layout)?;
        js_result!(self.inner.set_layout(layout))
    }

    #[wasm_bindgen(js_name = setNumbering)]
    pub fn set_numbering(&mut self, numbering: JsValue) -> Result<(), JsValue> {
        let numbering: SceneNumberingOptions = from_value(numbering)?;
        js_result!(self.inner.set_numbering(numbering))
    }

    #[wasm_bindgen(js_name = setContinuation)]
    pub fn set_continuation(&mut self, continuation: JsValue) -> Result<(), JsValue> {
        let continuation: ContinuationOptions = from_value(continuation)?;
        js_result!(self.inner.set_continuation(continuation))
    }
}

// =============================================================================
// ELEMENT METHODS
// =============================================================================

#[wasm_bindgen]
impl JsScreenplay {
    /// Appends a new element and returns its id.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const id = script.push('action', 'The door creaks.');
    /// ```
    pub fn push(&mut self, kind: &str, text: &str) -> Result<String, JsValue> {
        let element = js_result!(Element::with_text(parse_kind(kind)?, text))?;
        Ok(self.inner.push(element).to_string())
    }

    #[wasm_bindgen(js_name = insertAfter)]
    pub fn insert_after(&mut self, after: &str, kind: &str, text: &str) -> Result<String, JsValue> {
        let after = parse_id(after)?;
        let element = js_result!(Element::with_text(parse_kind(kind)?, text))?;
        let id = js_result!(self.inner.insert_after(&after, element))?;
        Ok(id.to_string())
    }

    pub fn remove(&mut self, id: &str, override_lock: bool) -> Result<(), JsValue> {
        let id = parse_id(id)?;
        js_result!(self.inner.remove(&id, lock_policy(override_lock)))?;
        Ok(())
    }

    /// Moves an element before another one; pass null to move it to the end.
    #[wasm_bindgen(js_name = moveBefore)]
    pub fn move_before(
        &mut self,
        id: &str,
        before: Option<String>,
        override_lock: bool,
    ) -> Result<(), JsValue> {
        let id = parse_id(id)?;
        let before = before.as_deref().map(parse_id).transpose()?;
        js_result!(self
            .inner
            .move_before(&id, before.as_ref(), lock_policy(override_lock)))
    }

    #[wasm_bindgen(js_name = replaceType)]
    pub fn replace_type(&mut self, id: &str, kind: &str, override_lock: bool) -> Result<String, JsValue> {
        let id = parse_id(id)?;
        let kind = parse_kind(kind)?;
        let id = js_result!(self.inner.replace_type(&id, kind, lock_policy(override_lock)))?;
        Ok(id.to_string())
    }

    /// Keystroke text update. Returns the new type name if the element was retyped.
    #[wasm_bindgen(js_name = editText)]
    pub fn edit_text(&mut self, id: &str, text: &str) -> Result<Option<String>, JsValue> {
        let id = parse_id(id)?;
        let retyped = js_result!(self.inner.edit_text(&id, text))?;
        Ok(retyped.map(|kind| kind.to_string()))
    }

    /// Commit (blur) text update. Returns the new type name if the element was retyped.
    #[wasm_bindgen(js_name = commitText)]
    pub fn commit_text(&mut self, id: &str, text: &str) -> Result<Option<String>, JsValue> {
        let id = parse_id(id)?;
        let retyped = js_result!(self.inner.commit_text(&id, text))?;
        Ok(retyped.map(|kind| kind.to_string()))
    }

    #[wasm_bindgen(js_name = insertText)]
    pub fn insert_text(&mut self, id: &str, offset: usize, text: &str) -> Result<(), JsValue> {
        let id = parse_id(id)?;
        js_result!(self.inner.insert_text(&id, offset, text))
    }

    #[wasm_bindgen(js_name = deleteRange)]
    pub fn delete_range(&mut self, id: &str, start: usize, end: usize) -> Result<(), JsValue> {
        let id = parse_id(id)?;
        js_result!(self.inner.delete_range(&id, start, end))
    }

    /// Handles Tab. Returns `{focus, action, reclassified}`.
    #[wasm_bindgen(js_name = pressTab)]
    pub fn press_tab(&mut self, id: &str, cursor_offset: usize) -> Result<JsValue, JsValue> {
        let intent = KeyIntent::new(parse_id(id)?, cursor_offset);
        let outcome = js_result!(self.inner.press_tab(intent))?;
        Ok(to_js_value(&outcome)?)
    }

    /// Handles Enter. Returns `{focus, action, reclassified}`.
    #[wasm_bindgen(js_name = pressEnter)]
    pub fn press_enter(&mut self, id: &str, cursor_offset: usize) -> Result<JsValue, JsValue> {
        let intent = KeyIntent::new(parse_id(id)?, cursor_offset);
        let outcome = js_result!(self.inner.press_enter(intent))?;
        Ok(to_js_value(&outcome)?)
    }

    #[wasm_bindgen(js_name = setOmitted)]
    pub fn set_omitted(&mut self, id: &str, omitted: bool) -> Result<(), JsValue> {
        let id = parse_id(id)?;
        js_result!(self.inner.set_omitted(&id, omitted))
    }

    #[wasm_bindgen(js_name = setLocked)]
    pub fn set_locked(&mut self, id: &str, locked: bool) -> Result<(), JsValue> {
        let id = parse_id(id)?;
        js_result!(self.inner.set_locked(&id, locked))
    }

    #[wasm_bindgen(js_name = addAlternate)]
    pub fn add_alternate(&mut self, id: &str, text: &str) -> Result<usize, JsValue> {
        let id = parse_id(id)?;
        js_result!(self.inner.add_alternate(&id, text))
    }

    #[wasm_bindgen(js_name = setActiveAlternate)]
    pub fn set_active_alternate(&mut self, id: &str, index: usize) -> Result<(), JsValue> {
        let id = parse_id(id)?;
        js_result!(self.inner.set_active_alternate(&id, index))
    }

    /// Replaces one side of a dual-dialogue block.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// script.setDualSlot(id, 'right', { character: 'BOB', dialogue: 'No.' });
    /// ```
    #[wasm_bindgen(js_name = setDualSlot)]
    pub fn set_dual_slot(&mut self, id: &str, side: &str, slot: JsValue) -> Result<(), JsValue> {
        let id = parse_id(id)?;
        let side: DualSide = from_value(JsValue::from_str(side))?;
        let slot: DualSlot = from_value(slot)?;
        js_result!(self.inner.set_dual_slot(&id, side, slot))
    }
}

// =============================================================================
// DERIVED STATE
// =============================================================================

#[wasm_bindgen]
impl JsScreenplay {
    /// Returns `{page_count, scene_count, word_count, breaks}`.
    #[wasm_bindgen(js_name = getPaginationResult)]
    pub fn get_pagination_result(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(self.inner.get_pagination_result())?)
    }

    #[wasm_bindgen(js_name = getSceneNumbers)]
    pub fn get_scene_numbers(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.inner.get_scene_numbers())?)
    }

    #[wasm_bindgen(js_name = getOmittedScenes)]
    pub fn get_omitted_scenes(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.inner.get_omitted_scenes())?)
    }

    #[wasm_bindgen(js_name = getContinuationMarks)]
    pub fn get_continuation_marks(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.inner.get_continuation_marks())?)
    }

    #[wasm_bindgen(js_name = getRevisionMarks)]
    pub fn get_revision_marks(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.inner.get_revision_marks())?)
    }

    #[wasm_bindgen(js_name = getBreakdownTags)]
    pub fn get_breakdown_tags(&self) -> Result<JsValue, JsValue> {
        Ok(to_js_value(&self.inner.get_breakdown_tags())?)
    }
}

// =============================================================================
// PRODUCTION METHODS
// =============================================================================

#[wasm_bindgen]
impl JsScreenplay {
    #[wasm_bindgen(js_name = enableRevisions)]
    pub fn enable_revisions(&mut self, enabled: bool) {
        self.inner.enable_revisions(enabled);
    }

    /// Advances the revision color and returns its name.
    #[wasm_bindgen(js_name = nextColor)]
    pub fn next_color(&mut self) -> String {
        self.inner.next_color().to_string()
    }

    #[wasm_bindgen(js_name = currentColor)]
    pub fn current_color(&self) -> String {
        self.inner.current_color().to_string()
    }

    /// Removes struck-through text and clears all marks.
    #[wasm_bindgen(js_name = acceptRevisions)]
    pub fn accept_revisions(&mut self) -> Result<usize, JsValue> {
        js_result!(self.inner.accept_revisions())
    }

    /// Tags a span of an element's text and returns the tag id.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const tagId = script.tag(id, 4, 7, 'props');
    /// ```
    pub fn tag(&mut self, id: &str, start: usize, end: usize, category: &str) -> Result<String, JsValue> {
        let id = parse_id(id)?;
        let category = js_result!(category.parse::<BreakdownCategory>())?;
        let tag = js_result!(self.inner.tag(&id, start, end, category))?;
        Ok(tag.to_string())
    }

    #[wasm_bindgen(js_name = removeTag)]
    pub fn remove_tag(&mut self, tag: &str) -> Result<(), JsValue> {
        let tag = js_result!(tag.parse::<TagId>())?;
        js_result!(self.inner.remove_tag(&tag))?;
        Ok(())
    }

    /// Breakdown report grouped by `'category'` or `'scene'`.
    pub fn report(&self, group_by: &str) -> Result<JsValue, JsValue> {
        let group_by: GroupBy = from_value(JsValue::from_str(group_by))?;
        Ok(to_js_value(&self.inner.report(group_by))?)
    }

    /// Registers a callback invoked with each change event. Returns a handle
    /// for `unsubscribe`.
    pub fn subscribe(&mut self, callback: Function) -> usize {
        self.inner.subscribe(move |event| {
            if let Ok(value) = to_js_value(event) {
                let _ = callback.call1(&JsValue::NULL, &value);
            }
        })
    }

    pub fn unsubscribe(&mut self, id: usize) -> bool {
        self.inner.unsubscribe(id)
    }
}

impl Default for JsScreenplay {
    fn default() -> Self {
        Self::new()
    }
}
