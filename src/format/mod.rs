//! Format module: text classification and the Tab/Enter state machine.

pub mod classifier;
pub mod transitions;

// Re-exports for convenience
pub use classifier::{classify, is_character_cue, is_scene_heading, Classification, Trigger};
pub use transitions::{
    enter_target, handle_enter, handle_tab, tab_target, KeyAction, KeyIntent, KeyOutcome,
    ENTER_NEXT, TAB_CYCLE,
};
