//! End-to-end editing sessions against `ScreenplayManager`.

use std::cell::RefCell;
use std::rc::Rc;

use screenplay_core::{
    BreakdownCategory, ContinuationKind, ContinuationOptions, DocumentEvent, DualSlot, Element,
    ElementSeed, ElementType, GroupBy, KeyAction, KeyIntent, LockPolicy, ReportKey,
    RevisionColor, RevisionKind, ScreenplayManager, ScriptError,
};

fn manager() -> ScreenplayManager {
    ScreenplayManager::new().with_clock(|| 1_000)
}

fn lines(count: usize) -> String {
    vec!["The wind howls."; count].join("\n")
}

fn kinds(manager: &ScreenplayManager) -> Vec<ElementType> {
    manager.elements().iter().map(|e| e.kind).collect()
}

#[test]
fn test_tab_on_empty_action_converts_in_place() {
    let mut script = manager();
    let id = script.push(Element::new(ElementType::Action));

    let outcome = script.press_tab(KeyIntent::new(id, 0)).unwrap();

    assert_eq!(outcome.focus, id);
    assert_eq!(
        outcome.action,
        KeyAction::ConvertedInPlace {
            from: ElementType::Action,
            to: ElementType::Character
        }
    );
    assert_eq!(kinds(&script), [ElementType::Character]);
}

#[test]
fn test_tab_on_character_inserts_dialogue() {
    let mut script = manager();
    let id = script.push(Element::character("MARY"));

    let outcome = script.press_tab(KeyIntent::new(id, 4)).unwrap();

    assert_ne!(outcome.focus, id);
    assert_eq!(kinds(&script), [ElementType::Character, ElementType::Dialogue]);
    assert_eq!(script.elements()[1].id, outcome.focus);
}

#[test]
fn test_enter_on_scene_heading_text() {
    let mut script = manager();
    let id = script.push(Element::action("INT. KITCHEN - DAY"));

    let outcome = script.press_enter(KeyIntent::new(id, 18)).unwrap();

    assert_eq!(outcome.reclassified, Some(ElementType::SceneHeading));
    assert_eq!(kinds(&script), [ElementType::SceneHeading, ElementType::Action]);
    assert_eq!(script.get(&outcome.focus).unwrap().text(), "");
    assert_eq!(script.get_scene_numbers()[0].label, "1");
}

#[test]
fn test_enter_on_character_cue_adds_dialogue() {
    let mut script = manager();
    let id = script.push(Element::action("DETECTIVE MORGAN"));

    let outcome = script.press_enter(KeyIntent::new(id, 16)).unwrap();

    assert!(matches!(outcome.action, KeyAction::CharacterCue { .. }));
    assert_eq!(kinds(&script), [ElementType::Character, ElementType::Dialogue]);
    assert_eq!(script.get(&id).unwrap().text(), "DETECTIVE MORGAN");
}

#[test]
fn test_enter_mid_text_splits_element() {
    let mut script = manager();
    let id = script.push(Element::action("She waits. Nothing happens."));

    let outcome = script.press_enter(KeyIntent::new(id, 11)).unwrap();

    assert_eq!(script.get(&id).unwrap().text(), "She waits. ");
    assert_eq!(script.get(&outcome.focus).unwrap().text(), "Nothing happens.");
}

#[test]
fn test_page_count_for_three_pages_and_ten_lines() {
    let mut script = manager();
    for _ in 0..3 {
        script.push(Element::action(lines(55)));
    }
    script.push(Element::action(lines(10)));

    assert_eq!(script.get_pagination_result().page_count, 4);
}

#[test]
fn test_dialogue_split_across_pages() {
    let mut script = manager();
    script.push(Element::scene_heading("EXT. DOCKS - NIGHT"));
    script.push(Element::action(lines(52)));
    script.push(Element::character("MARY (V.O.)"));
    let speech = script.push(Element::dialogue(lines(4)));

    let marks = script.get_continuation_marks();
    assert_eq!(marks.len(), 2);

    assert_eq!(marks[0].kind, ContinuationKind::More);
    assert_eq!(marks[0].page, 1);
    assert_eq!(marks[1].kind, ContinuationKind::ContD);
    assert_eq!(marks[1].page, 2);
    for mark in marks {
        assert_eq!(mark.element_id, speech);
        assert_eq!(mark.character_name.as_deref(), Some("MARY"));
    }
}

#[test]
fn test_scene_continued_mark_when_enabled() {
    let mut script = manager();
    script.push(Element::scene_heading("INT. HALLWAY - NIGHT"));
    script.push(Element::action(lines(54)));
    let next = script.push(Element::action("The lights flicker."));
    script
        .set_continuation(ContinuationOptions::new().with_scenes(true))
        .unwrap();

    let marks = script.get_continuation_marks();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0].kind, ContinuationKind::Continued);
    assert_eq!(marks[0].element_id, next);
    assert_eq!(marks[0].page, 2);
    assert_eq!(marks[0].scene_heading.as_deref(), Some("INT. HALLWAY - NIGHT"));
}

#[test]
fn test_omitted_scene_keeps_its_label() {
    let mut script = manager();
    let first = script.push(Element::scene_heading("INT. HOUSE - DAY"));
    let second = script.push(Element::scene_heading("EXT. GARDEN - DAY"));
    let third = script.push(Element::scene_heading("INT. GARAGE - NIGHT"));

    script.set_omitted(&second, true).unwrap();

    let numbered: Vec<_> = script
        .get_scene_numbers()
        .iter()
        .map(|n| (n.element_id, n.label.as_str()))
        .collect();
    assert_eq!(numbered, [(first, "1"), (third, "2")]);
    assert_eq!(script.get_omitted_scenes()[0].label, "2");
    assert_eq!(script.get_pagination_result().scene_count, 2);
}

#[test]
fn test_revision_mark_survives_retype() {
    let mut script = manager();
    let id = script.push(Element::action("He runs."));
    script.enable_revisions(true);
    script.insert_text(&id, 8, " Fast.").unwrap();

    script
        .replace_type(&id, ElementType::Dialogue, LockPolicy::Respect)
        .unwrap();

    let marks = script.get_revision_marks();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0].element_id, id);
    assert_eq!(marks[0].kind, RevisionKind::Insert);
    assert_eq!(marks[0].color, RevisionColor::White);
    assert_eq!((marks[0].span.start, marks[0].span.end), (8, 14));
}

#[test]
fn test_tracked_delete_then_accept() {
    let mut script = manager();
    let id = script.push(Element::action("A very old car."));
    script.enable_revisions(true);

    script.delete_range(&id, 2, 7).unwrap();
    assert_eq!(script.get(&id).unwrap().text(), "A very old car.");
    assert_eq!(script.get_revision_marks()[0].kind, RevisionKind::Delete);

    assert_eq!(script.accept_revisions().unwrap(), 1);
    assert_eq!(script.get(&id).unwrap().text(), "A old car.");
    assert!(script.get_revision_marks().is_empty());
}

#[test]
fn test_report_skips_deleted_elements() {
    let mut script = manager();
    script.push(Element::scene_heading("INT. BARN - DAY"));
    let kept = script.push(Element::action("A horse kicks the door."));
    let doomed = script.push(Element::action("A crowbar lies on the floor."));
    script.tag(&kept, 2, 7, BreakdownCategory::Animals).unwrap();
    script.tag(&doomed, 2, 9, BreakdownCategory::Props).unwrap();

    script.remove(&doomed, LockPolicy::Respect).unwrap();

    let report = script.report(GroupBy::Category);
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].key, ReportKey::Category(BreakdownCategory::Animals));
    assert_eq!(report[0].tags[0].text, "horse");

    let by_scene = script.report(GroupBy::Scene);
    assert_eq!(
        by_scene[0].key,
        ReportKey::Scene(Some("INT. BARN - DAY".to_string()))
    );
    assert_eq!(script.get_breakdown_tags().len(), 1);
}

#[test]
fn test_locked_heading_rejects_keyboard_edits() {
    let mut script = manager();
    let id = script.push(Element::scene_heading("INT. VAULT - NIGHT"));
    script.set_locked(&id, true).unwrap();

    assert!(matches!(
        script.insert_text(&id, 0, "x"),
        Err(ScriptError::Locked(_))
    ));
    assert!(matches!(
        script.press_enter(KeyIntent::new(id, 0)),
        Err(ScriptError::Locked(_))
    ));
    assert!(matches!(
        script.remove(&id, LockPolicy::Respect),
        Err(ScriptError::Locked(_))
    ));
    assert!(matches!(
        script.delete_range(&id, 0, 4),
        Err(ScriptError::Locked(_))
    ));
    assert_eq!(script.get(&id).unwrap().text(), "INT. VAULT - NIGHT");
    assert_eq!(script.len(), 1);
    assert!(script.remove(&id, LockPolicy::Override).is_ok());
}

#[test]
fn test_locking_a_non_heading_is_rejected() {
    let mut script = manager();
    let id = script.push(Element::action("Not a scene."));
    assert!(matches!(
        script.set_locked(&id, true),
        Err(ScriptError::InvalidConversion { .. })
    ));
}

#[test]
fn test_tracked_delete_on_dual_dialogue_keeps_accept_whole() {
    let mut script = manager();
    let action = script.push(Element::action("The big red car."));
    let dual = script.push(Element::dual_dialogue(
        DualSlot::new("ANNA", "Left."),
        DualSlot::new("BEN", "Right."),
    ));
    script.enable_revisions(true);

    script.delete_range(&action, 4, 8).unwrap();
    assert!(matches!(
        script.delete_range(&dual, 0, 3),
        Err(ScriptError::InvalidConversion { .. })
    ));
    assert_eq!(script.get_revision_marks().len(), 1);

    assert_eq!(script.accept_revisions().unwrap(), 1);
    assert_eq!(script.get(&action).unwrap().text(), "The red car.");
    assert_eq!(script.get_pagination_result().word_count, 3 + 4);
}

#[test]
fn test_switching_alternate_drops_anchors() {
    let mut script = manager();
    let id = script.push(Element::dialogue("I told you never to come back here."));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    script.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    let tag = script.tag(&id, 20, 30, BreakdownCategory::Props).unwrap();
    script.enable_revisions(true);
    script.insert_text(&id, 35, " Now.").unwrap();

    // Adding a reading leaves the visible one alone.
    let index = script.add_alternate(&id, "Short.").unwrap();
    assert_eq!(script.get_breakdown_tags().len(), 1);
    assert_eq!(script.get_revision_marks().len(), 1);

    script.set_active_alternate(&id, index).unwrap();
    assert_eq!(script.get(&id).unwrap().text(), "Short.");
    assert!(script.get_breakdown_tags().is_empty());
    assert!(script.get_revision_marks().is_empty());
    assert!(seen.borrow().contains(&DocumentEvent::Untagged { tag }));
}

#[test]
fn test_listeners_see_updated_layout() {
    let mut script = manager();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let listener = script.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    let id = script.push(Element::action("INT. OFFICE - DAY"));
    script.commit_text(&id, "INT. OFFICE - DAY").unwrap();
    assert!(script.unsubscribe(listener));
    script.push(Element::action("Ignored."));

    let events = seen.borrow();
    assert_eq!(
        events[0],
        DocumentEvent::Inserted {
            id,
            kind: ElementType::Action
        }
    );
    assert!(events.contains(&DocumentEvent::Retyped {
        id,
        from: ElementType::Action,
        to: ElementType::SceneHeading
    }));
    assert_eq!(events.len(), 3);
}

#[test]
fn test_seed_round_trip_keeps_order_and_text() {
    let seeds = vec![
        ElementSeed::new(ElementType::SceneHeading, "INT. LAB - NIGHT"),
        ElementSeed::new(ElementType::Action, "Beakers bubble."),
        ElementSeed::new(ElementType::PageBreak, ""),
        ElementSeed::new(ElementType::Character, "DR. VOSS"),
        ElementSeed::new(ElementType::Dialogue, "It's alive."),
    ];

    let script = ScreenplayManager::from_seeds(seeds.clone()).unwrap();

    assert_eq!(script.to_seeds(), seeds);
    assert_eq!(script.get_pagination_result().page_count, 2);
}
