//! Engine-level integration: suggestion flow, staleness, private mode,
//! subtype changes, and teardown.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use osk_core::editor::FieldAttributes;
use osk_core::error::InitError;
use osk_core::subtype::Subtype;

use super::{make_engine, make_engine_with, pump_until, FakeEditor, FakeSubtypes, FakeSuggester, StubSink};
use crate::{EngineConfig, InputEngine};

#[test]
fn word_changes_become_suggestions_on_the_sink() {
    let h = make_engine();
    h.editor.push_word_change("hel");

    assert!(pump_until(&h, Duration::from_secs(2), || {
        !h.sink.suggestion_events().is_empty()
    }));
    assert_eq!(
        h.sink.suggestion_events()[0],
        vec!["hel-1".to_string(), "hel-2".to_string()]
    );

    let requests = h.suggester.requests.lock().unwrap();
    let request = requests.last().unwrap();
    assert_eq!(request.current_word, "hel");
    assert_eq!(request.max_count, 16);
    // Offensive suggestions are blocked by default.
    assert!(!request.allow_possibly_offensive);
}

#[test]
fn superseded_lookup_never_reaches_the_sink() {
    let h = make_engine();
    h.suggester.set_delay(Duration::from_millis(200));

    h.editor.push_word_change("one");
    h.engine.pump();
    h.editor.push_word_change("two");
    h.engine.pump();

    assert!(pump_until(&h, Duration::from_secs(3), || {
        !h.sink.suggestion_events().is_empty()
    }));
    for suggestions in h.sink.suggestion_events() {
        assert!(
            !suggestions.contains(&"one-1".to_string()),
            "stale result leaked to the sink"
        );
    }
}

#[test]
fn input_restart_invalidates_outstanding_lookups() {
    let h = make_engine();
    h.suggester.set_delay(Duration::from_millis(150));

    h.editor.push_word_change("old");
    h.engine.pump();
    h.engine.start_input();

    pump_until(&h, Duration::from_millis(600), || false);
    assert!(h.sink.suggestion_events().is_empty());
}

#[test]
fn private_mode_suppresses_lookups_and_unloads_user_dicts() {
    let h = make_engine();
    h.editor.set_attrs(FieldAttributes {
        no_personalized_learning: true,
        ..FieldAttributes::default()
    });
    h.engine.start_input();
    assert!(h.engine.keyboard_state().snapshot().is_private_mode);

    h.editor.push_word_change("secret");
    pump_until(&h, Duration::from_millis(300), || false);
    assert!(h.sink.suggestion_events().is_empty());
    assert!(h.suggester.requests.lock().unwrap().is_empty());
    assert!(h.suggester.unloads.load(Ordering::SeqCst) >= 1);
}

#[test]
fn low_memory_disables_composing_and_lookups() {
    let h = make_engine_with(EngineConfig {
        prefs_toml: None,
        available_memory_mb: Some(16),
    });
    assert!(!h.engine.keyboard_state().snapshot().is_composing_enabled);

    h.editor.push_word_change("hel");
    pump_until(&h, Duration::from_millis(300), || false);
    assert!(h.sink.suggestion_events().is_empty());
}

#[test]
fn disabled_suggestions_pref_suppresses_lookups() {
    let h = make_engine_with(EngineConfig {
        prefs_toml: Some("[suggestion]\nenabled = false\n".into()),
        available_memory_mb: None,
    });
    h.editor.push_word_change("hel");
    pump_until(&h, Duration::from_millis(300), || false);
    assert!(h.sink.suggestion_events().is_empty());
    assert!(h.suggester.requests.lock().unwrap().is_empty());
}

#[test]
fn subtype_change_prepares_dictionaries() {
    let h = make_engine();
    h.subtypes.set_active(Subtype::new(2, "de_DE"));

    assert!(pump_until(&h, Duration::from_secs(2), || {
        h.suggester
            .prepared
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.primary_locale == "de_DE")
    }));
}

#[test]
fn start_input_prepares_and_loads_user_dictionaries() {
    let h = make_engine();
    assert!(pump_until(&h, Duration::from_secs(2), || {
        !h.suggester.prepared.lock().unwrap().is_empty()
            && h.suggester.loads.load(Ordering::SeqCst) >= 1
    }));
}

#[test]
fn invalid_preferences_are_fatal_to_construction() {
    let result = InputEngine::new(
        Box::new(FakeEditor::default()),
        Arc::new(FakeSuggester::default()),
        Arc::new(FakeSubtypes::default()),
        Arc::new(StubSink::default()),
        EngineConfig {
            prefs_toml: Some("keyboard = 1".into()),
            available_memory_mb: None,
        },
    );
    assert!(matches!(result, Err(InitError::Prefs(_))));
}

#[test]
fn closed_engine_ignores_further_input() {
    let mut h = make_engine();
    h.engine.close();
    h.engine.close();

    super::type_string(&h, "ab");
    h.engine.pump();
    assert_eq!(h.editor.text(), "");

    // Teardown unloads user dictionaries in the background.
    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while h.suggester.unloads.load(Ordering::SeqCst) == 0 {
        assert!(std::time::Instant::now() < deadline, "unload never happened");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn keyboard_state_handles_share_one_session() {
    let h = make_engine();
    let state = h.engine.keyboard_state();
    state.batch_edit(|s| s.is_quick_actions_visible = true);
    assert!(h.engine.keyboard_state().snapshot().is_quick_actions_visible);
}
