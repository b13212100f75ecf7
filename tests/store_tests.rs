// tests/store_tests.rs
//! Store semantics: staleness guard, replace-then-recompute, selection.

mod support;

use consultation_desk::{CallStatus, ConsultationStore, Filters};
use support::record;

#[test]
fn test_late_stale_fetch_cannot_overwrite_newer_data() {
    let mut store = ConsultationStore::new();

    // Dispatch A, then B. B resolves first; A resolves late.
    let ticket_a = store.begin_fetch();
    let ticket_b = store.begin_fetch();

    assert!(store.commit_fetch(ticket_b, vec![record("b1", "From B")]));
    assert!(!store.commit_fetch(ticket_a, vec![record("a1", "From A")]));

    assert_eq!(store.records().len(), 1);
    assert_eq!(store.records()[0].id, "b1");
}

#[test]
fn test_commit_replaces_list_and_recomputes_stats() {
    let mut store = ConsultationStore::new();
    let ticket = store.begin_fetch();
    let mut a = record("a", "Asha");
    a.neet_score = Some("600".to_string());
    let mut b = record("b", "Rahul");
    b.neet_score = Some("500".to_string());
    store.commit_fetch(ticket, vec![a, b]);

    assert_eq!(store.student_stats().total_students, 2);
    assert_eq!(store.student_stats().avg_neet_score, 550);

    // a second fetch fully replaces, never merges
    let ticket = store.begin_fetch();
    store.commit_fetch(ticket, vec![record("c", "Meera")]);
    assert_eq!(store.records().len(), 1);
    assert_eq!(store.student_stats().total_students, 1);
    assert_eq!(store.student_stats().avg_neet_score, 0);
}

#[test]
fn test_commit_prunes_selection_to_surviving_ids() {
    let mut store = ConsultationStore::new();
    let ticket = store.begin_fetch();
    store.commit_fetch(ticket, vec![record("a", "Asha"), record("b", "Rahul")]);
    store.select("a");
    store.select("b");

    let ticket = store.begin_fetch();
    store.commit_fetch(ticket, vec![record("b", "Rahul")]);
    assert_eq!(store.selection(), ["b".to_string()]);
}

#[test]
fn test_apply_update_patches_in_place_and_recomputes() {
    let mut store = ConsultationStore::new();
    let ticket = store.begin_fetch();
    store.commit_fetch(ticket, vec![record("a", "Asha"), record("b", "Rahul")]);
    assert_eq!(store.call_stats().completed, 0);

    let mut echo = record("a", "Asha");
    echo.call_status = Some(CallStatus::Completed);
    echo.call_notes = Some("done".to_string());
    echo.called_by = Some("Priya".to_string());
    assert!(store.apply_update(echo));

    assert_eq!(store.records().len(), 2);
    assert_eq!(store.records()[0].call_status, Some(CallStatus::Completed));
    assert_eq!(store.call_stats().completed, 1);
    assert_eq!(store.call_stats().unique_callers, vec!["Priya"]);
}

#[test]
fn test_apply_update_for_unknown_id_is_a_noop() {
    let mut store = ConsultationStore::new();
    let ticket = store.begin_fetch();
    store.commit_fetch(ticket, vec![record("a", "Asha")]);

    let echo = record("ghost", "Nobody");
    assert!(!store.apply_update(echo));
    assert_eq!(store.records().len(), 1);
    assert_eq!(store.records()[0].id, "a");
}

#[test]
fn test_apply_update_keeps_history_when_echo_omits_it() {
    let mut store = ConsultationStore::new();
    let ticket = store.begin_fetch();
    let mut a = record("a", "Asha");
    a.call_history = vec![serde_json::from_value(serde_json::json!({
        "status": "MISSED", "calledBy": "Priya"
    }))
    .unwrap()];
    store.commit_fetch(ticket, vec![a]);

    let mut echo = record("a", "Asha");
    echo.call_status = Some(CallStatus::Completed);
    store.apply_update(echo);

    assert_eq!(store.records()[0].call_history.len(), 1);
}

#[test]
fn test_selection_survives_filter_changes() {
    let mut store = ConsultationStore::new();
    let ticket = store.begin_fetch();
    let mut a = record("a", "Asha");
    a.state = "Kerala".to_string();
    let mut b = record("b", "Rahul");
    b.state = "Punjab".to_string();
    store.commit_fetch(ticket, vec![a, b]);

    // select everything passing the Kerala filter
    store.filters_mut().set_state(Some("Kerala".to_string()));
    store.select_all_filtered();
    assert_eq!(store.selection(), ["a".to_string()]);

    // switching the filter hides "a" but keeps it selected
    store.filters_mut().set_state(Some("Punjab".to_string()));
    assert!(store.filtered().iter().all(|r| r.id != "a"));
    assert_eq!(store.selection(), ["a".to_string()]);

    // re-selecting all operates on the *current* filtered subset only
    store.select_all_filtered();
    assert_eq!(store.selection(), ["b".to_string()]);
}

#[test]
fn test_selected_records_resolve_in_list_order() {
    let mut store = ConsultationStore::new();
    let ticket = store.begin_fetch();
    store.commit_fetch(
        ticket,
        vec![record("a", "Asha"), record("b", "Rahul"), record("c", "Meera")],
    );
    store.select("c");
    store.select("a");

    let selected: Vec<&str> = store
        .selected_records()
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(selected, ["a", "c"]);
}

#[test]
fn test_clear_filters_restores_full_view() {
    let mut store = ConsultationStore::new();
    let ticket = store.begin_fetch();
    store.commit_fetch(ticket, vec![record("a", "Asha"), record("b", "Rahul")]);

    *store.filters_mut() = Filters {
        search: "asha".to_string(),
        ..Filters::default()
    };
    assert_eq!(store.filtered().len(), 1);

    store.filters_mut().clear();
    assert_eq!(store.filtered().len(), 2);
}
