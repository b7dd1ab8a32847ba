#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::pkg_core;
use dsmx_core::errors::DsmError;
use dsmx_core::logging_facility::test_capture::init_test_capture;
use dsmx_core::{log_op_end, log_op_error, log_op_start, DsmConfig, DsmCore, ElementId};
use dsmx_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_ACTION_TYPE, FIELD_ALGORITHM,
    FIELD_DURATION_MS, FIELD_ELEMENT_ID, FIELD_ERR_CODE, FIELD_PROVIDER_ID, FIELD_RELATION_ID,
};
use tracing::Level;

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, element_id = 7);

    let events = capture.for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event(), Some(EVENT_START));
    assert_eq!(events[0].field(FIELD_ELEMENT_ID), Some("7"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_2";

    let err = DsmError::ElementNotFound {
        element_id: ElementId(3),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.for_op(op_name);
    let error_event = events
        .iter()
        .find(|e| e.event() == Some(EVENT_END_ERROR))
        .expect("error event");
    assert_eq!(error_event.level, Level::ERROR);
    assert_eq!(error_event.field(FIELD_ERR_CODE), Some("ERR_NOT_FOUND"));
    assert_eq!(error_event.field(FIELD_DURATION_MS), Some("10"));
}

#[test]
fn test_log_op_end_records_duration() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_3";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event(), Some(EVENT_END));
    assert_eq!(events[0].field(FIELD_DURATION_MS), Some("42"));
}

#[test]
fn test_finalize_import_logs_boundaries() {
    let capture = init_test_capture();
    let _ = pkg_core();

    capture.assert_event_exists("finalize_import", EVENT_START);
    capture.assert_event_exists("finalize_import", EVENT_END);
}

#[test]
fn test_mutation_logs_its_op_name() {
    let capture = init_test_capture();
    let (mut core, a, _) = pkg_core();

    core.change_element_type(a, "struct").unwrap();
    core.undo().unwrap();

    capture.assert_event_exists("change_element_type", EVENT_START);
    capture.assert_event_exists("change_element_type", EVENT_END);
    capture.assert_event_exists("undo", EVENT_END);
}

#[test]
fn test_mutation_boundaries_carry_action_type_and_subject() {
    // GIVEN a fresh model
    let capture = init_test_capture();
    let (mut core, a, _) = pkg_core();
    let element_id = a.get().to_string();

    // WHEN an element is renamed to a name no other test uses
    core.change_element_name(a, "RenamedForActionTypeLog").unwrap();

    // THEN both boundary events carry the action type and the element id
    let events: Vec<_> = capture
        .for_op("change_element_name")
        .into_iter()
        .filter(|e| e.field(FIELD_ELEMENT_ID) == Some(element_id.as_str()))
        .collect();
    for boundary in [EVENT_START, EVENT_END] {
        let event = events
            .iter()
            .find(|e| e.event() == Some(boundary))
            .expect("boundary event");
        assert_eq!(event.field(FIELD_ACTION_TYPE), Some("ElementChangeName"));
        assert_eq!(event.field(FIELD_RELATION_ID), None);
    }
}

#[test]
fn test_created_relation_id_is_logged_on_end() {
    let capture = init_test_capture();
    let (mut core, a, _) = pkg_core();
    let pkg = core.find_element("Pkg").unwrap();
    let c = core.create_element(pkg, "LogTarget", "class", None, None).unwrap();

    let relation = core.create_relation(a, c, "call", 1, None).unwrap().unwrap();

    let relation_id = relation.get().to_string();
    let end = capture
        .for_op("create_relation")
        .into_iter()
        .find(|e| {
            e.event() == Some(EVENT_END) && e.field(FIELD_RELATION_ID) == Some(relation_id.as_str())
        })
        .expect("end event with the created relation");
    assert_eq!(end.field(FIELD_ACTION_TYPE), Some("RelationCreate"));
    assert_eq!(end.field(FIELD_ELEMENT_ID), Some(a.get().to_string().as_str()));
}

#[test]
fn test_rejected_mutation_logs_action_type_with_error() {
    let capture = init_test_capture();
    let mut core = DsmCore::new();
    let a = core.import_element("Heavy.A", "A", "class", None, None).unwrap();
    let b = core.import_element("Heavy.B", "B", "class", None, None).unwrap();
    core.import_relation(a, b, "call", u32::MAX, None).unwrap();
    core.finalize_import(None).unwrap();

    assert!(core.create_relation(a, b, "call", 1, None).is_err());

    let rejected = capture
        .for_op("create_relation")
        .into_iter()
        .filter(|e| {
            e.event() == Some(EVENT_END_ERROR) && e.field(FIELD_ERR_CODE) == Some("ERR_INVALID_INPUT")
        })
        .count();
    assert!(rejected >= 1);
    assert!(capture
        .for_op("create_relation")
        .iter()
        .filter(|e| e.event() == Some(EVENT_END_ERROR))
        .all(|e| e.field(FIELD_ACTION_TYPE) == Some("RelationCreate")));
}

#[test]
fn test_failed_sort_logs_error_kind() {
    let capture = init_test_capture();
    let (mut core, _, _) = pkg_core();
    let pkg = core.find_element("Pkg").unwrap();

    assert!(core.sort(pkg, "Bogus", None).is_err());

    assert!(capture.for_op("sort").iter().any(|e| {
        e.event() == Some(EVENT_START) && e.field(FIELD_ALGORITHM) == Some("Bogus")
    }));
    assert!(capture.for_op("sort").iter().any(|e| {
        e.event() == Some(EVENT_END_ERROR) && e.field(FIELD_ERR_CODE) == Some("ERR_UNKNOWN_ALGORITHM")
    }));
}

#[test]
fn test_skipped_relation_warns_unless_disabled() {
    let capture = init_test_capture();
    let skipped_by = |provider: &str| {
        capture
            .for_op("import_relation")
            .iter()
            .filter(|e| e.level == Level::WARN && e.field(FIELD_PROVIDER_ID) == Some(provider))
            .count()
    };

    let mut core = DsmCore::new();
    let a = core.import_element("A", "A", "class", None, None).unwrap();
    core.import_relation(a, ElementId(9001), "call", 1, None);
    assert_eq!(skipped_by("9001"), 1);

    let mut quiet = DsmCore::with_config(DsmConfig {
        warn_on_skipped_relations: false,
        ..DsmConfig::default()
    });
    let a = quiet.import_element("A", "A", "class", None, None).unwrap();
    quiet.import_relation(a, ElementId(9002), "call", 1, None);
    assert_eq!(skipped_by("9002"), 0);
}
