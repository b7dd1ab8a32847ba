//! Model Consistency Tests
//!
//! Every journaled mutation, undo and redo must leave a model that passes
//! `validate_model`, and undoing everything must return to the imported
//! state exactly.

mod common;

use common::{assert_valid, digest};
use dsmx_core::rules::{validate_model, validate_structure};
use dsmx_core::{DsmCore, DsmError, DsmModel, ElementId};

fn fixture() -> (DsmCore, ElementId, ElementId, ElementId) {
    let mut core = DsmCore::new();
    let a = core.import_element("App.Ui.A", "A", "class", None, None).unwrap();
    let b = core.import_element("App.Logic.B", "B", "class", None, None).unwrap();
    let c = core.import_element("Lib.C", "C", "class", None, None).unwrap();
    core.import_relation(a, b, "call", 2, None);
    core.import_relation(b, c, "call", 1, None);
    core.import_relation(c, a, "callback", 1, None);
    core.finalize_import(None).unwrap();
    (core, a, b, c)
}

#[test]
fn test_every_step_keeps_model_valid() {
    let (mut core, a, b, c) = fixture();
    let baseline = digest(&core);
    let app = core.find_element("App").unwrap();
    let lib = core.find_element("Lib").unwrap();
    let ui = core.find_element("App.Ui").unwrap();

    let steps: Vec<Box<dyn Fn(&mut DsmCore) -> dsmx_core::Result<()>>> = vec![
        Box::new(move |core: &mut DsmCore| core.change_element_parent(a, lib, 1)),
        Box::new(move |core: &mut DsmCore| core.create_element(ui, "D", "class", None, None).map(drop)),
        Box::new(move |core: &mut DsmCore| core.create_relation(b, a, "call", 4, None).map(drop)),
        Box::new(move |core: &mut DsmCore| core.change_element_name(c, "Core")),
        Box::new(move |core: &mut DsmCore| core.move_element_up(a)),
        Box::new(move |core: &mut DsmCore| core.sort(app, "Alphabetical", None).map(drop)),
        Box::new(move |core: &mut DsmCore| core.sort(lib, "Partition", None).map(drop)),
        Box::new(move |core: &mut DsmCore| core.delete_element(b)),
        Box::new(move |core: &mut DsmCore| core.make_snapshot("checkpoint")),
    ];
    for step in &steps {
        step(&mut core).unwrap();
        assert_valid(&core);
    }
    let edited = digest(&core);

    while core.undo().unwrap() {
        assert_valid(&core);
    }
    assert_eq!(digest(&core), baseline);

    while core.redo().unwrap() {
        assert_valid(&core);
    }
    assert_eq!(digest(&core), edited);
}

#[test]
fn test_relation_changes_keep_weights_consistent() {
    let (mut core, a, b, _) = fixture();
    let relation = core.find_relations(a, b)[0].id;
    let app = core.find_element("App").unwrap();

    core.change_relation_weight(relation, 10).unwrap();
    assert_eq!(core.dependency_weight(a, b), 10);
    core.change_relation_type(relation, "inherit").unwrap();
    assert_eq!(core.relation(relation).unwrap().relation_type, "inherit");
    core.delete_relation(relation).unwrap();
    assert_eq!(core.find_internal_relations(app).len(), 0);
    assert_valid(&core);

    core.undo().unwrap();
    core.undo().unwrap();
    core.undo().unwrap();
    assert_eq!(core.relation(relation).unwrap().weight, 2);
    assert_eq!(core.relation(relation).unwrap().relation_type, "call");
    assert_valid(&core);
}

#[test]
fn test_retype_onto_existing_key_is_rejected() {
    let (mut core, a, b, _) = fixture();
    let call = core.find_relations(a, b)[0].id;
    core.create_relation(a, b, "use", 1, None).unwrap();

    let err = core.change_relation_type(call, "use").unwrap_err();
    assert!(matches!(err, DsmError::DuplicateRelation { .. }));
    assert_valid(&core);
}

#[test]
fn test_unfinalized_model_fails_order_check_only() {
    let mut model = DsmModel::new();
    model.create_element("Pkg.A", "A", "class", None, None).unwrap();

    assert!(validate_structure(&model).is_ok());
    assert!(matches!(
        validate_model(&model),
        Err(DsmError::InvariantViolation { .. })
    ));

    model.assign_element_order();
    assert!(validate_model(&model).is_ok());
}
