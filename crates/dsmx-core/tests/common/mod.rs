use dsmx_core::digest::model_digest;
use dsmx_core::rules::validate_model;
use dsmx_core::{DsmCore, ElementId};

/// Import `Pkg.A` and `Pkg.B` with A->B weight 3 and B->A weight 2
#[allow(dead_code)]
pub fn pkg_core() -> (DsmCore, ElementId, ElementId) {
    let mut core = DsmCore::new();
    let a = core.import_element("Pkg.A", "A", "class", None, None).unwrap();
    let b = core.import_element("Pkg.B", "B", "class", None, None).unwrap();
    core.import_relation(a, b, "call", 3, None);
    core.import_relation(b, a, "call", 2, None);
    core.finalize_import(None).unwrap();
    (core, a, b)
}

/// Import the leaves `names` under a container `X`, in the given order,
/// with `edges` as (consumer, provider) index pairs of weight 1
#[allow(dead_code)]
pub fn sibling_core(names: &[&str], edges: &[(usize, usize)]) -> (DsmCore, ElementId, Vec<ElementId>) {
    let mut core = DsmCore::new();
    let ids: Vec<ElementId> = names
        .iter()
        .map(|n| {
            core.import_element(&format!("X.{}", n), n, "class", None, None)
                .unwrap()
        })
        .collect();
    for &(consumer, provider) in edges {
        core.import_relation(ids[consumer], ids[provider], "call", 1, None);
    }
    core.finalize_import(None).unwrap();
    let x = core.find_element("X").unwrap();
    (core, x, ids)
}

/// Panic with the violation if the model is inconsistent
#[allow(dead_code)]
pub fn assert_valid(core: &DsmCore) {
    if let Err(err) = validate_model(core.model()) {
        panic!("model is inconsistent: {}", err);
    }
}

#[allow(dead_code)]
pub fn digest(core: &DsmCore) -> String {
    model_digest(core.model()).unwrap()
}
