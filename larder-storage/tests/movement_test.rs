//! Movement ledger integration tests — explicit appends, history
//! ordering, and the composite move operation's receipt and atomicity.

use tempfile::TempDir;

use larder_core::entities::{
    LocationKind, MovementKind, NewMovement, NewProductTemplate, NewStorageLocation,
    NewStoredProduct, ProductKind,
};
use larder_core::traits::{ICatalogStore, IStockStore};
use larder_core::LarderError;
use larder_storage::LarderEngine;

fn temp_engine() -> (TempDir, LarderEngine) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("test.db");
    let engine = LarderEngine::open(&db_path).unwrap();
    (dir, engine)
}

fn location(name: &str) -> NewStorageLocation {
    NewStorageLocation {
        name: name.into(),
        kind: LocationKind::Pantry,
        extra: None,
    }
}

fn consumed(stored_product_id: i64, quantity: f64) -> NewMovement {
    NewMovement {
        stored_product_id,
        kind: MovementKind::Consumed,
        from_location_id: None,
        to_location_id: None,
        quantity,
        unit: "L".into(),
        context: None,
    }
}

/// One location, one template, one stored product with quantity 2.0.
fn seed(engine: &LarderEngine) -> (i64, i64) {
    let loc = engine.create_location(&location("Pantry")).unwrap();
    let tpl = engine
        .create_template(&NewProductTemplate {
            brand: None,
            name: "Oats".into(),
            barcode: None,
            kind: ProductKind::Other,
            minimum_quantity: 0.0,
            default_unit: None,
            extra: None,
        })
        .unwrap();
    let product = engine
        .create_stored_product(&NewStoredProduct {
            template_id: tpl.id,
            location_id: loc.id,
            quantity: 2.0,
            unit: "L".into(),
            expiry_date: None,
            purchase_date: None,
            extra: None,
        })
        .unwrap();
    (loc.id, product.id)
}

// ─── Explicit appends ───────────────────────────────────────────────

#[test]
fn record_and_list_in_append_order() {
    let (_dir, engine) = temp_engine();
    let (_loc_id, product_id) = seed(&engine);

    let first = engine.record_movement(&consumed(product_id, 0.5)).unwrap();
    let second = engine.record_movement(&consumed(product_id, 0.3)).unwrap();
    assert!(first.id < second.id);

    let history = engine.list_movements(product_id).unwrap();
    assert_eq!(history, vec![first, second]);
}

#[test]
fn record_for_unknown_product_is_invalid_reference() {
    let (_dir, engine) = temp_engine();
    seed(&engine);

    let err = engine.record_movement(&consumed(9999, 1.0)).unwrap_err();
    assert!(matches!(
        err,
        LarderError::InvalidReference { entity: "stored_product", id: 9999 }
    ));
}

#[test]
fn record_for_deleted_product_is_invalid_reference() {
    let (_dir, engine) = temp_engine();
    let (_loc_id, product_id) = seed(&engine);
    engine.soft_delete_stored_product(product_id).unwrap();

    let err = engine
        .record_movement(&consumed(product_id, 1.0))
        .unwrap_err();
    assert!(matches!(err, LarderError::InvalidReference { .. }));
}

#[test]
fn history_survives_product_soft_delete() {
    let (_dir, engine) = temp_engine();
    let (_loc_id, product_id) = seed(&engine);
    let movement = engine.record_movement(&consumed(product_id, 0.5)).unwrap();

    engine.soft_delete_stored_product(product_id).unwrap();
    assert_eq!(engine.list_movements(product_id).unwrap(), vec![movement]);
}

#[test]
fn unknown_product_history_is_empty() {
    let (_dir, engine) = temp_engine();
    assert!(engine.list_movements(9999).unwrap().is_empty());
}

// ─── Composite move ─────────────────────────────────────────────────

#[test]
fn move_relocates_and_appends_exactly_one_movement() {
    let (_dir, engine) = temp_engine();
    let (from_id, product_id) = seed(&engine);
    let to = engine.create_location(&location("Cellar")).unwrap();

    let receipt = engine.move_product(product_id, to.id, Some(1.5)).unwrap();

    assert_eq!(receipt.product.location_id, to.id);
    assert_eq!(receipt.product.quantity, 1.5);
    assert_eq!(receipt.movement.kind, MovementKind::Moved);
    assert_eq!(receipt.movement.from_location_id, Some(from_id));
    assert_eq!(receipt.movement.to_location_id, Some(to.id));
    assert_eq!(receipt.movement.quantity, 1.5);

    // The receipt matches what a fresh read sees.
    assert_eq!(engine.get_stored_product(product_id).unwrap(), receipt.product);
    assert_eq!(engine.list_movements(product_id).unwrap(), vec![receipt.movement]);
}

#[test]
fn move_without_quantity_keeps_the_old_quantity() {
    let (_dir, engine) = temp_engine();
    let (_from_id, product_id) = seed(&engine);
    let to = engine.create_location(&location("Cellar")).unwrap();

    let receipt = engine.move_product(product_id, to.id, None).unwrap();
    assert_eq!(receipt.product.quantity, 2.0);
    assert_eq!(receipt.movement.quantity, 2.0);

    // The context notes both quantities for the audit trail.
    let context: serde_json::Value =
        serde_json::from_str(receipt.movement.context.as_deref().unwrap()).unwrap();
    assert_eq!(context["old_quantity"], 2.0);
    assert_eq!(context["new_quantity"], 2.0);
}

#[test]
fn move_to_deleted_location_leaves_no_trace() {
    let (_dir, engine) = temp_engine();
    let (from_id, product_id) = seed(&engine);
    let to = engine.create_location(&location("Cellar")).unwrap();
    engine.soft_delete_location(to.id).unwrap();

    let err = engine.move_product(product_id, to.id, Some(1.0)).unwrap_err();
    assert!(matches!(
        err,
        LarderError::InvalidReference { entity: "storage_location", .. }
    ));

    // Neither half of the composite happened.
    let product = engine.get_stored_product(product_id).unwrap();
    assert_eq!(product.location_id, from_id);
    assert_eq!(product.quantity, 2.0);
    assert!(engine.list_movements(product_id).unwrap().is_empty());
}

#[test]
fn move_with_negative_quantity_is_rejected() {
    let (_dir, engine) = temp_engine();
    let (from_id, product_id) = seed(&engine);
    let to = engine.create_location(&location("Cellar")).unwrap();

    let err = engine.move_product(product_id, to.id, Some(-1.0)).unwrap_err();
    assert!(matches!(err, LarderError::Validation { .. }));

    let product = engine.get_stored_product(product_id).unwrap();
    assert_eq!(product.location_id, from_id);
    assert!(engine.list_movements(product_id).unwrap().is_empty());
}

#[test]
fn move_of_deleted_product_is_not_found() {
    let (_dir, engine) = temp_engine();
    let (_from_id, product_id) = seed(&engine);
    let to = engine.create_location(&location("Cellar")).unwrap();
    engine.soft_delete_stored_product(product_id).unwrap();

    let err = engine.move_product(product_id, to.id, None).unwrap_err();
    assert!(matches!(
        err,
        LarderError::NotFound { entity: "stored_product", .. }
    ));
}

#[test]
fn moving_twice_builds_a_two_step_trail() {
    let (_dir, engine) = temp_engine();
    let (first_id, product_id) = seed(&engine);
    let second = engine.create_location(&location("Cellar")).unwrap();
    let third = engine.create_location(&location("Garage")).unwrap();

    engine.move_product(product_id, second.id, None).unwrap();
    engine.move_product(product_id, third.id, Some(1.0)).unwrap();

    let history = engine.list_movements(product_id).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].from_location_id, Some(first_id));
    assert_eq!(history[0].to_location_id, Some(second.id));
    assert_eq!(history[1].from_location_id, Some(second.id));
    assert_eq!(history[1].to_location_id, Some(third.id));
    assert_eq!(history[1].quantity, 1.0);
}
