//! Stock integration tests — stored-product CRUD, referential checks,
//! fresh stock aggregation, low-stock detection, and the expiry window.

use chrono::{Duration, Utc};
use tempfile::TempDir;

use larder_core::entities::{
    LocationKind, NewProductTemplate, NewStorageLocation, NewStoredProduct, ProductKind,
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
        kind: LocationKind::Fridge,
        extra: None,
    }
}

fn template(name: &str, minimum: f64) -> NewProductTemplate {
    NewProductTemplate {
        brand: Some("Acme".into()),
        name: name.into(),
        barcode: None,
        kind: ProductKind::Dairy,
        minimum_quantity: minimum,
        default_unit: Some("L".into()),
        extra: None,
    }
}

fn product(template_id: i64, location_id: i64, quantity: f64) -> NewStoredProduct {
    NewStoredProduct {
        template_id,
        location_id,
        quantity,
        unit: "L".into(),
        expiry_date: None,
        purchase_date: None,
        extra: None,
    }
}

/// Creates one location + one template and returns their ids.
fn seed(engine: &LarderEngine, minimum: f64) -> (i64, i64) {
    let loc = engine.create_location(&location("Fridge")).unwrap();
    let tpl = engine.create_template(&template("Milk", minimum)).unwrap();
    (loc.id, tpl.id)
}

// ─── Stored product CRUD ────────────────────────────────────────────

#[test]
fn stored_product_create_get_list() {
    let (_dir, engine) = temp_engine();
    let (loc_id, tpl_id) = seed(&engine, 2.0);

    let created = engine
        .create_stored_product(&product(tpl_id, loc_id, 1.5))
        .unwrap();
    assert!(created.id > 0);
    assert_eq!(created.quantity, 1.5);
    assert_eq!(created.unit, "L");

    assert_eq!(engine.get_stored_product(created.id).unwrap(), created);
    assert_eq!(engine.list_stored_products().unwrap(), vec![created]);
}

#[test]
fn create_with_unknown_template_is_invalid_reference() {
    let (_dir, engine) = temp_engine();
    let (loc_id, _) = seed(&engine, 2.0);

    let err = engine
        .create_stored_product(&product(9999, loc_id, 1.0))
        .unwrap_err();
    assert!(matches!(
        err,
        LarderError::InvalidReference { entity: "product_template", id: 9999 }
    ));
}

#[test]
fn create_with_deleted_location_is_invalid_reference() {
    let (_dir, engine) = temp_engine();
    let (loc_id, tpl_id) = seed(&engine, 2.0);
    engine.soft_delete_location(loc_id).unwrap();

    let err = engine
        .create_stored_product(&product(tpl_id, loc_id, 1.0))
        .unwrap_err();
    assert!(matches!(
        err,
        LarderError::InvalidReference { entity: "storage_location", .. }
    ));
}

#[test]
fn update_rechecks_references() {
    let (_dir, engine) = temp_engine();
    let (loc_id, tpl_id) = seed(&engine, 2.0);
    let created = engine
        .create_stored_product(&product(tpl_id, loc_id, 1.0))
        .unwrap();

    let mut fields = product(tpl_id, 9999, 1.0);
    let err = engine.update_stored_product(created.id, &fields).unwrap_err();
    assert!(matches!(
        err,
        LarderError::InvalidReference { entity: "storage_location", id: 9999 }
    ));

    fields.location_id = loc_id;
    fields.quantity = 3.0;
    let updated = engine.update_stored_product(created.id, &fields).unwrap();
    assert_eq!(updated.quantity, 3.0);
    assert_eq!(engine.get_stored_product(created.id).unwrap(), updated);
}

#[test]
fn soft_deleted_product_is_hidden_but_auditable() {
    let (_dir, engine) = temp_engine();
    let (loc_id, tpl_id) = seed(&engine, 2.0);
    let created = engine
        .create_stored_product(&product(tpl_id, loc_id, 1.0))
        .unwrap();

    engine.soft_delete_stored_product(created.id).unwrap();

    assert!(matches!(
        engine.get_stored_product(created.id).unwrap_err(),
        LarderError::NotFound { entity: "stored_product", .. }
    ));
    assert!(engine.list_stored_products().unwrap().is_empty());

    let ghost = engine
        .get_stored_product_including_deleted(created.id)
        .unwrap();
    assert!(ghost.deleted);
}

#[test]
fn list_by_location_and_template_filter_live_rows() {
    let (_dir, engine) = temp_engine();
    let fridge = engine.create_location(&location("Fridge")).unwrap();
    let pantry = engine.create_location(&location("Pantry")).unwrap();
    let tpl = engine.create_template(&template("Milk", 0.0)).unwrap();

    let in_fridge = engine
        .create_stored_product(&product(tpl.id, fridge.id, 1.0))
        .unwrap();
    let in_pantry = engine
        .create_stored_product(&product(tpl.id, pantry.id, 2.0))
        .unwrap();

    assert_eq!(
        engine.list_stored_products_at(fridge.id).unwrap(),
        vec![in_fridge.clone()]
    );
    assert_eq!(
        engine.list_stored_products_for_template(tpl.id).unwrap(),
        vec![in_fridge, in_pantry]
    );
    // Unknown location is an empty result, not an error.
    assert!(engine.list_stored_products_at(9999).unwrap().is_empty());
}

// ─── Stock aggregation ──────────────────────────────────────────────

#[test]
fn current_stock_sums_live_quantities() {
    let (_dir, engine) = temp_engine();
    let (loc_id, tpl_id) = seed(&engine, 2.0);

    assert_eq!(engine.current_stock(tpl_id).unwrap(), 0.0);

    engine
        .create_stored_product(&product(tpl_id, loc_id, 1.0))
        .unwrap();
    let second = engine
        .create_stored_product(&product(tpl_id, loc_id, 0.5))
        .unwrap();
    assert_eq!(engine.current_stock(tpl_id).unwrap(), 1.5);

    // Consuming a unit is reflected on the next call; nothing is cached.
    engine.soft_delete_stored_product(second.id).unwrap();
    assert_eq!(engine.current_stock(tpl_id).unwrap(), 1.0);
}

#[test]
fn current_stock_for_unknown_template_is_not_found() {
    let (_dir, engine) = temp_engine();
    assert!(matches!(
        engine.current_stock(9999).unwrap_err(),
        LarderError::NotFound { entity: "product_template", .. }
    ));
}

#[test]
fn current_stock_for_deleted_template_is_not_found() {
    let (_dir, engine) = temp_engine();
    let (loc_id, tpl_id) = seed(&engine, 2.0);
    engine
        .create_stored_product(&product(tpl_id, loc_id, 1.0))
        .unwrap();
    engine.soft_delete_template(tpl_id).unwrap();

    assert!(matches!(
        engine.current_stock(tpl_id).unwrap_err(),
        LarderError::NotFound { .. }
    ));
}

#[test]
fn low_stock_is_strictly_below_minimum() {
    let (_dir, engine) = temp_engine();
    let loc = engine.create_location(&location("Fridge")).unwrap();
    let short = engine.create_template(&template("Milk", 2.0)).unwrap();
    let exact = engine.create_template(&template("Butter", 1.0)).unwrap();
    let empty = engine.create_template(&template("Eggs", 6.0)).unwrap();
    let no_minimum = engine.create_template(&template("Jam", 0.0)).unwrap();

    engine
        .create_stored_product(&product(short.id, loc.id, 1.0))
        .unwrap();
    engine
        .create_stored_product(&product(exact.id, loc.id, 1.0))
        .unwrap();
    engine
        .create_stored_product(&product(no_minimum.id, loc.id, 5.0))
        .unwrap();

    let entries = engine.low_stock().unwrap();
    assert_eq!(entries.len(), 2);

    // Ordered by template id: Milk before Eggs.
    assert_eq!(entries[0].template.id, short.id);
    assert_eq!(entries[0].current_stock, 1.0);
    assert_eq!(entries[0].shortfall, 1.0);

    assert_eq!(entries[1].template.id, empty.id);
    assert_eq!(entries[1].current_stock, 0.0);
    assert_eq!(entries[1].shortfall, 6.0);

    // Stock exactly at the minimum is not low; zero minimum never is.
    assert!(entries.iter().all(|e| e.template.id != exact.id));
    assert!(entries.iter().all(|e| e.template.id != no_minimum.id));
}

#[test]
fn low_stock_tracks_soft_deletes() {
    let (_dir, engine) = temp_engine();
    let (loc_id, tpl_id) = seed(&engine, 2.0);
    let p = engine
        .create_stored_product(&product(tpl_id, loc_id, 3.0))
        .unwrap();
    assert!(engine.low_stock().unwrap().is_empty());

    // Deleting the only unit drops stock to zero.
    engine.soft_delete_stored_product(p.id).unwrap();
    let entries = engine.low_stock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].current_stock, 0.0);

    // A deleted template no longer reports shortages.
    engine.soft_delete_template(tpl_id).unwrap();
    assert!(engine.low_stock().unwrap().is_empty());
}

// ─── Expiry window ──────────────────────────────────────────────────

#[test]
fn expiring_within_window_sorted_soonest_first() {
    let (_dir, engine) = temp_engine();
    let (loc_id, tpl_id) = seed(&engine, 0.0);
    let now = Utc::now();

    let mut soon = product(tpl_id, loc_id, 1.0);
    soon.expiry_date = Some(now + Duration::days(2));
    let mut expired = product(tpl_id, loc_id, 1.0);
    expired.expiry_date = Some(now - Duration::days(1));
    let mut far = product(tpl_id, loc_id, 1.0);
    far.expiry_date = Some(now + Duration::days(30));
    let no_expiry = product(tpl_id, loc_id, 1.0);

    let soon = engine.create_stored_product(&soon).unwrap();
    let expired = engine.create_stored_product(&expired).unwrap();
    engine.create_stored_product(&far).unwrap();
    engine.create_stored_product(&no_expiry).unwrap();

    let expiring = engine.list_expiring_within(7).unwrap();
    assert_eq!(expiring, vec![expired, soon]);

    // A wide enough window picks up the far product too.
    assert_eq!(engine.list_expiring_within(60).unwrap().len(), 3);
}

#[test]
fn expiring_soon_uses_the_configured_window() {
    let (_dir, engine) = temp_engine();
    let (loc_id, tpl_id) = seed(&engine, 0.0);

    let mut soon = product(tpl_id, loc_id, 1.0);
    soon.expiry_date = Some(Utc::now() + Duration::days(2));
    let soon = engine.create_stored_product(&soon).unwrap();

    // Default window is 7 days.
    assert_eq!(engine.expiry_window_days(), 7);
    assert_eq!(engine.list_expiring_soon().unwrap(), vec![soon]);
}
