//! Concurrency integration tests — the uniqueness race, mixed
//! read/write load through the pool, parallel moves, and the
//! trait-object surface.

use std::sync::{Arc, Barrier};

use tempfile::TempDir;

use larder_core::entities::{
    LocationKind, MovementKind, NewProductTemplate, NewStorageLocation, NewStoredProduct,
    ProductKind,
};
use larder_core::traits::{ICatalogStore, IShoppingStore, IStockStore};
use larder_core::LarderError;
use larder_storage::LarderEngine;

fn temp_engine() -> (TempDir, LarderEngine) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("test.db");
    let engine = LarderEngine::open(&db_path).unwrap();
    (dir, engine)
}

fn milk() -> NewProductTemplate {
    NewProductTemplate {
        brand: Some("Acme".into()),
        name: "Milk".into(),
        barcode: None,
        kind: ProductKind::Dairy,
        minimum_quantity: 2.0,
        default_unit: Some("L".into()),
        extra: None,
    }
}

/// Two simultaneous creates of the same (brand, name): the unique index
/// on live templates must let exactly one through.
#[test]
fn concurrent_duplicate_creates_yield_one_winner() {
    let (_dir, engine) = temp_engine();
    let engine = Arc::new(engine);
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let eng = Arc::clone(&engine);
            let bar = Arc::clone(&barrier);
            std::thread::spawn(move || {
                bar.wait();
                eng.create_template(&milk())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(LarderError::Conflict { .. })))
        .count();

    assert_eq!(wins, 1, "exactly one create should win the race");
    assert_eq!(conflicts, 1, "the loser should see a conflict, got {results:?}");
    assert_eq!(engine.list_templates().unwrap().len(), 1);
}

/// Mixed read/write load: two writers append stored products while six
/// readers hammer the aggregation paths. No panics, no deadlocks, and
/// the final stock accounts for every write.
#[test]
fn reads_proceed_while_writes_are_in_flight() {
    let (_dir, engine) = temp_engine();
    let engine = Arc::new(engine);

    let loc = engine
        .create_location(&NewStorageLocation {
            name: "Fridge".into(),
            kind: LocationKind::Fridge,
            extra: None,
        })
        .unwrap();
    let tpl = engine.create_template(&milk()).unwrap();

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let eng = Arc::clone(&engine);
            let bar = Arc::clone(&barrier);
            let (loc_id, tpl_id) = (loc.id, tpl.id);
            std::thread::spawn(move || {
                bar.wait();
                for _ in 0..25 {
                    if i < 2 {
                        eng.create_stored_product(&NewStoredProduct {
                            template_id: tpl_id,
                            location_id: loc_id,
                            quantity: 1.0,
                            unit: "L".into(),
                            expiry_date: None,
                            purchase_date: None,
                            extra: None,
                        })
                        .unwrap();
                    } else {
                        match i % 3 {
                            0 => {
                                eng.current_stock(tpl_id).unwrap();
                            }
                            1 => {
                                eng.low_stock().unwrap();
                            }
                            _ => {
                                eng.list_stored_products_at(loc_id).unwrap();
                            }
                        }
                    }
                }
            })
        })
        .collect();

    for h in handles {
        h.join().expect("thread panicked — possible deadlock or race");
    }

    assert_eq!(engine.current_stock(tpl.id).unwrap(), 50.0);
    assert_eq!(engine.list_stored_products().unwrap().len(), 50);
}

/// Four threads move four distinct products at once. Each receipt must
/// be internally consistent (movement matches the updated product) and
/// each product ends up with exactly one ledger entry.
#[test]
fn concurrent_moves_of_distinct_products_stay_consistent() {
    let (_dir, engine) = temp_engine();
    let engine = Arc::new(engine);

    let fridge = engine
        .create_location(&NewStorageLocation {
            name: "Fridge".into(),
            kind: LocationKind::Fridge,
            extra: None,
        })
        .unwrap();
    let freezer = engine
        .create_location(&NewStorageLocation {
            name: "Freezer".into(),
            kind: LocationKind::Freezer,
            extra: None,
        })
        .unwrap();
    let tpl = engine.create_template(&milk()).unwrap();

    let products: Vec<_> = (0..4)
        .map(|_| {
            engine
                .create_stored_product(&NewStoredProduct {
                    template_id: tpl.id,
                    location_id: fridge.id,
                    quantity: 2.0,
                    unit: "L".into(),
                    expiry_date: None,
                    purchase_date: None,
                    extra: None,
                })
                .unwrap()
        })
        .collect();

    let barrier = Arc::new(Barrier::new(4));
    let handles: Vec<_> = products
        .iter()
        .enumerate()
        .map(|(i, product)| {
            let eng = Arc::clone(&engine);
            let bar = Arc::clone(&barrier);
            let (product_id, freezer_id) = (product.id, freezer.id);
            let new_quantity = if i % 2 == 0 { Some(3.0) } else { None };
            std::thread::spawn(move || {
                bar.wait();
                eng.move_product(product_id, freezer_id, new_quantity).unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let receipt = handle.join().unwrap();
        let expected_quantity = if i % 2 == 0 { 3.0 } else { 2.0 };

        assert_eq!(receipt.product.id, products[i].id);
        assert_eq!(receipt.product.location_id, freezer.id);
        assert_eq!(receipt.product.quantity, expected_quantity);
        assert_eq!(receipt.movement.stored_product_id, products[i].id);
        assert_eq!(receipt.movement.kind, MovementKind::Moved);
        assert_eq!(receipt.movement.from_location_id, Some(fridge.id));
        assert_eq!(receipt.movement.to_location_id, Some(freezer.id));
        assert_eq!(receipt.movement.quantity, expected_quantity);

        let history = engine.list_movements(products[i].id).unwrap();
        assert_eq!(history.len(), 1, "exactly one move per product");
        assert_eq!(engine.get_stored_product(products[i].id).unwrap(), receipt.product);
    }

    assert_eq!(engine.list_stored_products_at(freezer.id).unwrap().len(), 4);
    assert!(engine.list_stored_products_at(fridge.id).unwrap().is_empty());
}

/// The `as_*_store` casts all point at the same engine, so writes made
/// through one view are visible through the others.
#[test]
fn trait_object_casts_share_the_engine() {
    let (_dir, engine) = temp_engine();
    let engine = Arc::new(engine);

    let catalog = engine.as_catalog_store();
    let stock = engine.as_stock_store();

    let loc = catalog
        .create_location(&NewStorageLocation {
            name: "Pantry".into(),
            kind: LocationKind::Pantry,
            extra: None,
        })
        .unwrap();
    let tpl = catalog.create_template(&milk()).unwrap();
    stock
        .create_stored_product(&NewStoredProduct {
            template_id: tpl.id,
            location_id: loc.id,
            quantity: 1.0,
            unit: "L".into(),
            expiry_date: None,
            purchase_date: None,
            extra: None,
        })
        .unwrap();

    assert_eq!(stock.current_stock(tpl.id).unwrap(), 1.0);
    assert_eq!(engine.as_shopping_store().list_shopping_lists().unwrap().len(), 0);
}

/// If this compiles, the engine satisfies every storage trait and is
/// safe to share across threads.
#[test]
fn engine_implements_all_storage_traits() {
    fn assert_traits(_: &(impl ICatalogStore + IStockStore + IShoppingStore)) {}
    fn assert_send_sync<T: Send + Sync>(_: &T) {}

    let (_dir, engine) = temp_engine();
    assert_traits(&engine);
    assert_send_sync(&engine);
}
