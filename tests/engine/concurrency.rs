//! Concurrent activation against the in-memory store.

#[path = "../common/mod.rs"]
mod common;
use common::*;

use std::sync::Barrier;

#[test]
fn test_concurrent_activations_never_oversell() {
    const SEATS: i64 = 3;
    const EXTRA: usize = 7;

    let (engine, _clock) = memory_engine();
    insert_memory_license(&engine, "RACE-1", "key", ONE_DAY, SEATS);

    let callers = SEATS as usize + EXTRA;
    let barrier = Barrier::new(callers);

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..callers)
            .map(|i| {
                let engine = &engine;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    engine.activate("RACE-1", "key", &format!("machine-{}", i))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let exhausted = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::SeatsExhausted { .. })))
        .count();

    assert_eq!(successes, SEATS as usize, "exactly max_seats callers should win");
    assert_eq!(exhausted, EXTRA, "every other caller should see SeatsExhausted");

    let first_uses = results
        .iter()
        .filter(|r| matches!(r, Ok(o) if o.kind == ActivationKind::FirstUse))
        .count();
    assert_eq!(first_uses, 1, "only one caller may fix the expiry window");

    assert_eq!(
        engine.store().activations("RACE-1").unwrap().len(),
        SEATS as usize
    );
}

#[test]
fn test_concurrent_same_machine_takes_one_seat() {
    let (engine, _clock) = memory_engine();
    insert_memory_license(&engine, "SAME-1", "key", ONE_DAY, 5);

    let barrier = Barrier::new(8);
    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = &engine;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    engine.activate("SAME-1", "key", "shared-machine")
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.iter().all(|r| r.is_ok()));
    let already = results
        .iter()
        .filter(|r| matches!(r, Ok(o) if o.kind == ActivationKind::AlreadyActivated))
        .count();
    assert_eq!(already, 7);
    assert_eq!(engine.store().activations("SAME-1").unwrap().len(), 1);
}

#[test]
fn test_units_for_different_licenses_do_not_block_each_other() {
    let (engine, _clock) = memory_engine();
    insert_memory_license(&engine, "HELD", "key", ONE_DAY, 1);
    insert_memory_license(&engine, "FREE", "key", ONE_DAY, 1);

    // Activating FREE while HELD's unit of work is open would deadlock if the
    // store took a lock wider than one license.
    let outcome = engine
        .store()
        .with_license("HELD", |_unit| engine.activate("FREE", "key", "machine-a"))
        .unwrap();

    assert_eq!(outcome.kind, ActivationKind::FirstUse);
    assert_eq!(engine.store().activations("FREE").unwrap().len(), 1);
    assert!(engine.store().activations("HELD").unwrap().is_empty());
}

#[test]
fn test_failed_unit_of_work_leaves_no_writes() {
    let (engine, _clock) = memory_engine();
    let license = insert_memory_license(&engine, "ROLL-1", "key", ONE_DAY, 2);

    let result: Result<(), AppError> = engine.store().with_license("ROLL-1", |unit| {
        let mut loaded = unit.load()?.expect("license should load");
        loaded.first_activation_at = Some(T0);
        loaded.expires_at = Some(T0 + ONE_DAY);
        unit.save(&loaded)?;
        unit.insert_activation(&license.id, "machine-a", T0)?;
        Err(AppError::Internal("injected failure".into()))
    });
    assert!(result.is_err());

    let after = engine.store().license("ROLL-1").unwrap().unwrap();
    assert_eq!(after.first_activation_at, None);
    assert_eq!(after.expires_at, None);
    assert!(engine.store().activations("ROLL-1").unwrap().is_empty());

    // The license is still fully usable afterwards
    let outcome = engine.activate("ROLL-1", "key", "machine-a").unwrap();
    assert_eq!(outcome.kind, ActivationKind::FirstUse);
}

#[test]
fn test_store_rejects_duplicate_machine_row() {
    let (engine, _clock) = memory_engine();
    let license = insert_memory_license(&engine, "DUP-1", "key", ONE_DAY, 5);

    let result = engine.store().with_license("DUP-1", |unit| {
        unit.insert_activation(&license.id, "machine-a", T0)?;
        unit.insert_activation(&license.id, "machine-a", T0)
    });

    assert!(result.is_err(), "second row for the same machine must fail");
    assert!(engine.store().activations("DUP-1").unwrap().is_empty());
}
