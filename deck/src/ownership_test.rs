use std::rc::Rc;

use super::*;
use crate::clock::ManualClock;

const STALE_MS: Millis = 5_000;

fn setup() -> (KeyValueStore, ManualClock) {
    (KeyValueStore::in_memory("t"), ManualClock::new(100_000))
}

/// Two "tabs" sharing one store and one clock.
fn tab(store: &KeyValueStore, clock: &ManualClock) -> TabOwnership {
    TabOwnership::new(store.clone(), "travel", STALE_MS, Rc::new(clock.clone()))
}

// =============================================================
// OwnerId
// =============================================================

#[test]
fn generated_ids_are_unique() {
    assert_ne!(OwnerId::generate(), OwnerId::generate());
}

#[test]
fn owner_id_serializes_transparently() {
    let id = OwnerId::new("tab-1");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"tab-1\"");
    assert_eq!(id.to_string(), "tab-1");
    assert_eq!(id.as_str(), "tab-1");
}

// =============================================================
// is_owner
// =============================================================

#[test]
fn no_token_means_anyone_is_owner() {
    let (store, clock) = setup();
    assert!(tab(&store, &clock).is_owner(&OwnerId::new("a")));
}

#[test]
fn fresh_token_of_other_tab_blocks() {
    let (store, clock) = setup();
    let a = OwnerId::new("a");
    let b = OwnerId::new("b");
    assert!(tab(&store, &clock).claim(&a));
    clock.advance(STALE_MS);
    assert!(!tab(&store, &clock).is_owner(&b));
    assert!(tab(&store, &clock).is_owner(&a));
}

#[test]
fn stale_token_lets_other_tab_own() {
    let (store, clock) = setup();
    let a = OwnerId::new("a");
    let b = OwnerId::new("b");
    tab(&store, &clock).claim(&a);
    clock.advance(STALE_MS + 1);
    assert!(tab(&store, &clock).is_owner(&b));
}

#[test]
fn is_owner_does_not_write() {
    let (store, clock) = setup();
    let a = OwnerId::new("a");
    tab(&store, &clock).claim(&a);
    clock.advance(STALE_MS + 1);
    assert!(tab(&store, &clock).is_owner(&OwnerId::new("b")));
    assert_eq!(tab(&store, &clock).token().unwrap().owner_id, a);
}

// =============================================================
// claim / renew / release
// =============================================================

#[test]
fn claim_refuses_live_lease_of_other() {
    let (store, clock) = setup();
    let t = tab(&store, &clock);
    assert!(t.claim(&OwnerId::new("a")));
    assert!(!t.claim(&OwnerId::new("b")));
    assert_eq!(t.current_owner(), Some(OwnerId::new("a")));
}

#[test]
fn claim_takes_over_stale_lease() {
    let (store, clock) = setup();
    let t = tab(&store, &clock);
    t.claim(&OwnerId::new("a"));
    clock.advance(STALE_MS + 1);
    assert!(t.claim(&OwnerId::new("b")));
    assert_eq!(t.token().unwrap(), OwnershipToken { owner_id: OwnerId::new("b"), heartbeat_at: 105_001 });
}

#[test]
fn renew_keeps_lease_alive() {
    let (store, clock) = setup();
    let a = OwnerId::new("a");
    let b = OwnerId::new("b");
    let t = tab(&store, &clock);
    t.claim(&a);
    for _ in 0..5 {
        clock.advance(2_000);
        assert!(t.renew(&a));
    }
    assert!(!t.is_owner(&b));
    assert!(!t.claim(&b));
}

#[test]
fn missing_renewals_surrender_lease() {
    let (store, clock) = setup();
    let a = OwnerId::new("a");
    let b = OwnerId::new("b");
    let t = tab(&store, &clock);
    t.claim(&a);
    clock.advance(STALE_MS + 1);
    assert!(t.claim(&b));
    assert!(!t.renew(&a));
    assert!(!t.is_owner(&a));
}

#[test]
fn renew_without_token_fails() {
    let (store, clock) = setup();
    assert!(!tab(&store, &clock).renew(&OwnerId::new("a")));
}

#[test]
fn release_only_by_holder() {
    let (store, clock) = setup();
    let t = tab(&store, &clock);
    t.claim(&OwnerId::new("a"));
    assert!(!t.release(&OwnerId::new("b")));
    assert!(t.token().is_some());
    assert!(t.release(&OwnerId::new("a")));
    assert!(t.token().is_none());
    assert!(t.is_owner(&OwnerId::new("b")));
}

#[test]
fn current_owner_ignores_stale_token() {
    let (store, clock) = setup();
    let t = tab(&store, &clock);
    t.claim(&OwnerId::new("a"));
    clock.advance(STALE_MS + 1);
    assert_eq!(t.current_owner(), None);
}

#[test]
fn scopes_are_independent() {
    let (store, clock) = setup();
    let travel = tab(&store, &clock);
    let stocks = TabOwnership::new(store.clone(), "stocks", STALE_MS, Rc::new(clock.clone()));
    travel.claim(&OwnerId::new("a"));
    assert!(stocks.claim(&OwnerId::new("b")));
}
