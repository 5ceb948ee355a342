use marbleverse_core::jar::DropSpec;
use marbleverse_core::store::Store;
use marbleverse_core::{now_ms, AppState, MarbleSize, TonePreference, Vault, UNDO_WINDOW_MS};
use tempfile::TempDir;

fn temp_vault() -> (TempDir, Vault) {
    let dir = TempDir::new().expect("temp dir should be creatable");
    let vault = Vault::at(dir.path());
    (dir, vault)
}

fn one(note: Option<&str>) -> DropSpec {
    DropSpec {
        count: 1,
        honoring: false,
        note: note.map(|n| n.to_string()),
        color: "#FFD700".to_string(),
        category: "general".to_string(),
        label: None,
        size: MarbleSize::Lg,
    }
}

fn batch(count: usize) -> DropSpec {
    DropSpec { count, honoring: true, ..one(None) }
}

#[test]
fn empty_vault_opens_with_defaults() {
    let (_dir, vault) = temp_vault();
    let store = Store::open(vault);
    assert!(store.state().marbles.is_empty());
    assert_eq!(store.state().tone, TonePreference::Zen);
    assert!(store.state().sound_enabled);
}

#[test]
fn corrupt_state_document_opens_with_defaults() {
    let (_dir, vault) = temp_vault();
    std::fs::write(vault.dir().join("state.json"), "{not json").expect("write should succeed");
    let store = Store::open(vault);
    assert!(store.state().marbles.is_empty());
}

#[test]
fn drops_survive_a_reopen() {
    let (_dir, vault) = temp_vault();
    {
        let mut store = Store::open(vault.clone());
        store.drop_marbles(one(Some("kept my word"))).expect("drop should persist");
        store.drop_marbles(batch(3)).expect("batch should persist");
    }
    let store = Store::open(vault);
    assert_eq!(store.state().marbles.len(), 4);
    assert_eq!(store.state().marbles[0].note.as_deref(), Some("kept my word"));
    assert!(store.state().last_check_in.is_some());
}

#[test]
fn each_threshold_is_celebrated_exactly_once() {
    let (_dir, vault) = temp_vault();
    let mut store = Store::open(vault);

    let mut crossings = Vec::new();
    for _ in 0..8 {
        let outcome = store.drop_marbles(one(None)).expect("drop should persist");
        if let Some(m) = outcome.crossed {
            crossings.push(m);
        }
    }

    // Eight single drops cross 7 once; nothing else fires.
    assert_eq!(crossings, vec![7]);
    assert_eq!(store.state().milestones_reached, vec![7]);
    let flagged = store.state().marbles.iter().filter(|m| m.is_milestone()).count();
    assert_eq!(flagged, 1);
}

#[test]
fn celebrated_set_grows_by_at_most_one_per_batch() {
    let (_dir, vault) = temp_vault();
    let mut store = Store::open(vault);

    // 0 -> 20 spans 7 and 13, but a batch fires at most one threshold.
    let outcome = store.drop_marbles(batch(20)).expect("batch should persist");
    assert_eq!(outcome.crossed, Some(7));
    assert_eq!(store.state().milestones_reached, vec![7]);

    // 13 was overshot, not crossed; it never fires late.
    let outcome = store.drop_marbles(one(None)).expect("drop should persist");
    assert_eq!(outcome.crossed, None);
    assert_eq!(store.state().milestones_reached, vec![7]);
}

#[test]
fn zero_count_batch_is_rejected() {
    let (_dir, vault) = temp_vault();
    let mut store = Store::open(vault);
    assert!(store.drop_marbles(DropSpec { count: 0, ..one(None) }).is_err());
}

#[test]
fn preferences_persist() {
    let (_dir, vault) = temp_vault();
    {
        let mut store = Store::open(vault.clone());
        store.set_tone(TonePreference::Grounded).expect("tone should persist");
        store.set_sound(false).expect("sound should persist");
        store.set_ambient(true).expect("ambient should persist");
        store.complete_onboarding().expect("onboarding should persist");
    }
    let store = Store::open(vault);
    assert_eq!(store.state().tone, TonePreference::Grounded);
    assert!(!store.state().sound_enabled);
    assert!(store.state().ambient_enabled);
    assert!(store.state().onboarding_complete);
}

#[test]
fn tracked_dates_validate_and_persist() {
    let (_dir, vault) = temp_vault();
    let mut store = Store::open(vault.clone());

    assert!(store.add_tracked_date("  ", 0).is_err());
    store.add_tracked_date("quit", 1_000).expect("date should persist");
    assert!(store.add_tracked_date("quit", 2_000).is_err());

    assert!(store.remove_tracked_date("quit").expect("remove should persist"));
    assert!(!store.remove_tracked_date("quit").expect("second remove is a no-op"));
    assert!(Store::open(vault).state().tracked_dates.is_empty());
}

#[test]
fn restore_keeps_an_undo_snapshot() {
    let (_dir, vault) = temp_vault();
    let mut store = Store::open(vault);
    store.drop_marbles(one(Some("before"))).expect("drop should persist");

    let incoming = AppState::default();
    store.restore(incoming).expect("restore should persist");
    assert!(store.state().marbles.is_empty());
    assert!(store.undo_remaining_secs().is_some());

    assert!(store.undo_restore().expect("undo should persist"));
    assert_eq!(store.state().marbles.len(), 1);
    assert_eq!(store.state().marbles[0].note.as_deref(), Some("before"));

    // The slot is single-use.
    assert!(!store.undo_restore().expect("second undo finds nothing"));
}

#[test]
fn expired_undo_snapshot_is_discarded() {
    let (_dir, vault) = temp_vault();
    let mut store = Store::open(vault.clone());
    store.drop_marbles(one(None)).expect("drop should persist");

    // Snapshot saved just past the window.
    vault
        .save_undo(store.state(), now_ms() - UNDO_WINDOW_MS - 1_000)
        .expect("snapshot should write");
    assert!(store.undo_remaining_secs().is_none());
    assert!(!store.undo_restore().expect("expired snapshot is gone"));
}

#[test]
fn adopt_remote_replaces_state_without_a_snapshot() {
    let (_dir, vault) = temp_vault();
    let mut store = Store::open(vault.clone());
    store.drop_marbles(one(None)).expect("drop should persist");

    let mut incoming = AppState::default();
    incoming.milestones_reached = vec![7, 13];
    store.adopt_remote(incoming).expect("adopt should persist");

    assert!(store.state().marbles.is_empty());
    assert_eq!(store.state().milestones_reached, vec![7, 13]);
    assert!(store.undo_remaining_secs().is_none());
    // The replacement is wholesale and durable.
    assert_eq!(Store::open(vault).state().milestones_reached, vec![7, 13]);
}
