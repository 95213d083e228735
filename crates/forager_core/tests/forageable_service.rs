use forager_core::{Forageable, ForageableRepository, ForageableService, ForageableStore};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::timeout;

const OBSERVE_TIMEOUT: Duration = Duration::from_secs(5);

fn service_over(store: &ForageableStore) -> ForageableService {
    ForageableService::new(store.clone(), Handle::current())
}

async fn wait_until<T, P>(rx: &mut watch::Receiver<T>, predicate: P) -> T
where
    T: Clone,
    P: FnMut(&T) -> bool,
{
    timeout(OBSERVE_TIMEOUT, rx.wait_for(predicate))
        .await
        .expect("timed out waiting for observed state")
        .expect("observer task stopped early")
        .clone()
}

#[tokio::test]
async fn add_forageable_appears_in_observed_list() {
    let store = ForageableStore::open_in_memory().unwrap();
    let service = service_over(&store);

    let mut forageables = service.forageables();
    assert!(forageables.borrow().is_empty());

    service.add_forageable("Wild garlic", "River bend meadow", true, "carpet in april");

    let observed = wait_until(&mut forageables, |list| list.len() == 1).await;
    let record = &observed[0];
    assert!(record.id.is_some());
    assert_eq!(record.name, "Wild garlic");
    assert_eq!(record.address, "River bend meadow");
    assert!(record.in_season);
    assert_eq!(record.notes, "carpet in april");
}

#[tokio::test]
async fn observed_list_converges_after_write_burst() {
    let store = ForageableStore::open_in_memory().unwrap();
    let service = service_over(&store);

    let mut forageables = service.forageables();
    service.add_forageable("Blackthorn", "Hedgerow", false, "");
    service.add_forageable("Hawthorn", "Hedgerow", false, "");
    service.add_forageable("Rowan", "Hilltop", true, "");

    let observed = wait_until(&mut forageables, |list| list.len() == 3).await;
    assert!(observed.iter().all(|record| record.id.is_some()));
}

#[tokio::test]
async fn get_forageable_tracks_update_and_delete() {
    let store = ForageableStore::open_in_memory().unwrap();
    let service = service_over(&store);

    let id = store
        .upsert_forageable(&Forageable::new(
            "Blackberries",
            "Old rail cutting",
            false,
            "ripens late august",
        ))
        .unwrap();

    let mut single = service.get_forageable(id);
    {
        let seeded = single.borrow();
        let record = seeded.as_ref().expect("seeded stream should carry the record");
        assert_eq!(record.name, "Blackberries");
        assert!(!record.in_season);
    }

    service.update_forageable(id, "Blackberries", "Old rail cutting", true, "ripe now");
    let updated = wait_until(&mut single, |value| {
        matches!(value, Some(record) if record.in_season)
    })
    .await
    .expect("updated record should be present");
    assert_eq!(updated.notes, "ripe now");

    service.delete_forageable(updated);
    wait_until(&mut single, |value| value.is_none()).await;
    assert!(store.get_forageable(id).unwrap().is_none());
}

#[tokio::test]
async fn get_forageable_for_absent_id_observes_none() {
    let store = ForageableStore::open_in_memory().unwrap();
    let service = service_over(&store);

    let single = service.get_forageable(9_999);
    assert!(single.borrow().is_none());
}

#[tokio::test]
async fn find_forageables_by_name_is_exact_and_observable() {
    let store = ForageableStore::open_in_memory().unwrap();
    let service = service_over(&store);

    store
        .upsert_forageable(&Forageable::new("Morel", "Ash stand", true, ""))
        .unwrap();
    store
        .upsert_forageable(&Forageable::new("False morel", "Ash stand", true, ""))
        .unwrap();

    let by_name = service.find_forageables_by_name("Morel");
    assert_eq!(by_name.borrow().len(), 1);

    let mut no_hits = service.find_forageables_by_name("Chicken of the woods");
    assert!(no_hits.borrow().is_empty());

    service.add_forageable("Chicken of the woods", "Oak row", false, "");
    let observed = wait_until(&mut no_hits, |list| list.len() == 1).await;
    assert_eq!(observed[0].name, "Chicken of the woods");
}

#[tokio::test]
async fn is_valid_entry_requires_non_blank_name_and_address() {
    let store = ForageableStore::open_in_memory().unwrap();
    let service = service_over(&store);

    assert!(!service.is_valid_entry("", "addr"));
    assert!(!service.is_valid_entry("name", "  "));
    assert!(!service.is_valid_entry("\t", "\n"));
    assert!(service.is_valid_entry("name", "addr"));
}
