mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, OnceLock};
use std::thread;
use std::time::Duration;

use common::{base_store, history, keys, set, setter, ArticleDetailsReducer, UserSchema};
use slicestore::{reducer_fn, Action, StateTree, Store};

#[test]
fn base_user_then_article_details_then_removed() {
    let store = base_store();
    assert_eq!(keys(&store.state()), vec!["user"]);

    store.register("articleDetails", ArticleDetailsReducer).unwrap();
    assert_eq!(keys(&store.state()), vec!["user"]);

    store.dispatch(Action::new("INIT"));
    assert_eq!(keys(&store.state()), vec!["articleDetails", "user"]);

    assert!(store.remove("articleDetails"));
    store.dispatch(Action::new("NEXT"));
    assert_eq!(keys(&store.state()), vec!["user"]);
}

#[test]
fn reregistered_user_reducer_applies_on_next_dispatch() {
    let store = base_store();

    store.register("user", setter(|v| v * 10)).unwrap();
    store.dispatch(set(5));
    assert_eq!(store.select::<i64>("user"), Some(50));

    store.register("user", setter(|v| v + 1)).unwrap();
    store.dispatch(set(5));
    assert_eq!(store.select::<i64>("user"), Some(6));
}

#[test]
fn user_slice_handles_its_actions() {
    let store = base_store();
    store.dispatch(Action::new("user/setAuthData").with_payload("rider-42"));
    store.dispatch(Action::new("user/initAuthData"));

    let user = store.select::<UserSchema>("user").unwrap();
    assert_eq!(user.auth_data.as_deref(), Some("rider-42"));
    assert!(user.inited);

    store.dispatch(Action::new("user/logout"));
    assert_eq!(store.select::<UserSchema>("user").unwrap().auth_data, None);
}

#[test]
fn snapshots_survive_later_dispatches() {
    let store = base_store();
    store.register("log", history()).unwrap();
    store.dispatch(Action::new("first"));
    let snapshot = store.state();

    store.dispatch(Action::new("second"));
    assert_eq!(
        snapshot.get::<Vec<String>>("log").map(Vec::len),
        Some(1)
    );
    assert_eq!(store.select::<Vec<String>>("log").map(|l| l.len()), Some(2));
}

#[test]
fn preloaded_feature_state_is_dropped_until_registered() {
    let preloaded = StateTree::new()
        .with_slice("loginForm", 3i64)
        .unwrap();
    let store = Store::builder()
        .slice("user", common::UserReducer)
        .preloaded(preloaded)
        .build()
        .unwrap();

    assert_eq!(keys(&store.state()), vec!["user"]);
}

#[test]
fn listener_sees_newly_registered_slice() {
    let store = base_store();
    let saw_rides = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&saw_rides);
    store.subscribe(move |state| {
        if state.contains("rides") {
            flag.store(true, Ordering::SeqCst);
        }
    });

    store.register("rides", history()).unwrap();
    assert!(!saw_rides.load(Ordering::SeqCst));
    store.dispatch(Action::new("rides/fetch"));
    assert!(saw_rides.load(Ordering::SeqCst));
}

#[test]
fn registration_during_reduce_waits_for_next_dispatch() {
    let store = base_store();
    let barrier = Arc::new(Barrier::new(2));
    let armed = Arc::new(AtomicBool::new(false));

    let reducer_barrier = Arc::clone(&barrier);
    let reducer_armed = Arc::clone(&armed);
    store
        .register(
            "slow",
            reducer_fn(move |n: u32, action: &Action| {
                if action.is("slow") && reducer_armed.swap(false, Ordering::SeqCst) {
                    reducer_barrier.wait();
                    thread::sleep(Duration::from_millis(50));
                }
                n
            }),
        )
        .unwrap();
    store.dispatch(Action::new("INIT"));
    armed.store(true, Ordering::SeqCst);

    let registering = {
        let store = store.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            store.register("late", history()).unwrap();
        })
    };

    store.dispatch(Action::new("slow"));
    registering.join().unwrap();
    assert!(!store.state().contains("late"));

    store.dispatch(Action::new("after"));
    assert_eq!(
        store.select::<Vec<String>>("late"),
        Some(vec!["after".to_string()])
    );
}

#[test]
fn concurrent_dispatches_are_serialised() {
    let store = Store::builder()
        .slice(
            "count",
            reducer_fn(|n: u64, action: &Action| if action.is("inc") { n + 1 } else { n }),
        )
        .build()
        .unwrap();
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notified);
    store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..250 {
                    store.dispatch(Action::new("inc"));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(store.select::<u64>("count"), Some(1000));
    assert_eq!(notified.load(Ordering::SeqCst), 1000);
}

fn store_with_reentrant_slice<F>(on_action: F) -> Store
where
    F: Fn(&Store, &Action) + Send + Sync + 'static,
{
    let handle: Arc<OnceLock<Store>> = Arc::new(OnceLock::new());
    let reducer_handle = Arc::clone(&handle);
    let store = Store::builder()
        .slice("log", history())
        .slice(
            "reentrant",
            reducer_fn(move |n: u32, action: &Action| {
                if let Some(store) = reducer_handle.get() {
                    on_action(store, action);
                }
                n
            }),
        )
        .build()
        .unwrap();
    handle.set(store.clone()).unwrap();
    store
}

#[test]
fn reducer_registration_applies_on_next_dispatch() {
    let store = store_with_reentrant_slice(|store, action| {
        if action.is("spawn") {
            store.register("late", history()).unwrap();
        }
    });

    store.dispatch(Action::new("spawn"));
    assert!(!store.state().contains("late"));
    assert!(store.reducer_keys().iter().any(|key| key.as_str() == "late"));

    store.dispatch(Action::new("next"));
    assert_eq!(
        store.select::<Vec<String>>("late"),
        Some(vec!["next".to_string()])
    );
}

#[test]
fn reducer_registration_validates_key_at_once() {
    let rejected = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&rejected);
    let store = store_with_reentrant_slice(move |store, action| {
        if action.is("spawn") && store.register(" ", history()).is_err() {
            flag.store(true, Ordering::SeqCst);
        }
    });

    store.dispatch(Action::new("spawn"));
    assert!(rejected.load(Ordering::SeqCst));
    assert_eq!(keys(&store.state()), vec!["log", "reentrant"]);
}

#[test]
fn reducer_dispatch_runs_after_current_action() {
    let store = store_with_reentrant_slice(|store, action| {
        if action.is("spawn") {
            store.register("late", history()).unwrap();
            store.dispatch(Action::new("spawned"));
        }
    });

    store.dispatch(Action::new("spawn"));
    assert_eq!(
        store.select::<Vec<String>>("log"),
        Some(vec![
            "@@slicestore/INIT".to_string(),
            "spawn".to_string(),
            "spawned".to_string(),
        ])
    );
    assert_eq!(
        store.select::<Vec<String>>("late"),
        Some(vec!["spawned".to_string()])
    );
}

#[test]
fn reducer_removal_applies_on_next_dispatch() {
    let store = store_with_reentrant_slice(|store, action| {
        if action.is("drop-log") {
            assert!(!store.remove("log"));
        }
    });

    store.dispatch(Action::new("drop-log"));
    assert!(store.state().contains("log"));
    assert!(store.owner_of("log").is_none());

    store.dispatch(Action::new("next"));
    assert_eq!(keys(&store.state()), vec!["reentrant"]);
}
