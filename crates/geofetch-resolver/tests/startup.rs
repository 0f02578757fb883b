mod common;

use std::sync::Arc;

use common::{count, resolver, DeviceScript, IpScript, ServiceScript};
use geofetch_core::{LocationFetchType, LocationUiState, StateIntent};
use geofetch_resolver::{
    AppState, FetchStatus, MemoryStore, ResolutionOutcome, StartupLocation, StartupOrchestrator,
};

const DEVICE_FIX: DeviceScript = DeviceScript::Fix {
    after_ms: 100,
    latitude: 40.0,
    longitude: -105.0,
};

#[tokio::test(start_paused = true)]
async fn forced_address_bypasses_geolocation() {
    let store = Arc::new(MemoryStore::new());
    let (resolver, probe) = resolver(
        DEVICE_FIX,
        IpScript::Never,
        ServiceScript::Ok { after_ms: 10 },
        &store,
    );
    let startup = StartupOrchestrator::new(resolver);

    let report = startup.run(Some("?forceAddress=80302")).await;

    assert_eq!(
        report.location,
        StartupLocation::CachedAddress {
            address: "80302".to_owned(),
            fetch: FetchStatus::Completed,
        }
    );
    assert_eq!(report.call_count, Some(42));
    assert_eq!(probe.device_calls(), 0);
    assert_eq!(probe.ip_calls(), 0);
    assert_eq!(probe.fetches(), vec!["80302".to_owned()]);

    let journal = store.journal();
    assert_eq!(
        journal[..4],
        [
            StateIntent::SetUiState(LocationUiState::FetchingLocation),
            StateIntent::ClearContactIndexes,
            StateIntent::SetLocation("80302".to_owned()),
            StateIntent::SetCachedCity(String::new()),
        ]
    );
    let state = store.state();
    assert_eq!(state.location_fetch_type, LocationFetchType::CachedAddress);
    assert_eq!(state.cached_city, "Boulder");
    assert_eq!(state.call_count, Some(42));
}

#[tokio::test(start_paused = true)]
async fn persisted_address_is_fetched_without_geolocation() {
    let store = Arc::new(MemoryStore::with_state(AppState {
        address: "10001".to_owned(),
        ..AppState::default()
    }));
    let (resolver, probe) = resolver(
        DEVICE_FIX,
        IpScript::Never,
        ServiceScript::Ok { after_ms: 0 },
        &store,
    );
    let startup = StartupOrchestrator::new(resolver);

    let report = startup.run(None).await;

    assert_eq!(
        report.location,
        StartupLocation::CachedAddress {
            address: "10001".to_owned(),
            fetch: FetchStatus::Completed,
        }
    );
    assert_eq!(probe.device_calls(), 0);
    assert_eq!(probe.fetches(), vec!["10001".to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn query_without_override_keeps_persisted_address() {
    let store = Arc::new(MemoryStore::with_state(AppState {
        address: "10001".to_owned(),
        ..AppState::default()
    }));
    let (resolver, probe) = resolver(
        DEVICE_FIX,
        IpScript::Never,
        ServiceScript::Ok { after_ms: 0 },
        &store,
    );
    let startup = StartupOrchestrator::new(resolver);

    startup.run(Some("utm_source=newsletter")).await;

    assert_eq!(probe.fetches(), vec!["10001".to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn unknown_address_runs_the_resolver() {
    let store = Arc::new(MemoryStore::new());
    let (resolver, probe) = resolver(
        DEVICE_FIX,
        IpScript::Never,
        ServiceScript::Ok { after_ms: 0 },
        &store,
    );
    let startup = StartupOrchestrator::new(resolver);

    let report = startup.run(None).await;

    assert_eq!(
        report.location,
        StartupLocation::Resolved(ResolutionOutcome::Resolved {
            fetch_type: LocationFetchType::BrowserGeolocation,
            location: "40 -105".to_owned(),
            fetch: FetchStatus::Completed,
        })
    );
    assert_eq!(report.call_count, Some(42));
    assert_eq!(probe.device_calls(), 1);
    assert_eq!(probe.fetches(), vec!["40 -105".to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn service_outage_fails_both_branches_quietly() {
    let store = Arc::new(MemoryStore::new());
    let (resolver, _probe) = resolver(
        DEVICE_FIX,
        IpScript::Never,
        ServiceScript::Fail,
        &store,
    );
    let startup = StartupOrchestrator::new(resolver);

    let report = startup.run(Some("forceAddress=80302")).await;

    assert_eq!(
        report.location,
        StartupLocation::CachedAddress {
            address: "80302".to_owned(),
            fetch: FetchStatus::Failed,
        }
    );
    assert_eq!(report.call_count, None);
    assert_eq!(store.state().call_count, None);
}

#[tokio::test(start_paused = true)]
async fn startup_clears_contact_indexes() {
    let mut seeded = AppState {
        address: "80302".to_owned(),
        ..AppState::default()
    };
    seeded.contact_indexes.insert("rec1".to_owned(), 3);
    let store = Arc::new(MemoryStore::with_state(seeded));
    let (resolver, _probe) = resolver(
        DEVICE_FIX,
        IpScript::Never,
        ServiceScript::Ok { after_ms: 0 },
        &store,
    );

    StartupOrchestrator::new(resolver).run(None).await;

    assert!(store.state().contact_indexes.is_empty());
    assert_eq!(
        count(&store.journal(), &StateIntent::ClearContactIndexes),
        1
    );
}
