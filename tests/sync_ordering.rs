//! Out-of-order completion of device calls
//!
//! Held fetches and saves on the in-memory controller let these tests finish
//! requests in a different order than they were issued and check that the
//! store only ever moves forward.

use std::sync::Arc;

use growit_console::{
    validate, CommitOutcome, ConfigStore, ConfigSyncClient, Configuration, DeviceSession,
    DeviceTransport, DraftConfig, ErrorResponse, FixedClock, InMemoryDeviceTransport,
    OperationKind, SessionError, SyncError, TransportError, ValidatedDraft,
};

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::from_rfc3339("2024-06-01T08:00:00Z").unwrap())
}

fn validated(config: Configuration) -> ValidatedDraft {
    validate(DraftConfig::new(config, 0)).into_result().unwrap()
}

async fn wait_for(condition: impl Fn() -> bool) {
    while !condition() {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_fetch_resolving_after_save_does_not_overwrite() {
    let transport = Arc::new(InMemoryDeviceTransport::default());
    let session = Arc::new(
        DeviceSession::connect(Arc::clone(&transport) as Arc<dyn DeviceTransport>, clock()).await,
    );

    // Fetch is issued first and sees the old device configuration
    transport.hold_fetches();
    let fetch = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.refresh().await }
    });
    wait_for(|| transport.pending_fetches() == 1).await;

    // Save is issued second and completes first
    let mut draft = session.begin_edit();
    draft.config_mut().system.name = "Saved While Fetching".to_string();
    let saved = session.apply(draft).await.unwrap();
    assert!(saved.is_applied());

    transport.release_fetches(1);
    let outcome = fetch.await.unwrap().unwrap();

    assert!(matches!(outcome, CommitOutcome::Stale { .. }));
    assert_eq!(session.config().system.name, "Saved While Fetching");
    assert_eq!(transport.device_config().system.name, "Saved While Fetching");
}

#[tokio::test]
async fn test_fetch_issued_after_save_is_applied() {
    let transport = Arc::new(InMemoryDeviceTransport::default());
    let session =
        DeviceSession::connect(Arc::clone(&transport) as Arc<dyn DeviceTransport>, clock()).await;

    let mut draft = session.begin_edit();
    draft.config_mut().system.name = "Mine".to_string();
    session.apply(draft).await.unwrap();

    // Another client changes the device afterwards
    let mut theirs = transport.device_config();
    theirs.system.name = "Theirs".to_string();
    transport.set_device_config(theirs);

    let outcome = session.refresh().await.unwrap();

    assert!(outcome.is_applied());
    assert_eq!(session.config().system.name, "Theirs");
}

#[tokio::test]
async fn test_older_fetch_is_superseded() {
    let transport = Arc::new(InMemoryDeviceTransport::default());
    let client = Arc::new(ConfigSyncClient::new(
        Arc::clone(&transport) as Arc<dyn DeviceTransport>
    ));
    let store = ConfigStore::default();

    transport.hold_fetches();
    let first = tokio::spawn({
        let client = Arc::clone(&client);
        async move { client.fetch().await }
    });
    wait_for(|| transport.pending_fetches() == 1).await;
    let second = tokio::spawn({
        let client = Arc::clone(&client);
        async move { client.fetch().await }
    });
    wait_for(|| transport.pending_fetches() == 2).await;

    // Held requests are released in the order they arrived
    transport.release_fetches(1);
    let first = first.await.unwrap();
    assert_eq!(
        first,
        Err(SyncError::Superseded {
            kind: OperationKind::Fetch,
            sequence: 1,
            latest: 2,
        })
    );
    assert_eq!(store.version(), 0);

    transport.release_fetches(1);
    let second = second.await.unwrap().unwrap();
    assert_eq!(second.sequence, 2);
    assert!(store.commit(second).is_applied());
}

#[tokio::test]
async fn test_older_reset_is_superseded() {
    let mut custom = Configuration::factory();
    custom.system.name = "Custom".to_string();
    let transport = Arc::new(InMemoryDeviceTransport::new(custom));
    let client = Arc::new(ConfigSyncClient::new(
        Arc::clone(&transport) as Arc<dyn DeviceTransport>
    ));
    let store = ConfigStore::default();

    transport.hold_resets();
    let first = tokio::spawn({
        let client = Arc::clone(&client);
        async move { client.reset_to_defaults().await }
    });
    wait_for(|| transport.pending_resets() == 1).await;
    let second = tokio::spawn({
        let client = Arc::clone(&client);
        async move { client.reset_to_defaults().await }
    });
    wait_for(|| transport.pending_resets() == 2).await;

    transport.release_resets(1);
    let first = first.await.unwrap();
    assert_eq!(
        first,
        Err(SyncError::Superseded {
            kind: OperationKind::Reset,
            sequence: 1,
            latest: 2,
        })
    );
    assert_eq!(store.version(), 0);

    transport.release_resets(1);
    let second = second.await.unwrap().unwrap();
    assert_eq!(second.sequence, 2);
    assert!(store.commit(second).is_applied());
    assert_eq!(*store.get(), Configuration::factory());
    assert_eq!(transport.device_config(), Configuration::factory());
}

#[tokio::test]
async fn test_second_save_while_first_in_flight_is_busy() {
    let transport = Arc::new(InMemoryDeviceTransport::default());
    let client = Arc::new(ConfigSyncClient::new(
        Arc::clone(&transport) as Arc<dyn DeviceTransport>
    ));

    transport.hold_saves();
    let first = tokio::spawn({
        let client = Arc::clone(&client);
        async move { client.save(validated(Configuration::factory())).await }
    });
    wait_for(|| transport.pending_saves() == 1).await;

    let second = client.save(validated(Configuration::factory())).await;
    assert_eq!(second, Err(SyncError::Busy));

    transport.release_saves(1);
    assert!(first.await.unwrap().is_ok());

    // The slot is free again
    transport.release_saves(1);
    assert!(client.save(validated(Configuration::factory())).await.is_ok());
}

#[tokio::test]
async fn test_rejected_save_leaves_store_unchanged() {
    let transport = Arc::new(InMemoryDeviceTransport::default());
    let session =
        DeviceSession::connect(Arc::clone(&transport) as Arc<dyn DeviceTransport>, clock()).await;
    let version = session.store().version();

    let rejection = ErrorResponse::new("INVALID_VALUE", "Pump pin 5 is reserved", "mem-9");
    transport.fail_next(TransportError::Rejected(rejection.clone()));

    let mut draft = session.begin_edit();
    draft.config_mut().irrigation.pump.pin = 5;
    let result = session.apply(draft).await;

    assert_eq!(
        result,
        Err(SessionError::Sync(SyncError::RemoteRejected(rejection)))
    );
    assert_eq!(session.store().version(), version);
    assert_eq!(*session.config(), Configuration::factory());
    // A rejection still proves the device answered
    assert!(session.is_online());
}

#[tokio::test]
async fn test_reset_after_save_wins() {
    let transport = Arc::new(InMemoryDeviceTransport::default());
    let session =
        DeviceSession::connect(Arc::clone(&transport) as Arc<dyn DeviceTransport>, clock()).await;

    let mut draft = session.begin_edit();
    draft.config_mut().system.name = "Before Reset".to_string();
    session.apply(draft).await.unwrap();
    session.reset().await.unwrap();

    assert_eq!(*session.config(), Configuration::factory());
    assert_eq!(transport.device_config(), Configuration::factory());
}
