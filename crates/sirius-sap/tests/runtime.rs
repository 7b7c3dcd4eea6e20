mod common;

use std::time::Duration;

use common::{Log, Record, RecordingLower, RecordingSink};
use sirius_logging::LoggingConfig;
use sirius_sap::{
    ChannelRequest, SapConfig, SapError, SapEvent, SapHandle, SapRuntime, SapState,
    SessionConfig, SessionId,
};

fn spawn_runtime(log: &Log) -> (SapHandle, tokio::task::JoinHandle<()>) {
    let config = SapConfig::default();
    let domain = config.regulatory_domain().expect("domain");
    let (runtime, handle) = SapRuntime::new(
        config,
        domain,
        RecordingSink {
            log: log.clone(),
            stored: Vec::new(),
        },
        RecordingLower {
            log: log.clone(),
            fail: Vec::new(),
        },
    )
    .expect("runtime");
    (handle, runtime.with_seed(1).spawn())
}

async fn start_on_52(handle: &SapHandle) -> SessionId {
    let id = handle
        .open_session(SessionConfig {
            channel: ChannelRequest::Fixed(52),
            ..SessionConfig::default()
        })
        .await
        .expect("open");
    handle
        .dispatch(id, SapEvent::StartRequest)
        .await
        .expect("start");
    handle
        .dispatch(
            id,
            SapEvent::ScanComplete {
                success: true,
                results: Vec::new(),
            },
        )
        .await
        .expect("scan");
    handle
        .dispatch(id, SapEvent::StartSuccess)
        .await
        .expect("success");
    id
}

async fn state_of(handle: &SapHandle, id: SessionId) -> Option<SapState> {
    handle
        .snapshot()
        .await
        .expect("snapshot")
        .into_iter()
        .find(|s| s.id == id)
        .map(|s| s.state)
}

#[tokio::test(start_paused = true)]
async fn cac_timer_fires_through_the_queue() {
    let root = tempfile::tempdir().expect("tempdir");
    let _guards =
        sirius_logging::init("sirius-sap-test", root.path(), &LoggingConfig::default())
            .expect("logging");
    let _watcher = sirius_logging::spawn_watcher(root.path()).expect("watcher");
    sirius_logging::run_retention(root.path(), &LoggingConfig::default()).expect("retention");

    let log = Log::default();
    let (handle, task) = spawn_runtime(&log);
    let id = start_on_52(&handle).await;
    assert_eq!(state_of(&handle, id).await, Some(SapState::DfsCacWait));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(state_of(&handle, id).await, Some(SapState::DfsCacWait));

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(state_of(&handle, id).await, Some(SapState::Started));
    assert!(log.records().contains(&Record::StartBeacon(id)));

    handle.shutdown().expect("shutdown");
    task.await.expect("join");
}

#[tokio::test(start_paused = true)]
async fn stopped_cac_never_fires() {
    let log = Log::default();
    let (handle, task) = spawn_runtime(&log);
    let id = start_on_52(&handle).await;

    handle
        .dispatch(id, SapEvent::StopRequest)
        .await
        .expect("stop");
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(state_of(&handle, id).await, Some(SapState::Disconnecting));
    assert!(!log.records().contains(&Record::StartBeacon(id)));

    handle.shutdown().expect("shutdown");
    task.await.expect("join");
}

#[tokio::test(start_paused = true)]
async fn handle_reports_errors_and_shutdown() {
    let log = Log::default();
    let (handle, task) = spawn_runtime(&log);

    assert_eq!(
        handle.dispatch(9, SapEvent::StartRequest).await,
        Err(SapError::InvalidSession(9))
    );
    let id = handle
        .open_session(SessionConfig::default())
        .await
        .expect("open");
    handle.close_session(id).await.expect("close");
    assert!(handle.snapshot().await.expect("snapshot").is_empty());

    handle.shutdown().expect("shutdown");
    task.await.expect("join");
    assert_eq!(
        handle.open_session(SessionConfig::default()).await,
        Err(SapError::RuntimeStopped)
    );
}
