// tests/pipeline_e2e.rs
mod common;

use std::path::Path;

use jobnotify::pipeline::RunState;
use jobnotify::{
    Channel, DedupStore, DispatchError, IngestionError, JobNotifyError, NotificationDispatcher,
    Pipeline, RunOutcome,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{app_config, sample_listings, search_page, RecordingNotifier};

const SEARCH_PATH: &str = "/ads/apisearch";

async fn source_with(body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

fn pipeline(
    server: &MockServer,
    db_dir: &Path,
    chat: &RecordingNotifier,
    email: &RecordingNotifier,
) -> Pipeline {
    let cfg = app_config(&format!("{}{}", server.uri(), SEARCH_PATH), "http://unused.test");
    let dispatcher =
        NotificationDispatcher::new(vec![Box::new(chat.clone()), Box::new(email.clone())]);
    Pipeline::new(cfg, dispatcher, db_dir)
}

#[tokio::test]
async fn second_run_with_same_results_is_idle() {
    let listings = sample_listings();
    let server = source_with(search_page(&listings, 2, 2)).await;
    let db = tempfile::tempdir().unwrap();
    let chat = RecordingNotifier::ok(Channel::Chat);
    let email = RecordingNotifier::ok(Channel::Email);
    let p = pipeline(&server, db.path(), &chat, &email);

    let first = p.run().await.unwrap();
    assert_eq!(
        first,
        RunOutcome::Notified {
            listings: 2,
            channels: vec![Channel::Chat, Channel::Email],
        }
    );

    let store_path = db.path().join("scientist_dublin.json");
    assert_eq!(p.store_path(), store_path);
    assert_eq!(DedupStore::load(&store_path).unwrap().len(), 2);

    assert_eq!(p.last_state(), RunState::Persisted);

    let second = p.run().await.unwrap();
    assert_eq!(second, RunOutcome::Idle);
    assert_eq!(p.last_state(), RunState::Idle);
    assert_eq!(chat.call_count(), 1);
    assert_eq!(email.call_count(), 1);
}

#[tokio::test]
async fn only_unseen_listings_are_notified() {
    let listings = sample_listings();
    let server = source_with(search_page(&listings, 2, 2)).await;
    let db = tempfile::tempdir().unwrap();
    DedupStore::new()
        .merge(&listings[..1])
        .persist(&db.path().join("scientist_dublin.json"))
        .unwrap();

    let chat = RecordingNotifier::ok(Channel::Chat);
    let email = RecordingNotifier::ok(Channel::Email);
    let outcome = pipeline(&server, db.path(), &chat, &email).run().await.unwrap();

    assert!(matches!(outcome, RunOutcome::Notified { listings: 1, .. }));
    assert_eq!(*email.calls.lock(), vec![1]);
}

#[tokio::test]
async fn dispatch_failure_leaves_store_untouched_and_resends_later() {
    let listings = sample_listings();
    let server = source_with(search_page(&listings, 2, 2)).await;
    let db = tempfile::tempdir().unwrap();
    let store_path = db.path().join("scientist_dublin.json");

    let chat = RecordingNotifier::ok(Channel::Chat);
    let bad_email = RecordingNotifier::failing(Channel::Email, "535");
    let failing = pipeline(&server, db.path(), &chat, &bad_email);
    let err = failing.run().await.unwrap_err();
    assert_eq!(failing.last_state(), RunState::Aborted);
    assert!(matches!(
        err,
        JobNotifyError::Dispatch(DispatchError::EmailAuthError(_))
    ));
    assert!(!store_path.exists());

    // chat already sent once; a later good run sends the same listings again
    let email = RecordingNotifier::ok(Channel::Email);
    let outcome = pipeline(&server, db.path(), &chat, &email).run().await.unwrap();
    assert!(matches!(outcome, RunOutcome::Notified { listings: 2, .. }));
    assert_eq!(*chat.calls.lock(), vec![2, 2]);
    assert!(store_path.exists());
}

#[tokio::test]
async fn source_auth_error_aborts_before_dispatch() {
    let server = source_with(serde_json::json!({"error": "Invalid publisher number provided."})).await;
    let db = tempfile::tempdir().unwrap();
    let chat = RecordingNotifier::ok(Channel::Chat);
    let email = RecordingNotifier::ok(Channel::Email);

    let p = pipeline(&server, db.path(), &chat, &email);
    assert_eq!(p.last_state(), RunState::Init);
    let err = p.run().await.unwrap_err();
    assert!(matches!(
        err,
        JobNotifyError::Ingestion(IngestionError::SourceAuthError(_))
    ));
    assert_eq!(p.last_state(), RunState::Aborted);
    assert_eq!(chat.call_count() + email.call_count(), 0);
    assert!(!db.path().join("scientist_dublin.json").exists());
}

#[tokio::test]
async fn missing_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("jobnotify.config");
    match jobnotify::jobnotify(&cfg, dir.path()).await {
        Err(JobNotifyError::ConfigFileNotFound(p)) => assert_eq!(p, cfg),
        other => panic!("unexpected: {other:?}"),
    }
}
