use std::sync::Arc;

use serde_json::json;
use webdesk_core::ConnectionInfo;
use webdesk_fabric::{
    error::Error,
    paths,
    request::{LOGON_PASSWORD_FIELD, LOGON_USER_FIELD},
    testing::ScriptedTransport,
    Orchestrator, Payload, RequestDescriptor, RequestOutcome, Verb,
};

const BASE: &str = "https://host/wa";

fn plain() -> Arc<ConnectionInfo> {
    Arc::new(ConnectionInfo::new(BASE))
}

fn on_demand() -> Arc<ConnectionInfo> {
    Arc::new(
        ConnectionInfo::builder(BASE)
            .login_on_demand("analyst", "secret")
            .build()
            .unwrap(),
    )
}

fn on_demand_with_log_off() -> Arc<ConnectionInfo> {
    Arc::new(
        ConnectionInfo::builder(BASE)
            .login_on_demand("analyst", "secret")
            .auto_log_off_on_demand(true)
            .build()
            .unwrap(),
    )
}

fn list_query() -> RequestDescriptor {
    RequestDescriptor::get(paths::QUERY_LIST).payload(Payload::new().with("class_name", "Incident"))
}

fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

#[tokio::test]
async fn success_first_try_reports_no_logon() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.reply_json(json!({"objects": [{"Title": "Printer"}]}));

    let outcome = Orchestrator::new(plain(), transport.clone(), list_query()).go().await;

    let success = outcome.into_result().unwrap();
    assert_eq!(success.data["objects"][0]["Title"], "Printer");
    assert_eq!(success.status_code, 200);
    assert!(!success.logged_on);
    assert!(!success.logged_off);

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].url, url(paths::QUERY_LIST));
    assert_eq!(calls[0].verb, Verb::Get);
    assert_eq!(calls[0].field("class_name").as_deref(), Some("Incident"));
}

#[tokio::test]
async fn logon_on_demand_replays_original_call() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .reply_status(403, "Forbidden 403")
        .reply_text("<html>welcome</html>")
        .reply_json(json!({"source": "replayed"}));

    let outcome = Orchestrator::new(on_demand(), transport.clone(), list_query()).go().await;

    let success = outcome.into_result().unwrap();
    assert_eq!(success.data, json!({"source": "replayed"}));
    assert!(success.logged_on);
    assert!(!success.logged_off);

    let calls = transport.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].url, url(paths::QUERY_LIST));
    assert_eq!(calls[1].url, url(paths::LOGON));
    assert_eq!(calls[1].verb, Verb::Post);
    assert!(!calls[1].require_json);
    assert_eq!(calls[1].field(LOGON_USER_FIELD).as_deref(), Some("analyst"));
    assert_eq!(calls[1].field(LOGON_PASSWORD_FIELD).as_deref(), Some("secret"));
    assert_eq!(calls[2], calls[0]);
}

#[tokio::test]
async fn replay_happens_at_most_once() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .reply_status(403, "Forbidden 403")
        .reply_text("ok")
        .reply_status(403, "Forbidden 403")
        .reply_text("unused logon")
        .reply_json(json!({"unused": true}));

    let outcome = Orchestrator::new(on_demand(), transport.clone(), list_query()).go().await;

    let failure = outcome.into_result().unwrap_err();
    assert_eq!(failure.error, Error::NotLoggedIn);
    assert_eq!(failure.error_text(), "Not Logged In");
    assert_eq!(failure.status_code, 403);
    assert!(failure.logged_on);
    assert_eq!(transport.call_count(), 3);
    assert_eq!(transport.pending(), 2);
}

#[tokio::test]
async fn unauthorized_without_on_demand_logon_is_not_logged_in() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.reply_status(403, "Forbidden 403");

    let outcome = Orchestrator::new(plain(), transport.clone(), list_query()).go().await;

    let failure = outcome.into_result().unwrap_err();
    assert_eq!(failure.error, Error::NotLoggedIn);
    assert!(!failure.logged_on);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn failed_logon_surfaces_its_own_error() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .reply_status(403, "Forbidden 403")
        .reply_status(500, "Invalid user name or password");

    let outcome = Orchestrator::new(on_demand(), transport.clone(), list_query()).go().await;

    let failure = outcome.into_result().unwrap_err();
    assert_eq!(failure.error_text(), "Invalid user name or password");
    assert_eq!(failure.status_code, 500);
    assert!(!failure.logged_on);
    assert!(!failure.logged_off);
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn other_errors_are_reported_verbatim() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.reply_status(500, "Class not found");

    let outcome = Orchestrator::new(on_demand(), transport.clone(), list_query()).go().await;

    let failure = outcome.into_result().unwrap_err();
    assert_eq!(
        failure.error,
        Error::HttpStatus {
            status: 500,
            text: "Class not found".into()
        }
    );
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn auto_log_off_ignores_logoff_failure() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .reply_status(403, "Forbidden 403")
        .reply_text("ok")
        .reply_json(json!({"key": "INC-1"}))
        .reply_status(500, "Logoff exploded");

    let outcome = Orchestrator::new(on_demand_with_log_off(), transport.clone(), list_query())
        .go()
        .await;

    let success = outcome.into_result().unwrap();
    assert_eq!(success.data, json!({"key": "INC-1"}));
    assert!(success.logged_on);
    assert!(success.logged_off);

    let calls = transport.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[3].url, url(paths::LOGOFF));
    assert_eq!(calls[3].verb, Verb::Post);
    assert!(calls[3].payload.is_none());
}

#[tokio::test]
async fn auto_log_off_also_follows_a_failed_replay() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .reply_status(403, "Forbidden 403")
        .reply_text("ok")
        .reply_status(500, "Record is locked")
        .reply_text("bye");

    let outcome = Orchestrator::new(on_demand_with_log_off(), transport.clone(), list_query())
        .go()
        .await;

    let failure = outcome.into_result().unwrap_err();
    assert_eq!(failure.error_text(), "Record is locked");
    assert!(failure.logged_on);
    assert!(failure.logged_off);
    assert_eq!(transport.calls()[3].url, url(paths::LOGOFF));
}

#[tokio::test]
async fn auto_log_off_needs_an_implicit_logon() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.reply_json(json!({"objects": []}));

    let outcome = Orchestrator::new(on_demand_with_log_off(), transport.clone(), list_query())
        .go()
        .await;

    assert!(outcome.is_success());
    assert!(!outcome.logged_off());
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn response_processor_rewrites_body() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.reply_json(json!({"count": 0}));

    let descriptor = list_query().processor(|body, meta| {
        body["count"] = json!(7);
        body["seen_status"] = json!(meta.status);
    });
    let outcome = Orchestrator::new(plain(), transport, descriptor).go().await;

    let success = outcome.into_result().unwrap();
    assert_eq!(success.data, json!({"count": 7, "seen_status": 200}));
}

#[tokio::test]
async fn response_processor_runs_only_on_the_replayed_call() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .reply_status(403, "Forbidden 403")
        .reply_json(json!({"logon": true}))
        .reply_json(json!({"hits": 0}));

    let descriptor = list_query().processor(|body, _| {
        if let Some(hits) = body.get_mut("hits") {
            *hits = json!(1);
        }
    });
    let outcome = Orchestrator::new(on_demand(), transport, descriptor).go().await;

    assert_eq!(outcome.into_result().unwrap().data, json!({"hits": 1}));
}

#[tokio::test]
async fn explicit_log_on_stamps_flag_only_on_success() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.reply_text("welcome");
    let outcome = Orchestrator::log_on(plain(), transport.clone(), "analyst", "secret").await;
    assert!(outcome.is_success());
    assert!(outcome.logged_on());

    let transport = Arc::new(ScriptedTransport::new());
    transport.reply_status(403, "Forbidden 403");
    let outcome = Orchestrator::log_on(on_demand(), transport.clone(), "analyst", "wrong").await;
    let failure = outcome.into_result().unwrap_err();
    assert!(!failure.logged_on);
    assert_eq!(failure.error_text(), "Forbidden 403");
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn explicit_log_off_stamps_flag() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.reply_text("bye");

    let outcome = Orchestrator::log_off(plain(), transport.clone()).await;

    assert!(matches!(&outcome, RequestOutcome::Success(s) if s.logged_off));
    assert_eq!(transport.calls()[0].url, url(paths::LOGOFF));
}

#[tokio::test]
async fn connection_failure_is_reported_with_status_zero() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.reply_error(Error::ConnectionFailed);

    let outcome = Orchestrator::new(on_demand(), transport, list_query()).go().await;

    let failure = outcome.into_result().unwrap_err();
    assert_eq!(failure.status_code, 0);
    assert_eq!(failure.error_text(), "Connection Failed");
}
