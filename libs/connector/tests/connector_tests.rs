use std::sync::Arc;

use serde_json::json;
use webdesk_connector::{
    parse_query_url, Conditions, ConsoleQuery, Connector, NamedQuery, ProcessRecord,
};
use webdesk_core::ConnectionInfo;
use webdesk_fabric::{
    paths,
    request::{LOGON_PASSWORD_FIELD, LOGON_USER_FIELD},
    testing::ScriptedTransport,
    Payload, Verb,
};

const BASE: &str = "https://host/wa";

fn connector(transport: &Arc<ScriptedTransport>) -> Connector {
    Connector::new(ConnectionInfo::new(BASE), transport.clone())
}

fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

#[tokio::test]
async fn run_query_corrects_single_page_count() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.reply_json(json!({
        "objects": [{"Title": "a"}, {"Title": "b"}],
        "object_count": 0,
        "page_count": 1,
    }));

    let query = NamedQuery::new("IncidentManagement.Incident", "Open Incidents")
        .page_size(50)
        .sort_by("Title");
    let success = connector(&transport)
        .query()
        .run_query(&query)
        .await
        .into_result()
        .unwrap();

    assert_eq!(success.data["object_count"], 2);

    let call = &transport.calls()[0];
    assert_eq!(call.url, url(paths::QUERY_LIST));
    assert_eq!(call.verb, Verb::Get);
    assert_eq!(call.field("query").as_deref(), Some("Open Incidents"));
    assert_eq!(call.field("page_size").as_deref(), Some("50"));
    assert_eq!(call.field("sort_by").as_deref(), Some("Title"));
}

#[tokio::test]
async fn console_query_sends_attributes_and_conditions() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.reply_json(json!({"objects": [], "object_count": 0, "page_count": 0}));

    let query = ConsoleQuery::new("IncidentManagement.Incident", ["Id", "Title"])
        .conditions(Conditions::new().equals("Status.Title", "Open"));
    let success = connector(&transport)
        .query()
        .run_console_query(&query)
        .await
        .into_result()
        .unwrap();
    assert_eq!(success.data["object_count"], 0);

    let call = &transport.calls()[0];
    assert_eq!(call.field("attributes").as_deref(), Some("Id,Title"));
    assert_eq!(call.field("cns").as_deref(), Some("Status.Title-e-0"));
    assert_eq!(call.field("c0").as_deref(), Some("Open"));
    assert_eq!(call.field("query"), None);
}

#[tokio::test]
async fn parsed_url_runs_as_query() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.reply_json(json!({"objects": []}));

    let parsed = parse_query_url(
        "https://host/wa/query/list.rails?class_name=Incident&attributes=Title,Status&cns=Status-e-0&c0=Open&page_size=25",
    )
    .unwrap();
    assert_eq!(parsed.web_access_url.as_deref(), Some(BASE));

    connector(&transport)
        .query()
        .run_parsed(&parsed.query_data)
        .await
        .into_result()
        .unwrap();

    let call = &transport.calls()[0];
    assert_eq!(call.field("class_name").as_deref(), Some("Incident"));
    assert_eq!(call.field("attributes").as_deref(), Some("Title,Status"));
    assert_eq!(call.field("c0").as_deref(), Some("Open"));
    assert_eq!(call.field("page_size").as_deref(), Some("25"));
}

#[tokio::test]
async fn record_operations_use_their_endpoints() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .reply_json(json!({"key": "INC-1"}))
        .reply_json(json!({"key": "INC-1", "Title": "Printer"}))
        .reply_json(json!({"success": true}))
        .reply_json(json!({"success": true}));
    let connector = connector(&transport);
    let records = connector.record();

    let created = records
        .create_record(
            "IncidentManagement.Incident",
            Payload::new().with("Title", "Printer").with("is_new", false),
        )
        .await
        .into_result()
        .unwrap();
    assert_eq!(created.data["key"], "INC-1");

    records
        .open_record("IncidentManagement.Incident", "INC-1")
        .await
        .into_result()
        .unwrap();
    records
        .update_record(
            "IncidentManagement.Incident",
            "INC-1",
            Payload::new().with("Title", "Printer fixed"),
        )
        .await
        .into_result()
        .unwrap();
    records
        .delete_record("IncidentManagement.Incident", "INC-1")
        .await
        .into_result()
        .unwrap();

    let calls = transport.calls();
    assert_eq!(calls[0].url, url(paths::OBJECT_SAVE));
    assert_eq!(calls[0].verb, Verb::Post);
    // Control fields win over caller values
    assert_eq!(calls[0].field("is_new").as_deref(), Some("true"));
    assert_eq!(calls[0].field("Title").as_deref(), Some("Printer"));

    assert_eq!(calls[1].url, url(paths::OBJECT_OPEN));
    assert_eq!(calls[1].verb, Verb::Get);
    assert_eq!(calls[1].field("key").as_deref(), Some("INC-1"));

    assert_eq!(calls[2].url, url(paths::OBJECT_SAVE));
    assert_eq!(calls[2].field("is_new").as_deref(), Some("false"));
    assert_eq!(calls[2].field("key").as_deref(), Some("INC-1"));

    assert_eq!(calls[3].url, url(paths::OBJECT_DELETE));
    assert_eq!(calls[3].verb, Verb::Post);
}

#[tokio::test]
async fn process_record_names_its_parent() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.reply_json(json!({"key": "NOTE-9"}));

    connector(&transport)
        .record()
        .create_process_record(ProcessRecord {
            class_name: "IncidentManagement.Note".into(),
            process_class_name: "IncidentManagement.Incident".into(),
            process_key: "INC-1".into(),
            collection_name: "Notes".into(),
            values: Payload::new().with("Text", "Called the user"),
        })
        .await
        .into_result()
        .unwrap();

    let call = &transport.calls()[0];
    assert_eq!(call.field("is_new").as_deref(), Some("true"));
    assert_eq!(call.field("process_key").as_deref(), Some("INC-1"));
    assert_eq!(call.field("collection_name").as_deref(), Some("Notes"));
    assert_eq!(call.field("Text").as_deref(), Some("Called the user"));
}

#[tokio::test]
async fn actions_invoke_function_endpoint() {
    let transport = Arc::new(ScriptedTransport::new());
    for _ in 0..4 {
        transport.reply_json(json!({"success": true}));
    }
    let connector = connector(&transport);
    let actions = connector.action();
    let class = "IncidentManagement.Incident";

    actions
        .collection_action(class, "INC-1", "Assignments", "Reassign", Payload::new())
        .await
        .into_result()
        .unwrap();
    actions
        .update_action(class, "INC-1", "Resolve", Payload::new().with("Resolution", "Rebooted"))
        .await
        .into_result()
        .unwrap();
    actions
        .windowless_action(class, "INC-1", "Escalate")
        .await
        .into_result()
        .unwrap();
    actions
        .attach_detach_action(class, "INC-1", "ConfigurationItems", "CI-7", false)
        .await
        .into_result()
        .unwrap();

    let calls = transport.calls();
    assert!(calls.iter().all(|c| c.url == url(paths::OBJECT_INVOKE_FUNCTION)));
    assert!(calls.iter().all(|c| c.verb == Verb::Post));

    let types: Vec<_> = calls
        .iter()
        .map(|c| c.field("function_type").unwrap())
        .collect();
    assert_eq!(types, vec!["collection", "update", "windowless", "attach_detach"]);

    assert_eq!(calls[0].field("collection_name").as_deref(), Some("Assignments"));
    assert_eq!(calls[1].field("Resolution").as_deref(), Some("Rebooted"));
    assert_eq!(calls[2].field("function_name").as_deref(), Some("Escalate"));
    assert_eq!(calls[3].field("function_name").as_deref(), Some("Detach"));
    assert_eq!(calls[3].field("related_key").as_deref(), Some("CI-7"));
    assert_eq!(calls[3].field("attach").as_deref(), Some("false"));
}

#[tokio::test]
async fn remote_business_error_reaches_caller() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.reply_error(webdesk_fabric::Error::Remote("Title is mandatory".into()));

    let failure = connector(&transport)
        .record()
        .create_record("IncidentManagement.Incident", Payload::new())
        .await
        .into_result()
        .unwrap_err();

    assert_eq!(failure.error_text(), "Title is mandatory");
    assert_eq!(failure.status_code, 200);
}

#[tokio::test]
async fn user_log_on_uses_connection_credentials() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.reply_text("welcome").reply_text("bye");

    let connection = ConnectionInfo::builder(BASE)
        .credentials("analyst", "secret")
        .build()
        .unwrap();
    let connector = Connector::new(connection, transport.clone());

    let logged_on = connector.user().log_on().await;
    assert!(logged_on.logged_on());
    let logged_off = connector.user().log_off().await;
    assert!(logged_off.logged_off());

    let calls = transport.calls();
    assert_eq!(calls[0].url, url(paths::LOGON));
    assert_eq!(calls[0].field(LOGON_USER_FIELD).as_deref(), Some("analyst"));
    assert_eq!(calls[0].field(LOGON_PASSWORD_FIELD).as_deref(), Some("secret"));
    assert_eq!(calls[1].url, url(paths::LOGOFF));
}

#[tokio::test]
async fn every_operation_gets_its_own_logon_latch() {
    let transport = Arc::new(ScriptedTransport::new());
    transport
        .reply_status(403, "Forbidden 403")
        .reply_text("welcome")
        .reply_json(json!({"objects": []}))
        .reply_status(403, "Forbidden 403")
        .reply_text("welcome")
        .reply_json(json!({"key": "INC-2"}));

    let connection = ConnectionInfo::builder(BASE)
        .login_on_demand("analyst", "secret")
        .build()
        .unwrap();
    let connector = Connector::new(connection, transport.clone());

    let first = connector
        .query()
        .run_console_query(&ConsoleQuery::new("Incident", ["Title"]))
        .await;
    let second = connector.record().open_record("Incident", "INC-2").await;

    assert!(first.logged_on());
    assert!(second.logged_on());
    assert_eq!(second.into_result().unwrap().data["key"], "INC-2");
    assert_eq!(transport.call_count(), 6);
}
