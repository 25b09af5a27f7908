//! MonkClient against a fake monk executable.

use crate::fake_monk::FakeMonk;
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vault_tec::monk::{
    CommandFailure, CommandObserver, MonkClient, MonkCommand, Payload, ResponseObserver,
};
use vault_tec::session::session_still_valid;

#[derive(Default)]
struct Recorder {
    commands: Mutex<Vec<String>>,
    responses: Mutex<Vec<String>>,
}

impl CommandObserver for Recorder {
    fn command_sent(&self, command_line: &str, _trace_data: Option<&serde_json::Value>) {
        self.commands.lock().unwrap().push(command_line.to_string());
    }
}

impl ResponseObserver for Recorder {
    fn response_received(&self, payload: &Payload) {
        self.responses.lock().unwrap().push(payload.compact());
    }
}

#[tokio::test]
async fn test_server_list_is_parsed_as_json() {
    let monk = FakeMonk::vault();
    let client = MonkClient::new(monk.path_str());

    let result = client.run(&MonkCommand::ServerList).await;

    assert!(result.succeeded);
    assert_eq!(result.exit_code, 0);
    let servers = result.value().and_then(|v| v["servers"].as_array()).unwrap();
    assert_eq!(servers.len(), 2);
    assert_eq!(servers[0]["name"], "local");
}

#[tokio::test]
async fn test_yaml_and_text_output() {
    let monk = FakeMonk::vault();
    let client = MonkClient::new(monk.path_str());

    let info = client.run(&MonkCommand::AuthInfo).await;
    assert_eq!(
        info.object().and_then(|o| o.get("tenant")).and_then(|t| t.as_str()),
        Some("vault-101")
    );

    let current = client.run(&MonkCommand::ServerCurrent).await;
    assert_eq!(current.text(), Some("local"));
}

#[tokio::test]
async fn test_non_zero_exit_is_a_failed_result() {
    let monk = FakeMonk::vault();
    let client = MonkClient::new(monk.path_str());

    let expired = client.run(&MonkCommand::AuthExpired).await;
    assert!(!expired.succeeded);
    assert_eq!(expired.exit_code, 1);
    assert_eq!(expired.failure, Some(CommandFailure::NonZeroExit));
    assert!(!session_still_valid(&expired));

    let unknown = client.run(&MonkCommand::TenantList).await;
    assert_eq!(unknown.exit_code, 2);
    assert_eq!(unknown.error_text, "unsupported: tenant list --json");
}

#[tokio::test]
async fn test_timeout_reports_infrastructure_failure() {
    let monk = FakeMonk::new("sleep 5");
    let client = MonkClient::new(monk.path_str()).with_timeout(Duration::from_millis(200));

    let start = std::time::Instant::now();
    let result = client.run(&MonkCommand::ServerList).await;

    assert!(result.timed_out());
    assert_eq!(result.exit_code, -1);
    assert_eq!(result.error_text, "Command timed out after 0.2 seconds");
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_missing_executable() {
    let client = MonkClient::new("/nonexistent/vault-tec/monk");

    let result = client.run(&MonkCommand::ServerList).await;

    assert!(!result.succeeded);
    assert_eq!(result.exit_code, -1);
    assert_eq!(result.failure, Some(CommandFailure::ExecutableNotFound));
    assert_eq!(
        result.error_text,
        "monk command not found: /nonexistent/vault-tec/monk"
    );
}

#[tokio::test]
async fn test_observers_see_masked_login_and_response() {
    let monk = FakeMonk::new(r#"echo '{"ok":true}'"#);
    let recorder = Arc::new(Recorder::default());
    let client = MonkClient::new(monk.path_str()).with_observers(
        Some(recorder.clone() as Arc<dyn CommandObserver>),
        Some(recorder.clone() as Arc<dyn ResponseObserver>),
    );

    client
        .run(&MonkCommand::AuthLogin {
            tenant: "vault-101".into(),
            username: "overseer".into(),
            password: "hunter2".into(),
        })
        .await;

    let commands = recorder.commands.lock().unwrap().clone();
    assert_eq!(commands, vec!["auth login vault-101 overseer ********".to_string()]);
    assert_eq!(
        recorder.responses.lock().unwrap().clone(),
        vec![r#"{"ok":true}"#.to_string()]
    );
}
