//! Bridge to the external `monk` CLI.
//!
//! [`MonkClient::execute`] prepends the configured executable to an argument
//! list, runs it with a bounded wait and classifies the output into a
//! [`CommandResult`]. It never returns an error: infrastructure failures are
//! reported with `exit_code == -1`.

mod command;
mod result;
mod runner;

pub use command::{MonkCommand, DEFAULT_TIMEOUT};
pub use result::{
    classify_output, CommandFailure, CommandResult, Payload, INFRASTRUCTURE_EXIT_CODE,
};
pub use runner::{ProcessOutput, ProcessRunner, RunError, TokioProcessRunner};

use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default executable name, resolved via `PATH`.
pub const DEFAULT_EXECUTABLE: &str = "monk";

/// Told about every outgoing command before it runs.
pub trait CommandObserver: Send + Sync {
    /// `command_line` excludes the executable name; secrets are masked.
    fn command_sent(&self, command_line: &str, trace_data: Option<&Value>);
}

/// Told about every classified payload after a command finishes.
pub trait ResponseObserver: Send + Sync {
    fn response_received(&self, payload: &Payload);
}

/// What the observers see for one invocation.
struct Trace<'a> {
    line: String,
    data: Option<&'a Value>,
}

/// Client for the monk CLI.
///
/// The executable is fixed at construction. Clone is cheap; clones share
/// the runner and observers.
#[derive(Clone)]
pub struct MonkClient {
    executable: String,
    runner: Arc<dyn ProcessRunner>,
    command_observer: Option<Arc<dyn CommandObserver>>,
    response_observer: Option<Arc<dyn ResponseObserver>>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for MonkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonkClient")
            .field("executable", &self.executable)
            .field("timeout", &self.timeout)
            .field("command_observer", &self.command_observer.is_some())
            .field("response_observer", &self.response_observer.is_some())
            .finish()
    }
}

impl MonkClient {
    /// Creates a client that spawns real processes.
    pub fn new(executable: impl Into<String>) -> Self {
        Self::with_runner(executable, Arc::new(TokioProcessRunner::new()))
    }

    /// Creates a client with a custom process runner.
    pub fn with_runner(executable: impl Into<String>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            executable: executable.into(),
            runner,
            command_observer: None,
            response_observer: None,
            timeout: None,
        }
    }

    /// Overrides the per-operation timeout for every catalog command.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attaches the trace observers.
    pub fn with_observers(
        mut self,
        command_observer: Option<Arc<dyn CommandObserver>>,
        response_observer: Option<Arc<dyn ResponseObserver>>,
    ) -> Self {
        self.command_observer = command_observer;
        self.response_observer = response_observer;
        self
    }

    /// Returns the configured executable.
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Runs `executable arguments...` and classifies the result.
    pub async fn execute(&self, arguments: &[String], timeout: Duration) -> CommandResult {
        let trace = Trace {
            line: raw_trace_line(arguments),
            data: None,
        };
        self.invoke(arguments, timeout, trace).await
    }

    /// Runs a catalog operation.
    pub async fn run(&self, command: &MonkCommand) -> CommandResult {
        let trace = Trace {
            line: command.display_line(),
            data: command.trace_data(),
        };
        debug!(command = command.name(), "dispatching monk command");
        let timeout = self.timeout.unwrap_or_else(|| command.timeout());
        self.invoke(&command.arguments(), timeout, trace).await
    }

    async fn invoke(&self, arguments: &[String], timeout: Duration, trace: Trace<'_>) -> CommandResult {
        if arguments.is_empty() {
            return CommandResult::infrastructure(
                CommandFailure::UnexpectedInvocationFailure,
                "Unexpected error: no arguments given",
            );
        }

        self.notify_command(&trace);

        let result = match self.runner.run(&self.executable, arguments, timeout).await {
            Ok(output) => {
                CommandResult::from_process(output.exit_code, &output.stdout, &output.stderr)
            }
            Err(RunError::Timeout(_)) => CommandResult::infrastructure(
                CommandFailure::Timeout,
                format!("Command timed out after {} seconds", format_seconds(timeout)),
            ),
            Err(RunError::NotFound(_)) => CommandResult::infrastructure(
                CommandFailure::ExecutableNotFound,
                format!("monk command not found: {}", self.executable),
            ),
            Err(RunError::Io(description)) => CommandResult::infrastructure(
                CommandFailure::UnexpectedInvocationFailure,
                format!("Unexpected error: {description}"),
            ),
        };

        if result.succeeded {
            debug!(command = %trace.line, "monk command succeeded");
        } else {
            warn!(
                command = %trace.line,
                exit_code = result.exit_code,
                error = %result.error_text,
                "monk command failed"
            );
        }

        if let Some(payload) = &result.payload {
            self.notify_response(payload);
        }

        result
    }

    fn notify_command(&self, trace: &Trace<'_>) {
        let Some(observer) = &self.command_observer else {
            return;
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            observer.command_sent(&trace.line, trace.data)
        }));
        if outcome.is_err() {
            warn!("command observer panicked; ignoring");
        }
    }

    fn notify_response(&self, payload: &Payload) {
        let Some(observer) = &self.response_observer else {
            return;
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| observer.response_received(payload)));
        if outcome.is_err() {
            warn!("response observer panicked; ignoring");
        }
    }

    // Server management

    pub async fn server_list(&self) -> CommandResult {
        self.run(&MonkCommand::ServerList).await
    }

    pub async fn server_add(&self, name: &str, endpoint: &str, description: &str) -> CommandResult {
        self.run(&MonkCommand::ServerAdd {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            description: Some(description.to_string()),
        })
        .await
    }

    pub async fn server_delete(&self, name: &str) -> CommandResult {
        self.run(&MonkCommand::ServerDelete(name.to_string())).await
    }

    pub async fn server_use(&self, name: &str) -> CommandResult {
        self.run(&MonkCommand::ServerUse(name.to_string())).await
    }

    pub async fn server_current(&self) -> CommandResult {
        self.run(&MonkCommand::ServerCurrent).await
    }

    pub async fn server_ping(&self, name: Option<&str>) -> CommandResult {
        self.run(&MonkCommand::ServerPing(name.map(str::to_string)))
            .await
    }

    pub async fn server_ping_all(&self) -> CommandResult {
        self.run(&MonkCommand::ServerPingAll).await
    }

    // Tenant management

    pub async fn tenant_list(&self) -> CommandResult {
        self.run(&MonkCommand::TenantList).await
    }

    pub async fn tenant_create(&self, name: &str) -> CommandResult {
        self.run(&MonkCommand::TenantCreate(name.to_string())).await
    }

    pub async fn tenant_delete(&self, name: &str) -> CommandResult {
        self.run(&MonkCommand::TenantDelete(name.to_string())).await
    }

    pub async fn tenant_use(&self, name: &str) -> CommandResult {
        self.run(&MonkCommand::TenantUse(name.to_string())).await
    }

    pub async fn tenant_init(&self, name: &str) -> CommandResult {
        self.run(&MonkCommand::TenantInit(name.to_string())).await
    }

    // Authentication

    pub async fn auth_login(&self, tenant: &str, username: &str, password: &str) -> CommandResult {
        self.run(&MonkCommand::AuthLogin {
            tenant: tenant.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
        .await
    }

    pub async fn auth_logout(&self) -> CommandResult {
        self.run(&MonkCommand::AuthLogout).await
    }

    pub async fn auth_status(&self) -> CommandResult {
        self.run(&MonkCommand::AuthStatus).await
    }

    pub async fn auth_ping(&self) -> CommandResult {
        self.run(&MonkCommand::AuthPing).await
    }

    pub async fn auth_info(&self) -> CommandResult {
        self.run(&MonkCommand::AuthInfo).await
    }

    /// Returns the raw expiry timestamp of the current token.
    pub async fn auth_expires(&self) -> CommandResult {
        self.run(&MonkCommand::AuthExpires).await
    }

    /// Reports token expiry through the exit status only.
    pub async fn auth_expired(&self) -> CommandResult {
        self.run(&MonkCommand::AuthExpired).await
    }

    // Data records

    pub async fn data_select(&self, schema: &str, filter: Option<Value>) -> CommandResult {
        self.run(&MonkCommand::DataSelect {
            schema: schema.to_string(),
            filter,
        })
        .await
    }

    pub async fn data_create(&self, schema: &str, record: Value) -> CommandResult {
        self.run(&MonkCommand::DataCreate {
            schema: schema.to_string(),
            record,
        })
        .await
    }

    pub async fn data_update(&self, schema: &str, id: &str, record: Option<Value>) -> CommandResult {
        self.run(&MonkCommand::DataUpdate {
            schema: schema.to_string(),
            id: id.to_string(),
            record,
        })
        .await
    }

    pub async fn data_delete(&self, schema: &str, id: &str) -> CommandResult {
        self.run(&MonkCommand::DataDelete {
            schema: schema.to_string(),
            id: id.to_string(),
        })
        .await
    }

    // Schemas

    pub async fn meta_select(&self, schema: Option<&str>) -> CommandResult {
        self.run(&MonkCommand::MetaSelect(schema.map(str::to_string)))
            .await
    }

    pub async fn meta_create(&self, schema: &str, definition: Value) -> CommandResult {
        self.run(&MonkCommand::MetaCreate {
            schema: schema.to_string(),
            definition,
        })
        .await
    }

    pub async fn meta_update(&self, schema: &str, definition: Value) -> CommandResult {
        self.run(&MonkCommand::MetaUpdate {
            schema: schema.to_string(),
            definition,
        })
        .await
    }

    pub async fn meta_delete(&self, schema: &str) -> CommandResult {
        self.run(&MonkCommand::MetaDelete(schema.to_string())).await
    }
}

/// Trace line for a raw invocation. Everything after
/// `auth login <tenant> <username>` is masked.
fn raw_trace_line(arguments: &[String]) -> String {
    match arguments {
        [auth, login, rest @ ..] if auth == "auth" && login == "login" && rest.len() > 2 => {
            let mut parts: Vec<&str> = arguments[..4].iter().map(String::as_str).collect();
            parts.extend(std::iter::repeat("********").take(rest.len() - 2));
            parts.join(" ")
        }
        _ => arguments.join(" "),
    }
}

fn format_seconds(timeout: Duration) -> String {
    if timeout.subsec_millis() == 0 {
        timeout.as_secs().to_string()
    } else {
        format!("{:.1}", timeout.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    /// Runner returning a canned outcome and recording what it was asked to run.
    struct FakeRunner {
        outcome: std::result::Result<ProcessOutput, RunError>,
        calls: Mutex<Vec<(String, Vec<String>)>>,
        timeouts: Mutex<Vec<Duration>>,
    }

    impl FakeRunner {
        fn new(outcome: std::result::Result<ProcessOutput, RunError>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: Mutex::new(Vec::new()),
                timeouts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ProcessRunner for FakeRunner {
        async fn run(
            &self,
            program: &str,
            args: &[String],
            timeout: Duration,
        ) -> std::result::Result<ProcessOutput, RunError> {
            self.timeouts.lock().unwrap().push(timeout);
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            self.outcome.clone()
        }
    }

    #[derive(Default)]
    struct Recorder {
        commands: Mutex<Vec<String>>,
        responses: Mutex<Vec<Payload>>,
    }

    impl CommandObserver for Recorder {
        fn command_sent(&self, command_line: &str, _trace_data: Option<&Value>) {
            self.commands.lock().unwrap().push(command_line.to_string());
        }
    }

    impl ResponseObserver for Recorder {
        fn response_received(&self, payload: &Payload) {
            self.responses.lock().unwrap().push(payload.clone());
        }
    }

    struct Exploding;

    impl CommandObserver for Exploding {
        fn command_sent(&self, _command_line: &str, _trace_data: Option<&Value>) {
            panic!("trace widget gone");
        }
    }

    impl ResponseObserver for Exploding {
        fn response_received(&self, _payload: &Payload) {
            panic!("trace widget gone");
        }
    }

    fn strings(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_execute_prepends_executable() {
        let runner = FakeRunner::new(Ok(ProcessOutput::new(0, "", "")));
        let client = MonkClient::with_runner("/opt/monk/bin/monk", runner.clone());
        client
            .execute(&strings(&["server", "list", "--json"]), DEFAULT_TIMEOUT)
            .await;

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "/opt/monk/bin/monk");
        assert_eq!(calls[0].1, strings(&["server", "list", "--json"]));
    }

    #[tokio::test]
    async fn test_server_list_scenario() {
        let runner = FakeRunner::new(Ok(ProcessOutput::new(
            0,
            r#"{"servers":[{"name":"local","status":"up"}]}"#,
            "",
        )));
        let client = MonkClient::with_runner("monk", runner);
        let result = client.server_list().await;

        assert!(result.succeeded);
        assert_eq!(
            result.value(),
            Some(&json!({"servers": [{"name": "local", "status": "up"}]}))
        );
        assert_eq!(result.error_text, "");
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn test_silent_failure_scenario() {
        let runner = FakeRunner::new(Ok(ProcessOutput::new(1, "", "")));
        let client = MonkClient::with_runner("monk", runner);
        let result = client.auth_expired().await;

        assert!(!result.succeeded);
        assert!(result.payload.is_none());
        assert_eq!(result.exit_code, 1);
        assert_eq!(result.failure, Some(CommandFailure::NonZeroExit));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_infrastructure_failure() {
        let runner = FakeRunner::new(Err(RunError::Timeout(Duration::from_secs(1))));
        let client = MonkClient::with_runner("monk", runner);
        let result = client
            .execute(&strings(&["server", "ping", "unreachable"]), Duration::from_secs(1))
            .await;

        assert!(!result.succeeded);
        assert_eq!(result.exit_code, -1);
        assert!(result.error_text.contains("timed out"));
        assert_eq!(result.error_text, "Command timed out after 1 seconds");
    }

    #[tokio::test]
    async fn test_missing_executable_names_it() {
        let runner = FakeRunner::new(Err(RunError::NotFound("monk-missing".into())));
        let client = MonkClient::with_runner("monk-missing", runner);
        let result = client.auth_status().await;

        assert!(!result.succeeded);
        assert_eq!(result.exit_code, -1);
        assert!(result.error_text.contains("monk-missing"));
        assert_eq!(result.failure, Some(CommandFailure::ExecutableNotFound));
    }

    #[tokio::test]
    async fn test_unexpected_failure() {
        let runner = FakeRunner::new(Err(RunError::Io("permission denied".into())));
        let client = MonkClient::with_runner("monk", runner);
        let result = client.tenant_list().await;

        assert_eq!(result.exit_code, -1);
        assert_eq!(result.error_text, "Unexpected error: permission denied");
        assert_eq!(
            result.failure,
            Some(CommandFailure::UnexpectedInvocationFailure)
        );
    }

    #[tokio::test]
    async fn test_empty_arguments_rejected_without_spawning() {
        let runner = FakeRunner::new(Ok(ProcessOutput::new(0, "ok", "")));
        let client = MonkClient::with_runner("monk", runner.clone());
        let result = client.execute(&[], DEFAULT_TIMEOUT).await;

        assert!(!result.succeeded);
        assert_eq!(result.exit_code, -1);
        assert!(runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_observers_see_command_and_response() {
        let runner = FakeRunner::new(Ok(ProcessOutput::new(0, r#"{"ok":true}"#, "")));
        let recorder = Arc::new(Recorder::default());
        let client = MonkClient::with_runner("monk", runner).with_observers(
            Some(recorder.clone() as Arc<dyn CommandObserver>),
            Some(recorder.clone() as Arc<dyn ResponseObserver>),
        );

        client.auth_login("vault-101", "overseer", "hunter2").await;

        assert_eq!(
            *recorder.commands.lock().unwrap(),
            vec!["auth login vault-101 overseer ********".to_string()]
        );
        assert_eq!(
            *recorder.responses.lock().unwrap(),
            vec![Payload::Structured(json!({"ok": true}))]
        );
    }

    #[tokio::test]
    async fn test_response_observer_skipped_without_payload() {
        let runner = FakeRunner::new(Ok(ProcessOutput::new(0, "  \n", "")));
        let recorder = Arc::new(Recorder::default());
        let client = MonkClient::with_runner("monk", runner)
            .with_observers(None, Some(recorder.clone() as Arc<dyn ResponseObserver>));

        client.auth_logout().await;
        assert!(recorder.responses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_panicking_observers_do_not_affect_result() {
        let runner = FakeRunner::new(Ok(ProcessOutput::new(0, "[1,2]", "")));
        let exploding = Arc::new(Exploding);
        let client = MonkClient::with_runner("monk", runner).with_observers(
            Some(exploding.clone() as Arc<dyn CommandObserver>),
            Some(exploding as Arc<dyn ResponseObserver>),
        );

        let result = client.meta_select(None).await;
        assert!(result.succeeded);
        assert_eq!(result.value(), Some(&json!([1, 2])));
    }

    #[tokio::test]
    async fn test_identical_calls_yield_equal_results() {
        let runner = FakeRunner::new(Ok(ProcessOutput::new(0, "name: local\n", "")));
        let client = MonkClient::with_runner("monk", runner);
        let first = client.server_current().await;
        let second = client.server_current().await;
        assert_eq!(first, second);
    }

    #[test]
    fn test_configured_timeout_overrides_command_default() {
        let runner = FakeRunner::new(Ok(ProcessOutput::new(0, "local\n", "")));
        let client = MonkClient::with_runner("monk", runner.clone());
        tokio_test::block_on(client.server_current());
        let client = client.with_timeout(Duration::from_secs(3));
        tokio_test::block_on(client.server_current());

        let timeouts = runner.timeouts.lock().unwrap();
        assert_eq!(
            *timeouts,
            vec![MonkCommand::ServerCurrent.timeout(), Duration::from_secs(3)]
        );
    }

    #[tokio::test]
    async fn test_raw_login_masks_password_in_trace() {
        let runner = FakeRunner::new(Ok(ProcessOutput::new(0, "", "")));
        let recorder = Arc::new(Recorder::default());
        let client = MonkClient::with_runner("monk", runner.clone()).with_observers(
            Some(recorder.clone() as Arc<dyn CommandObserver>),
            None,
        );
        let args = strings(&["auth", "login", "vault-101", "overseer", "hunter2"]);
        client.execute(&args, DEFAULT_TIMEOUT).await;

        assert_eq!(
            *recorder.commands.lock().unwrap(),
            vec!["auth login vault-101 overseer ********".to_string()]
        );
        assert_eq!(runner.calls.lock().unwrap()[0].1, args);
    }

    #[test]
    fn test_raw_trace_line_leaves_other_commands() {
        assert_eq!(raw_trace_line(&strings(&["server", "list", "--json"])), "server list --json");
        assert_eq!(raw_trace_line(&strings(&["auth", "login", "vault-101"])), "auth login vault-101");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(Duration::from_secs(5)), "5");
        assert_eq!(format_seconds(Duration::from_millis(1500)), "1.5");
    }
}
