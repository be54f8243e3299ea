//! End-to-end agent runs against a stub registry agent.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{StubAgent, body_of};
use consulate_agent::{AgentConfig, AgentOptions, run_agent};
use consulate_supervisor::CommandError;

const REGISTER: &str = "/v1/agent/service/register";
const DEREGISTER: &str = "/v1/agent/service/deregister/";
const PASS: &str = "/v1/agent/check/pass/";
const FAIL: &str = "/v1/agent/check/fail/";

fn worker(agent: &StubAgent, command: &[&str]) -> AgentConfig {
    worker_every(agent, command, Duration::from_secs(3600))
}

fn worker_every(agent: &StubAgent, command: &[&str], interval: Duration) -> AgentConfig {
    AgentConfig::from_options(AgentOptions {
        registry_addr: agent.addr.clone(),
        name: "worker".to_string(),
        id: Some("worker-1".to_string()),
        interval,
        command: command.iter().map(|s| s.to_string()).collect(),
        ..AgentOptions::default()
    })
    .unwrap()
}

#[tokio::test]
async fn clean_exit_deregisters_the_service() {
    let agent = StubAgent::start().await;
    let config = worker(&agent, &["true"]);

    let outcome = run_agent(&config).await.unwrap().expect("command was supervised");
    assert!(outcome.is_success());

    let register = agent.requests_to(REGISTER);
    assert_eq!(register.len(), 1);
    assert_eq!(register[0].method, "POST");
    assert_eq!(
        body_of(&register[0]),
        serde_json::json!({"Name": "worker", "ID": "worker-1", "Check": {"TTL": "30s"}})
    );

    let deregister = agent.requests_to(DEREGISTER);
    assert_eq!(deregister.len(), 1);
    assert_eq!(deregister[0].path, "/v1/agent/service/deregister/worker-1");
    assert!(agent.requests_to(FAIL).is_empty());

    // The heartbeat fired at least once, and the deregistration came last.
    assert!(!agent.requests_to(PASS).is_empty());
    let last = agent.requests().pop().unwrap();
    assert!(last.path.starts_with(DEREGISTER));
}

#[tokio::test]
async fn failed_exit_marks_the_check_failing() {
    let agent = StubAgent::start().await;
    let config = worker(&agent, &["false"]);

    let outcome = run_agent(&config).await.unwrap().expect("command was supervised");
    assert!(matches!(outcome.error, Some(CommandError::Exited(_))));

    let fail = agent.requests_to(FAIL);
    assert_eq!(fail.len(), 1);
    assert_eq!(fail[0].path, "/v1/agent/check/fail/service:worker-1");
    let note = fail[0].note().unwrap();
    assert!(note.starts_with("Command false exited with error"), "{note}");

    assert!(agent.requests_to(DEREGISTER).is_empty());
}

#[tokio::test]
async fn launch_failure_marks_the_check_failing() {
    let agent = StubAgent::start().await;
    let config = worker(&agent, &["/nonexistent/consulate-test-binary", "--flag"]);

    let outcome = run_agent(&config).await.unwrap().unwrap();
    assert!(matches!(outcome.error, Some(CommandError::Launch { .. })));

    let fail = agent.requests_to(FAIL);
    assert_eq!(fail.len(), 1);
    assert!(
        fail[0]
            .note()
            .unwrap()
            .contains("/nonexistent/consulate-test-binary --flag")
    );
    assert!(agent.requests_to(DEREGISTER).is_empty());
}

#[tokio::test]
async fn heartbeat_runs_while_the_command_runs() {
    let agent = StubAgent::start().await;
    let config = worker_every(&agent, &["sh", "-c", "sleep 0.3"], Duration::from_millis(20));

    let outcome = run_agent(&config).await.unwrap().unwrap();
    assert!(outcome.is_success());

    assert!(agent.requests_to(PASS).len() >= 2);
    assert_eq!(agent.requests_to(DEREGISTER).len(), 1);
    let last = agent.requests().pop().unwrap();
    assert!(last.path.starts_with(DEREGISTER));
}

#[tokio::test]
async fn rejected_registration_aborts_before_heartbeat() {
    let agent =
        StubAgent::with_statuses(StatusCode::INTERNAL_SERVER_ERROR, StatusCode::OK).await;
    let config = worker(&agent, &["true"]);

    let err = run_agent(&config).await.unwrap_err();
    assert!(format!("{err:#}").contains("500"), "{err:#}");

    let requests = agent.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, REGISTER);
}

#[tokio::test]
async fn final_mutation_failure_does_not_change_the_result() {
    let agent =
        StubAgent::with_statuses(StatusCode::OK, StatusCode::INTERNAL_SERVER_ERROR).await;
    let config = worker(&agent, &["false"]);

    let outcome = run_agent(&config).await.unwrap().unwrap();
    assert!(!outcome.is_success());
    assert_eq!(agent.requests_to(FAIL).len(), 1);
}

#[tokio::test]
async fn without_a_command_the_agent_runs_until_stopped() {
    let agent = StubAgent::start().await;
    let config = AgentConfig::from_options(AgentOptions {
        registry_addr: agent.addr.clone(),
        name: "web".to_string(),
        port: Some(8080),
        interval: Duration::from_millis(20),
        ..AgentOptions::default()
    })
    .unwrap();

    let run = tokio::time::timeout(Duration::from_millis(200), run_agent(&config)).await;
    assert!(run.is_err(), "agent returned without a command");

    let register = agent.requests_to(REGISTER);
    assert_eq!(
        body_of(&register[0]),
        serde_json::json!({"Name": "web", "ID": "web:8080", "Port": 8080, "Check": {"TTL": "30s"}})
    );

    let pass = agent.requests_to(PASS);
    assert!(!pass.is_empty());
    assert_eq!(pass[0].path, "/v1/agent/check/pass/service:web:8080");

    assert!(agent.requests_to(DEREGISTER).is_empty());
    assert!(agent.requests_to(FAIL).is_empty());
}

#[tokio::test]
async fn explicit_check_is_sent_instead_of_ttl() {
    let agent = StubAgent::start().await;
    let config = AgentConfig::from_options(AgentOptions {
        registry_addr: agent.addr.clone(),
        name: "api".to_string(),
        tags: Some("blue,canary".to_string()),
        check: Some(r#"{"HTTP": "http://localhost:9000/health", "Interval": "5s"}"#.to_string()),
        interval: Duration::from_secs(3600),
        command: vec!["true".to_string()],
        ..AgentOptions::default()
    })
    .unwrap();

    run_agent(&config).await.unwrap();

    let body = body_of(&agent.requests_to(REGISTER)[0]);
    assert_eq!(
        body,
        serde_json::json!({
            "Name": "api",
            "ID": "api",
            "Tags": ["blue", "canary"],
            "Check": {"HTTP": "http://localhost:9000/health", "Interval": "5s"},
        })
    );
    assert_eq!(
        agent.requests_to(DEREGISTER)[0].path,
        "/v1/agent/service/deregister/api"
    );
}

#[tokio::test]
async fn service_id_with_a_space_is_escaped_on_the_wire() {
    let agent = StubAgent::start().await;
    let config = AgentConfig::from_options(AgentOptions {
        registry_addr: agent.addr.clone(),
        name: "my svc".to_string(),
        interval: Duration::from_secs(3600),
        command: vec!["false".to_string()],
        ..AgentOptions::default()
    })
    .unwrap();

    run_agent(&config).await.unwrap();

    assert_eq!(body_of(&agent.requests_to(REGISTER)[0])["ID"], "my svc");
    let pass = agent.requests_to(PASS);
    assert_eq!(pass.len(), 1);
    assert_eq!(pass[0].path, "/v1/agent/check/pass/service:my%20svc");
    let fail = agent.requests_to(FAIL);
    assert_eq!(fail.len(), 1);
    assert_eq!(fail[0].path, "/v1/agent/check/fail/service:my%20svc");
}
