//! BDD step definitions for the prediction pipeline and session flow

use std::sync::Arc;
use std::time::Duration;

use cucumber::{given, then, when};
use machine_health::config::PredictorConfig;
use machine_health::io::HttpClient;
use machine_health::scenarios;
use machine_health::session::{self, SessionPhase, SubmitError, FAILURE_NOTICE};
use machine_health::{MachineHealthError, PredictionClient};
use serde_json::Value;

use crate::stub_http::{StubHttpClient, StubReply};
use crate::world::MachineHealthWorld;

const ENDPOINT: &str = "http://predictor.test/predict";

fn parse_phase(s: &str) -> SessionPhase {
    match s {
        "idle" => SessionPhase::Idle,
        "submitting" => SessionPhase::Submitting,
        "result_shown" => SessionPhase::ResultShown,
        other => panic!("Unknown phase: {}", other),
    }
}

fn install_stub(world: &mut MachineHealthWorld, reply: StubReply) {
    world.stub = Some(Arc::new(StubHttpClient::new(reply)));
}

fn predictor(world: &MachineHealthWorld) -> Arc<PredictionClient> {
    let stub = world.stub.as_ref().expect("prediction service not set");
    let http: Arc<dyn HttpClient> = stub.clone();
    let config = PredictorConfig {
        endpoint_url: ENDPOINT.to_string(),
        ..PredictorConfig::default()
    };
    Arc::new(PredictionClient::new(&config, http))
}

async fn submit_raw(world: &mut MachineHealthWorld, raw: &Value) {
    let predictor = predictor(world);
    let session = world
        .session
        .get_or_insert_with(session::new_session_handle)
        .clone();
    world.submit_result =
        Some(session::submit(&session, &predictor, raw, Duration::ZERO).await);
}

fn requests(world: &MachineHealthWorld) -> Vec<(String, Value)> {
    world
        .stub
        .as_ref()
        .expect("prediction service not set")
        .requests()
}

#[given(expr = "a prediction service replying {int} with {string}")]
fn service_replying(world: &mut MachineHealthWorld, status: u16, body: String) {
    install_stub(world, StubReply::Respond { status, body });
}

#[given(expr = "a prediction service replying with probability {float}")]
fn service_replying_probability(world: &mut MachineHealthWorld, probability: f64) {
    let body = serde_json::json!({ "failure_probability": probability }).to_string();
    install_stub(world, StubReply::Respond { status: 200, body });
}

#[given("an unreachable prediction service")]
fn service_unreachable(world: &mut MachineHealthWorld) {
    install_stub(world, StubReply::Unreachable);
}

#[when("the reading is submitted")]
async fn reading_submitted(world: &mut MachineHealthWorld) {
    let raw = world.raw.clone().expect("telemetry reading not set");
    submit_raw(world, &raw).await;
}

#[when(expr = "the reading is submitted {int} times")]
async fn reading_submitted_times(world: &mut MachineHealthWorld, times: usize) {
    let raw = world.raw.clone().expect("telemetry reading not set");
    for _ in 0..times {
        submit_raw(world, &raw).await;
        assert!(
            matches!(world.submit_result, Some(Ok(_))),
            "submission failed: {:?}",
            world.submit_result
        );
    }
}

#[when(expr = "the {string} scenario is submitted")]
async fn scenario_submitted(world: &mut MachineHealthWorld, id: String) {
    let raw = scenarios::find(&id)
        .unwrap_or_else(|| panic!("Unknown scenario: {}", id))
        .raw();
    submit_raw(world, &raw).await;
}

#[when("the analysis is reset")]
async fn analysis_reset(world: &mut MachineHealthWorld) {
    let session = world.session.as_ref().expect("session not started");
    session.write().await.reset();
}

#[then(expr = "the prediction service received {int} request(s)")]
fn service_received(world: &mut MachineHealthWorld, count: usize) {
    assert_eq!(requests(world).len(), count);
}

#[then(expr = "the request key {string} equals {string}")]
fn request_key_equals(world: &mut MachineHealthWorld, key: String, json: String) {
    let expected: Value =
        serde_json::from_str(&json).unwrap_or_else(|e| panic!("Invalid JSON '{}': {}", json, e));
    let requests = requests(world);
    let (url, body) = requests.last().expect("no request sent");
    assert_eq!(url, ENDPOINT);
    assert_eq!(body[&key], expected, "request body: {}", body);
}

#[then(expr = "the request has exactly {int} keys")]
fn request_key_count(world: &mut MachineHealthWorld, count: usize) {
    let requests = requests(world);
    let (_, body) = requests.last().expect("no request sent");
    assert_eq!(body.as_object().map(|o| o.len()), Some(count));
}

#[then(expr = "the prediction probability is {float}")]
fn prediction_probability(world: &mut MachineHealthWorld, probability: f64) {
    match world.submit_result.as_ref().expect("nothing submitted") {
        Ok(prediction) => assert_eq!(prediction.failure_probability, probability),
        Err(e) => panic!("Expected a prediction, got error: {:?}", e),
    }
}

#[then("the submission is rejected as invalid")]
fn submission_invalid(world: &mut MachineHealthWorld) {
    let result = world.submit_result.as_ref().expect("nothing submitted");
    assert!(
        matches!(result, Err(SubmitError::Invalid(_))),
        "Expected invalid submission, got {:?}",
        result
    );
}

#[then(expr = "the submission fails with server status {int}")]
fn submission_server_error(world: &mut MachineHealthWorld, status: u16) {
    match world.submit_result.as_ref().expect("nothing submitted") {
        Err(SubmitError::Prediction(MachineHealthError::Server { status: actual })) => {
            assert_eq!(*actual, status)
        }
        other => panic!("Expected server error, got {:?}", other),
    }
}

#[then("the submission fails with a network error")]
fn submission_network_error(world: &mut MachineHealthWorld) {
    let result = world.submit_result.as_ref().expect("nothing submitted");
    assert!(
        matches!(
            result,
            Err(SubmitError::Prediction(MachineHealthError::Network(_)))
        ),
        "Expected network error, got {:?}",
        result
    );
}

#[then("the submission fails with a parse error")]
fn submission_parse_error(world: &mut MachineHealthWorld) {
    let result = world.submit_result.as_ref().expect("nothing submitted");
    assert!(
        matches!(
            result,
            Err(SubmitError::Prediction(MachineHealthError::Parse(_)))
        ),
        "Expected parse error, got {:?}",
        result
    );
}

#[then(expr = "the session phase is {string}")]
async fn session_phase(world: &mut MachineHealthWorld, phase: String) {
    let session = world.session.as_ref().expect("session not started");
    assert_eq!(session.read().await.phase(), parse_phase(&phase));
}

#[then("no result is shown")]
async fn no_result(world: &mut MachineHealthWorld) {
    let session = world.session.as_ref().expect("session not started");
    assert!(session.read().await.current_result().is_none());
}

#[then("the failure notice is shown")]
async fn failure_notice(world: &mut MachineHealthWorld) {
    let session = world.session.as_ref().expect("session not started");
    assert_eq!(session.read().await.notice(), Some(FAILURE_NOTICE));
}

#[then(expr = "the history has {int} entry/entries")]
async fn history_length(world: &mut MachineHealthWorld, count: usize) {
    let session = world.session.as_ref().expect("session not started");
    assert_eq!(session.read().await.history().len(), count);
}

#[then(expr = "the newest history entry is {string} with probability {float}")]
async fn newest_entry(world: &mut MachineHealthWorld, status: String, probability: f64) {
    let session = world.session.as_ref().expect("session not started");
    let s = session.read().await;
    let newest = s.history().first().expect("history is empty");
    assert_eq!(newest.status.to_string(), status);
    assert_eq!(newest.probability, probability);
}

#[then(expr = "the newest history entry is for machine type {string}")]
async fn newest_entry_type(world: &mut MachineHealthWorld, machine_type: String) {
    let session = world.session.as_ref().expect("session not started");
    let s = session.read().await;
    let newest = s.history().first().expect("history is empty");
    assert_eq!(newest.machine_type.as_str(), machine_type);
}
