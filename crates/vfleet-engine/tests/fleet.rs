//! Fleet orchestration tests against in-process mock engines.
//!
//! Each mock engine is a real axum server on an ephemeral port with a
//! scripted job-state sequence, so these tests drive the full stack:
//! session login, operation submit, the poll loop, and the fan-out
//! coordinator.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tokio::sync::{broadcast, mpsc};

use vfleet_engine::ops::{ListContainers, RefreshContainer};
use vfleet_engine::{
    EngineCatalog, EngineError, EngineOutcome, EngineTarget, Operation, TargetSelector,
    WorkerConfig, WorkerEvent, WorkerEventKind, run_fleet,
};

/// One scripted response for the job-status endpoint.
#[derive(Clone, Copy)]
enum Poll {
    State(&'static str),
    /// Simulate a transport fault: HTTP 500 for this one fetch.
    Flap,
}

struct Inner {
    script: VecDeque<Poll>,
    /// When the script drains: repeat the last state instead of erroring.
    /// Finite scripts turn an unexpected extra poll into a hard failure,
    /// which is how the retired-jobs-are-never-polled property is checked.
    repeat_last: bool,
    last: Option<&'static str>,
    polls: u32,
    logins: u32,
    containers: Vec<(&'static str, &'static str)>,
    reject_submit: Option<&'static str>,
}

#[derive(Clone)]
struct MockEngine {
    inner: Arc<Mutex<Inner>>,
}

impl MockEngine {
    fn new(script: Vec<Poll>) -> Self {
        MockEngine {
            inner: Arc::new(Mutex::new(Inner {
                script: script.into(),
                repeat_last: false,
                last: None,
                polls: 0,
                logins: 0,
                containers: vec![("CONTAINER-1", "app1")],
                reject_submit: None,
            })),
        }
    }

    fn repeat_last(self) -> Self {
        self.inner.lock().unwrap().repeat_last = true;
        self
    }

    fn rejecting(self, details: &'static str) -> Self {
        self.inner.lock().unwrap().reject_submit = Some(details);
        self
    }

    fn without_containers(self) -> Self {
        self.inner.lock().unwrap().containers.clear();
        self
    }

    fn polls(&self) -> u32 {
        self.inner.lock().unwrap().polls
    }

    fn logins(&self) -> u32 {
        self.inner.lock().unwrap().logins
    }

    async fn serve(&self) -> SocketAddr {
        let app = axum::Router::new()
            .route("/api/login", post(login))
            .route("/api/containers", get(list_containers))
            .route("/api/containers/{cref}/refresh", post(refresh_container))
            .route("/api/jobs/{jref}", get(job_status))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        addr
    }
}

async fn login(State(mock): State<MockEngine>) -> Json<Value> {
    mock.inner.lock().unwrap().logins += 1;
    Json(json!({"status": "OK", "result": {"token": "tok-1"}}))
}

async fn list_containers(State(mock): State<MockEngine>) -> Json<Value> {
    let containers: Vec<Value> = mock
        .inner
        .lock()
        .unwrap()
        .containers
        .iter()
        .map(|(reference, name)| json!({"reference": reference, "name": name}))
        .collect();
    Json(json!({"status": "OK", "result": containers}))
}

async fn refresh_container(
    State(mock): State<MockEngine>,
    Path(_cref): Path<String>,
) -> Json<Value> {
    let inner = mock.inner.lock().unwrap();
    match inner.reject_submit {
        Some(details) => Json(json!({"status": "ERROR", "error": {"details": details}})),
        None => Json(json!({"status": "OK", "job": "JOB-1"})),
    }
}

async fn job_status(State(mock): State<MockEngine>, Path(jref): Path<String>) -> Response {
    let mut inner = mock.inner.lock().unwrap();
    inner.polls += 1;
    let next = match inner.script.pop_front() {
        Some(poll) => poll,
        None if inner.repeat_last => match inner.last {
            Some(state) => Poll::State(state),
            None => return (StatusCode::INTERNAL_SERVER_ERROR, "no script").into_response(),
        },
        None => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "polled after terminal").into_response();
        }
    };
    match next {
        Poll::Flap => (StatusCode::INTERNAL_SERVER_ERROR, "flap").into_response(),
        Poll::State(state) => {
            inner.last = Some(state);
            Json(json!({
                "status": "OK",
                "result": {
                    "reference": jref,
                    "job_state": state,
                    "percent_complete": if state == "COMPLETED" { 100.0 } else { 40.0 },
                }
            }))
            .into_response()
        }
    }
}

fn target(name: &str, addr: SocketAddr, default: bool) -> EngineTarget {
    EngineTarget {
        name: name.to_string(),
        address: "127.0.0.1".to_string(),
        username: "admin".to_string(),
        password: "pw".to_string(),
        port: Some(addr.port()),
        https: false,
        default,
    }
}

fn catalog(targets: Vec<EngineTarget>) -> EngineCatalog {
    serde_json::from_value(json!({ "engines": targets })).expect("catalog")
}

fn fast_config() -> WorkerConfig {
    WorkerConfig {
        poll_interval: Duration::from_millis(25),
        poll_failure_cap: 5,
    }
}

struct Run {
    report: Result<vfleet_engine::FleetReport, EngineError>,
    events: Vec<WorkerEvent>,
    elapsed: Duration,
}

async fn run(
    catalog: &EngineCatalog,
    selector: TargetSelector,
    op: Arc<dyn Operation>,
    config: WorkerConfig,
) -> Run {
    let (shutdown, _keep) = broadcast::channel(1);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let started = Instant::now();
    let report = run_fleet(catalog, &selector, op, config, &shutdown, tx).await;
    let elapsed = started.elapsed();
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    Run {
        report,
        events,
        elapsed,
    }
}

fn retired_count(events: &[WorkerEvent], engine: &str) -> usize {
    events
        .iter()
        .filter(|e| e.engine == engine && matches!(e.kind, WorkerEventKind::JobRetired { .. }))
        .count()
}

#[tokio::test]
async fn fleet_waits_for_slowest_engine() {
    let e1 = MockEngine::new(vec![Poll::State("COMPLETED")]);
    let e2 = MockEngine::new(vec![
        Poll::State("RUNNING"),
        Poll::State("RUNNING"),
        Poll::State("COMPLETED"),
    ]);
    let e3 = MockEngine::new(vec![Poll::State("COMPLETED")]);
    let catalog = catalog(vec![
        target("e1", e1.serve().await, false),
        target("e2", e2.serve().await, false),
        target("e3", e3.serve().await, false),
    ]);

    let config = fast_config();
    let out = run(
        &catalog,
        TargetSelector::All,
        Arc::new(RefreshContainer {
            name: "app1".into(),
        }),
        config.clone(),
    )
    .await;

    let report = out.report.expect("fleet ran");
    assert!(report.success(), "outcomes: {:?}", report.outcomes);
    assert_eq!(report.outcomes.len(), 3);
    // Bounded below by the slowest engine: two sleeps before its third poll.
    assert!(out.elapsed >= config.poll_interval * 2);
    // Each engine's completion is observed (and logged) exactly once.
    for engine in ["e1", "e2", "e3"] {
        assert_eq!(retired_count(&out.events, engine), 1, "engine {engine}");
    }
    // Finite scripts: a poll after the terminal observation would have
    // returned HTTP 500 and failed the run.
    assert_eq!(e1.polls(), 1);
    assert_eq!(e2.polls(), 3);
    assert_eq!(e3.polls(), 1);
}

#[tokio::test]
async fn poll_transport_flap_retries_without_dropping_the_job() {
    let engine = MockEngine::new(vec![
        Poll::State("RUNNING"),
        Poll::Flap,
        Poll::State("COMPLETED"),
    ]);
    let catalog = catalog(vec![target("e1", engine.serve().await, false)]);

    let out = run(
        &catalog,
        TargetSelector::All,
        Arc::new(RefreshContainer {
            name: "app1".into(),
        }),
        fast_config(),
    )
    .await;

    let report = out.report.expect("fleet ran");
    assert!(report.success(), "outcomes: {:?}", report.outcomes);
    // The flapped fetch consumed a script entry but not the job: the job
    // stayed tracked and the next cycle observed COMPLETED.
    assert_eq!(engine.polls(), 3);
}

#[tokio::test]
async fn consecutive_poll_failures_hit_the_cap() {
    let engine = MockEngine::new(vec![
        Poll::State("RUNNING"),
        Poll::Flap,
        Poll::Flap,
        Poll::Flap,
    ]);
    let catalog = catalog(vec![target("e1", engine.serve().await, false)]);

    let out = run(
        &catalog,
        TargetSelector::All,
        Arc::new(RefreshContainer {
            name: "app1".into(),
        }),
        WorkerConfig {
            poll_interval: Duration::from_millis(10),
            poll_failure_cap: 3,
        },
    )
    .await;

    let report = out.report.expect("fleet ran");
    assert!(matches!(
        report.outcomes.get("e1"),
        Some(EngineOutcome::Failed(EngineError::Transport(_)))
    ));
}

#[tokio::test]
async fn submit_rejection_is_isolated_per_engine() {
    let e1 = MockEngine::new(vec![]).rejecting("container 'app1' is busy");
    let e2 = MockEngine::new(vec![Poll::State("COMPLETED")]);
    let catalog = catalog(vec![
        target("e1", e1.serve().await, false),
        target("e2", e2.serve().await, false),
    ]);

    let out = run(
        &catalog,
        TargetSelector::All,
        Arc::new(RefreshContainer {
            name: "app1".into(),
        }),
        fast_config(),
    )
    .await;

    let report = out.report.expect("fleet ran");
    assert!(!report.success());
    assert!(matches!(
        report.outcomes.get("e1"),
        Some(EngineOutcome::Failed(EngineError::Remote { .. }))
    ));
    assert!(matches!(report.outcomes.get("e2"), Some(EngineOutcome::Done)));
}

#[tokio::test]
async fn name_resolution_failure_aborts_only_that_engine() {
    let e1 = MockEngine::new(vec![]).without_containers();
    let e2 = MockEngine::new(vec![Poll::State("COMPLETED")]);
    let catalog = catalog(vec![
        target("e1", e1.serve().await, false),
        target("e2", e2.serve().await, false),
    ]);

    let out = run(
        &catalog,
        TargetSelector::All,
        Arc::new(RefreshContainer {
            name: "app1".into(),
        }),
        fast_config(),
    )
    .await;

    let report = out.report.expect("fleet ran");
    assert!(matches!(
        report.outcomes.get("e1"),
        Some(EngineOutcome::Failed(EngineError::NotFound { kind: "container", .. }))
    ));
    assert!(matches!(report.outcomes.get("e2"), Some(EngineOutcome::Done)));
}

#[tokio::test]
async fn failed_job_fails_its_engine() {
    let engine = MockEngine::new(vec![Poll::State("RUNNING"), Poll::State("FAILED")]);
    let catalog = catalog(vec![target("e1", engine.serve().await, false)]);

    let out = run(
        &catalog,
        TargetSelector::All,
        Arc::new(RefreshContainer {
            name: "app1".into(),
        }),
        fast_config(),
    )
    .await;

    let report = out.report.expect("fleet ran");
    assert!(matches!(
        report.outcomes.get("e1"),
        Some(EngineOutcome::Failed(EngineError::JobFailed { .. }))
    ));
    // The failed job was still retired exactly once.
    assert_eq!(retired_count(&out.events, "e1"), 1);
}

#[tokio::test]
async fn unreachable_engine_fails_only_itself() {
    // Grab a port nothing is listening on by binding and dropping.
    let dead = tokio::net::TcpListener::bind(("127.0.0.1", 0))
        .await
        .expect("bind listener");
    let dead_addr = dead.local_addr().expect("local addr");
    drop(dead);

    let e2 = MockEngine::new(vec![Poll::State("COMPLETED")]);
    let catalog = catalog(vec![
        target("e1", dead_addr, false),
        target("e2", e2.serve().await, false),
    ]);

    let out = run(
        &catalog,
        TargetSelector::All,
        Arc::new(RefreshContainer {
            name: "app1".into(),
        }),
        fast_config(),
    )
    .await;

    let report = out.report.expect("fleet ran");
    assert!(matches!(
        report.outcomes.get("e1"),
        Some(EngineOutcome::Failed(EngineError::Transport(_)))
    ));
    assert!(matches!(report.outcomes.get("e2"), Some(EngineOutcome::Done)));
}

#[tokio::test]
async fn unknown_engine_starts_no_workers() {
    let e1 = MockEngine::new(vec![]);
    let e2 = MockEngine::new(vec![]);
    let catalog = catalog(vec![
        target("e1", e1.serve().await, false),
        target("e2", e2.serve().await, false),
    ]);

    let out = run(
        &catalog,
        TargetSelector::Named("missing-name".into()),
        Arc::new(ListContainers),
        fast_config(),
    )
    .await;

    assert!(matches!(
        out.report,
        Err(EngineError::UnknownEngine(name)) if name == "missing-name"
    ));
    assert_eq!(e1.logins() + e2.logins(), 0);
    assert!(out.events.is_empty());
}

#[tokio::test]
async fn missing_default_engine_fails_before_workers() {
    let e1 = MockEngine::new(vec![]);
    let catalog = catalog(vec![target("e1", e1.serve().await, false)]);

    let out = run(
        &catalog,
        TargetSelector::Default,
        Arc::new(ListContainers),
        fast_config(),
    )
    .await;

    assert!(matches!(out.report, Err(EngineError::NoTargetEngine)));
    assert_eq!(e1.logins(), 0);
}

#[tokio::test]
async fn sync_operation_completes_without_polling() {
    let engine = MockEngine::new(vec![]);
    let catalog = catalog(vec![target("e1", engine.serve().await, true)]);

    let out = run(
        &catalog,
        TargetSelector::Default,
        Arc::new(ListContainers),
        fast_config(),
    )
    .await;

    let report = out.report.expect("fleet ran");
    assert!(report.success());
    assert_eq!(engine.polls(), 0);
    let listed = out.events.iter().find_map(|e| match &e.kind {
        WorkerEventKind::Completed { data: Some(data), .. } => Some(data.clone()),
        _ => None,
    });
    assert_eq!(listed.expect("listing data")[0]["name"], "app1");
}

#[tokio::test]
async fn interrupt_aborts_all_workers_within_a_poll_interval() {
    let e1 = MockEngine::new(vec![Poll::State("RUNNING")]).repeat_last();
    let e2 = MockEngine::new(vec![Poll::State("RUNNING")]).repeat_last();
    let catalog = catalog(vec![
        target("e1", e1.serve().await, false),
        target("e2", e2.serve().await, false),
    ]);

    let config = WorkerConfig {
        poll_interval: Duration::from_millis(50),
        poll_failure_cap: 5,
    };
    let (shutdown, _keep) = broadcast::channel(1);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let runner = {
        let catalog = catalog.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            run_fleet(
                &catalog,
                &TargetSelector::All,
                Arc::new(RefreshContainer {
                    name: "app1".into(),
                }),
                config,
                &shutdown,
                tx,
            )
            .await
        })
    };

    // Let both workers get into the polling state, then interrupt.
    tokio::time::sleep(Duration::from_millis(120)).await;
    let interrupted_at = Instant::now();
    shutdown.send(()).expect("workers subscribed");

    let report = runner.await.expect("runner").expect("fleet ran");
    assert!(interrupted_at.elapsed() < Duration::from_secs(2));
    assert!(report.interrupted());
    for engine in ["e1", "e2"] {
        assert!(
            matches!(report.outcomes.get(engine), Some(EngineOutcome::Aborted)),
            "engine {engine} outcome: {:?}",
            report.outcomes.get(engine)
        );
    }
    // Each interrupted worker surfaced the abort instead of being dropped.
    let mut aborted = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if matches!(event.kind, WorkerEventKind::Aborted) {
            aborted.push(event.engine);
        }
    }
    aborted.sort();
    assert_eq!(aborted, ["e1", "e2"]);
}
