//! Integration test: the process strategy, with `hario worker` as the worker,
//! produces exactly what the sequential strategy does.

use hario_core::transform::{domain, flatten, from_fn, normalize_sizes, normalize_timings};
use hario_core::{
    IdFn, Pipeline, PipelineConfig, PipelineError, Record, Strategy, TransformError, WorkerCommand,
};
use serde_json::{json, Value};

fn worker() -> WorkerCommand {
    WorkerCommand::new(env!("CARGO_BIN_EXE_hario")).arg("worker")
}

fn entries(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let value = json!({
                "startedDateTime": "2025-06-05T16:29:09.173Z",
                "request": {"method": "GET", "url": format!("https://test.test:8443/a/{i}"), "headersSize": -1,
                            "headers": [{"name": "accept", "value": "*/*"}]},
                "response": {"status": 200, "content": {"size": -1, "mimeType": "text/css"}},
                "timings": {"dns": -1, "send": 1.5, "wait": 2, "receive": -1},
                "seq": i
            });
            match value {
                Value::Object(map) => map,
                _ => unreachable!(),
            }
        })
        .collect()
}

fn pipeline(strategy: Strategy) -> Pipeline {
    let config = PipelineConfig::new(2, strategy, Some(4))
        .unwrap()
        .with_worker_command(worker());
    Pipeline::builder()
        .id(IdFn::by_field(["request.url", "startedDateTime"]), "id")
        .transformer(normalize_sizes())
        .transformer(normalize_timings())
        .transformer(domain("domain"))
        .transformer(flatten())
        .config(config)
        .build()
}

#[test]
fn process_pool_matches_sequential() {
    let expected = pipeline(Strategy::Sequential).process(entries(5)).unwrap();
    let out = pipeline(Strategy::Process).process(entries(5)).unwrap();
    assert_eq!(out, expected);
    assert_eq!(out[3]["domain"], "test.test:8443");
    assert_eq!(out[3]["seq"], 3);
}

#[test]
fn process_pool_handles_empty_input() {
    assert!(pipeline(Strategy::Process).process(Vec::new()).unwrap().is_empty());
}

#[test]
fn worker_failure_reports_the_global_index() {
    let mut records = entries(7);
    records[5]["request"].as_object_mut().unwrap().remove("url");
    let err = Pipeline::builder()
        .id(IdFn::by_field(["request.url"]), "id")
        .config(
            PipelineConfig::new(2, Strategy::Process, Some(3))
                .unwrap()
                .with_worker_command(worker()),
        )
        .build()
        .process(records)
        .unwrap_err();
    assert_eq!(err.record_index(), Some(5));
    match err {
        PipelineError::Transform { source, .. } => {
            assert_eq!(source.step, "set_id[by_field(request.url)]");
            assert!(matches!(source.error, TransformError::MissingField { .. }));
        }
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn closures_cannot_cross_the_process_boundary() {
    let err = Pipeline::builder()
        .transformer(from_fn("local-only", Ok))
        .config(
            PipelineConfig::new(2, Strategy::Process, Some(1))
                .unwrap()
                .with_worker_command(worker()),
        )
        .build()
        .process(entries(2))
        .unwrap_err();
    assert!(matches!(err, PipelineError::NotSerializable(_)), "{err}");
}

#[test]
fn missing_worker_program_is_a_worker_error() {
    let config = PipelineConfig::new(1, Strategy::Process, Some(1))
        .unwrap()
        .with_worker_command(WorkerCommand::new("/nonexistent/hario-worker"));
    let err = Pipeline::builder()
        .transformer(normalize_sizes())
        .config(config)
        .build()
        .process(entries(1))
        .unwrap_err();
    assert!(matches!(err, PipelineError::Worker(_)), "{err}");
}
