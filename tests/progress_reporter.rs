// tests/progress_reporter.rs

mod common;
use crate::common::builders::{VertexBuilder, finished_counter, log_chunk, status};
use crate::common::recording_sink::RecordingSink;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;
use std::sync::Arc;

use tokio::sync::mpsc;

use plansolve::backend::{Digest, SolveStatus};
use plansolve::errors::PlansolveError;
use plansolve::progress::{LogRecord, ProgressSink, Severity, log_solve_status};

type TestResult = Result<(), Box<dyn Error>>;

/// Feed `batches` through the forwarder and return what the sink saw.
async fn run_reporter(batches: Vec<SolveStatus>) -> Result<Vec<LogRecord>, PlansolveError> {
    let sink = RecordingSink::new();
    let (tx, rx) = mpsc::channel(8);

    let forwarder = tokio::spawn(log_solve_status(
        rx,
        Arc::new(sink.clone()) as Arc<dyn ProgressSink>,
    ));
    for batch in batches {
        tx.send(batch).await.unwrap();
    }
    drop(tx);

    with_timeout(forwarder).await.unwrap()?;
    Ok(sink.records())
}

#[tokio::test]
async fn vertex_announcement_is_one_debug_record_with_index_and_digest() -> TestResult {
    init_tracing();

    let records = run_reporter(vec![status(
        vec![VertexBuilder::new("sha256:aaa", "@app@ pull base image").started().build()],
        vec![],
    )])
    .await?;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.component, "app");
    assert_eq!(record.severity, Severity::Debug);
    assert_eq!(record.message, "pull base image");
    assert_eq!(record.index, Some(1));
    assert_eq!(record.digest, Some(Digest::new("sha256:aaa")));
    Ok(())
}

#[tokio::test]
async fn vertices_are_numbered_in_order_of_first_sight() -> TestResult {
    init_tracing();

    let records = run_reporter(vec![
        status(vec![VertexBuilder::new("d1", "@a@ one").build()], vec![]),
        status(
            vec![
                VertexBuilder::new("d1", "@a@ one").started().build(),
                VertexBuilder::new("d2", "@b@ two").build(),
            ],
            vec![],
        ),
    ])
    .await?;

    let indices: Vec<_> = records.iter().map(|r| (r.component.as_str(), r.index)).collect();
    assert_eq!(indices, vec![("a", Some(1)), ("b", Some(2))]);
    Ok(())
}

#[tokio::test]
async fn stream_one_is_info_and_stream_two_is_error() -> TestResult {
    init_tracing();

    let records = run_reporter(vec![status(
        vec![VertexBuilder::new("d1", "@web@ npm install").build()],
        vec![
            log_chunk("d1", 1, "added 12 packages\n"),
            log_chunk("d1", 2, "npm WARN deprecated\n"),
        ],
    )])
    .await?;

    let streamed: Vec<_> = records.iter().filter(|r| r.index.is_none()).collect();
    assert_eq!(streamed.len(), 2);

    assert_eq!(streamed[0].severity, Severity::Info);
    assert_eq!(streamed[0].component, "web");
    assert_eq!(streamed[0].message, "#1 added 12 packages");

    assert_eq!(streamed[1].severity, Severity::Error);
    assert_eq!(streamed[1].component, "web");
    assert_eq!(streamed[1].message, "#1 npm WARN deprecated");
    Ok(())
}

#[tokio::test]
async fn other_stream_indices_produce_no_record_and_no_error() -> TestResult {
    init_tracing();

    let records = run_reporter(vec![status(
        vec![VertexBuilder::new("d1", "@web@ step").build()],
        vec![log_chunk("d1", 3, "side channel\n"), log_chunk("d1", 0, "stdin?\n")],
    )])
    .await?;

    // Only the vertex announcement.
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].index, Some(1));
    Ok(())
}

#[tokio::test]
async fn completion_lines_are_debug_log_records() -> TestResult {
    init_tracing();

    let records = run_reporter(vec![status(
        vec![
            VertexBuilder::new("d1", "@a@ build").completed_after(1500).build(),
            VertexBuilder::new("d2", "@b@ fetch").cached().build(),
            VertexBuilder::new("d3", "@c@ test").error("exit code 1").build(),
        ],
        vec![],
    )])
    .await?;

    let lines: Vec<_> = records
        .iter()
        .filter(|r| r.index.is_none())
        .map(|r| (r.component.as_str(), r.severity, r.message.as_str()))
        .collect();

    assert_eq!(
        lines,
        vec![
            ("a", Severity::Debug, "#1 DONE 1.5s"),
            ("b", Severity::Debug, "#2 CACHED"),
            ("c", Severity::Debug, "#3 ERROR: exit code 1"),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn completion_is_reported_once_per_vertex() -> TestResult {
    init_tracing();

    let done = VertexBuilder::new("d1", "build").completed_after(100).build();
    let records = run_reporter(vec![
        status(vec![done.clone()], vec![]),
        status(vec![done], vec![]),
    ])
    .await?;

    assert_eq!(records.len(), 2, "one announcement and one DONE line: {records:?}");
    assert_eq!(records[1].component, "");
    Ok(())
}

#[tokio::test]
async fn finished_counters_are_logged() -> TestResult {
    init_tracing();

    let mut batch = status(vec![VertexBuilder::new("d1", "@img@ pull").build()], vec![]);
    batch.statuses.push(finished_counter("d1", "layer-1", 10, 10));

    let records = run_reporter(vec![batch]).await?;

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].message, "#1 layer-1 10/10");
    assert_eq!(records[1].component, "img");
    Ok(())
}

#[tokio::test]
async fn logs_for_unknown_vertices_are_skipped() -> TestResult {
    init_tracing();

    let records = run_reporter(vec![status(vec![], vec![log_chunk("ghost", 1, "boo\n")])]).await?;
    assert!(records.is_empty());
    Ok(())
}

#[tokio::test]
async fn sink_failure_stops_the_forwarder() -> TestResult {
    init_tracing();

    let sink = RecordingSink::failing_after(1);
    let (tx, rx) = mpsc::channel(8);
    let forwarder = tokio::spawn(log_solve_status(rx, Arc::new(sink.clone())));

    tx.send(status(
        vec![
            VertexBuilder::new("d1", "@a@ one").build(),
            VertexBuilder::new("d2", "@a@ two").build(),
        ],
        vec![],
    ))
    .await?;

    let result = with_timeout(forwarder).await?;
    match result {
        Err(PlansolveError::ProgressError(msg)) => assert!(msg.contains("after 1 records")),
        other => panic!("expected ProgressError, got {other:?}"),
    }
    assert_eq!(sink.records().len(), 1);
    Ok(())
}
