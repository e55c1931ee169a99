// tests/output_collector.rs

mod common;
use crate::common::builders::TarBuilder;
use crate::common::{collect_bytes, init_tracing};

use std::error::Error;

use serde_json::json;

use plansolve::errors::PlansolveError;
use plansolve::output::{JsonDecoder, TomlDecoder};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn empty_stream_yields_empty_struct() -> TestResult {
    init_tracing();

    let value = collect_bytes(&[], &JsonDecoder)?;
    assert!(value.is_empty());
    Ok(())
}

#[test]
fn archive_without_recognized_files_yields_empty_struct() -> TestResult {
    init_tracing();

    let archive = TarBuilder::new()
        .file("README.md", "# hello")
        .file("config.yaml", "a: 1")
        .dir("out")
        .build();

    let value = collect_bytes(&archive, &JsonDecoder)?;
    assert!(value.is_empty());
    Ok(())
}

#[test]
fn single_file_is_its_own_value() -> TestResult {
    init_tracing();

    let archive = TarBuilder::new()
        .file("out/values.json", r#"{"app":{"replicas":3,"tags":["a","b"]}}"#)
        .build();

    let value = collect_bytes(&archive, &JsonDecoder)?;
    assert_eq!(
        value.as_json(),
        &json!({"app": {"replicas": 3, "tags": ["a", "b"]}})
    );
    Ok(())
}

#[test]
fn disjoint_files_are_merged() -> TestResult {
    init_tracing();

    let archive = TarBuilder::new()
        .file("a.json", r#"{"app":{"name":"web"}}"#)
        .file("notes.txt", "ignored")
        .file("b.json", r#"{"app":{"port":8080},"db":{"name":"pg"}}"#)
        .build();

    let value = collect_bytes(&archive, &JsonDecoder)?;
    assert_eq!(
        value.as_json(),
        &json!({"app": {"name": "web", "port": 8080}, "db": {"name": "pg"}})
    );
    assert_eq!(value.lookup("app.port"), Some(&json!(8080)));
    Ok(())
}

#[test]
fn entry_order_does_not_change_the_result() -> TestResult {
    init_tracing();

    let a = r#"{"x":{"a":1},"shared":"same"}"#;
    let b = r#"{"x":{"b":2},"shared":"same"}"#;

    let forward = TarBuilder::new().file("a.json", a).file("b.json", b).build();
    let backward = TarBuilder::new().file("b.json", b).file("a.json", a).build();

    let forward = collect_bytes(&forward, &JsonDecoder)?;
    let backward = collect_bytes(&backward, &JsonDecoder)?;
    assert_eq!(forward, backward);
    Ok(())
}

#[test]
fn conflicting_files_fail_naming_the_second_file() -> TestResult {
    init_tracing();

    let archive = TarBuilder::new()
        .file("first.json", r#"{"app":{"replicas":3}}"#)
        .file("second.json", r#"{"app":{"replicas":4}}"#)
        .build();

    let result = collect_bytes(&archive, &JsonDecoder);
    match result {
        Err(PlansolveError::MergeError { path, message }) => {
            assert_eq!(path, "second.json");
            assert!(message.contains("app.replicas"), "message: {message}");
        }
        other => panic!("expected MergeError, got {other:?}"),
    }
    Ok(())
}

#[test]
fn invalid_json_is_a_decode_error() -> TestResult {
    init_tracing();

    let archive = TarBuilder::new().file("broken.json", "{not json").build();

    match collect_bytes(&archive, &JsonDecoder) {
        Err(PlansolveError::DecodeError { path, .. }) => assert_eq!(path, "broken.json"),
        other => panic!("expected DecodeError, got {other:?}"),
    }
    Ok(())
}

#[test]
fn non_struct_top_level_is_a_decode_error() -> TestResult {
    init_tracing();

    let archive = TarBuilder::new().file("list.json", "[1, 2, 3]").build();

    match collect_bytes(&archive, &JsonDecoder) {
        Err(PlansolveError::DecodeError { path, message }) => {
            assert_eq!(path, "list.json");
            assert!(message.contains("struct"));
        }
        other => panic!("expected DecodeError, got {other:?}"),
    }
    Ok(())
}

#[test]
fn garbage_stream_is_a_stream_read_error() -> TestResult {
    init_tracing();

    let garbage = vec![0xFF_u8; 1024];

    match collect_bytes(&garbage, &JsonDecoder) {
        Err(PlansolveError::StreamReadError { .. }) => {}
        other => panic!("expected StreamReadError, got {other:?}"),
    }
    Ok(())
}

#[test]
fn header_cut_short_is_a_stream_read_error() -> TestResult {
    init_tracing();

    let archive = TarBuilder::new().file("a.json", r#"{"a":1}"#).build();
    let cut = &archive[..300];

    match collect_bytes(cut, &JsonDecoder) {
        Err(PlansolveError::StreamReadError { what, .. }) => assert_eq!(what, "next entry"),
        other => panic!("expected StreamReadError, got {other:?}"),
    }
    Ok(())
}

#[test]
fn toml_decoder_reads_toml_files_only() -> TestResult {
    init_tracing();

    let archive = TarBuilder::new()
        .file("values.json", r#"{"ignored":true}"#)
        .file(
            "values.toml",
            "[app]\nname = \"web\"\nports = [80, 443]\n",
        )
        .build();

    let value = collect_bytes(&archive, &TomlDecoder)?;
    assert_eq!(
        value.as_json(),
        &json!({"app": {"name": "web", "ports": [80, 443]}})
    );
    Ok(())
}

#[test]
fn bytes_after_end_of_archive_are_drained() -> TestResult {
    init_tracing();

    let mut archive = TarBuilder::new().file("a.json", r#"{"a":1}"#).build();
    archive.extend_from_slice(&[0u8; 4096]);

    let value = collect_bytes(&archive, &JsonDecoder)?;
    assert_eq!(value.as_json(), &json!({"a": 1}));
    Ok(())
}

#[test]
fn oversized_header_is_a_stream_read_error() -> TestResult {
    init_tracing();

    let mut header = tar::Header::new_gnu();
    header.set_path("big.json")?;
    header.set_size(1 << 46);
    header.set_mode(0o644);
    header.set_cksum();

    let mut stream = header.as_bytes().to_vec();
    stream.extend_from_slice(b"{}");

    match collect_bytes(&stream, &JsonDecoder) {
        Err(PlansolveError::StreamReadError { what, source }) => {
            assert_eq!(what, "big.json");
            assert_eq!(source.kind(), std::io::ErrorKind::UnexpectedEof);
        }
        other => panic!("expected StreamReadError, got {other:?}"),
    }
    Ok(())
}

#[test]
fn entry_cut_short_is_a_stream_read_error_not_a_decode_error() -> TestResult {
    init_tracing();

    let body = format!(r#"{{"pad":"{}"}}"#, "x".repeat(3990));
    let archive = TarBuilder::new().file("a.json", body).build();
    let cut = &archive[..1500];

    match collect_bytes(cut, &JsonDecoder) {
        Err(PlansolveError::StreamReadError { what, source }) => {
            assert_eq!(what, "a.json");
            assert_eq!(source.kind(), std::io::ErrorKind::UnexpectedEof);
        }
        other => panic!("expected StreamReadError, got {other:?}"),
    }
    Ok(())
}
