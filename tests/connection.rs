// tests/connection.rs

mod common;
use crate::common::fake_backend::{FakeBackend, FakeConnector};
use crate::common::{init_tracing, with_timeout};

use std::path::PathBuf;

use plansolve::connection::{Connection, DEFAULT_HOST, Endpoint, resolve_host_with};
use plansolve::errors::PlansolveError;

#[test]
fn explicit_host_wins() {
    assert_eq!(
        resolve_host_with(Some("tcp://a:1"), Some("tcp://b:2")),
        "tcp://a:1"
    );
}

#[test]
fn env_host_is_used_without_explicit() {
    assert_eq!(resolve_host_with(None, Some("tcp://b:2")), "tcp://b:2");
}

#[test]
fn empty_values_count_as_unset() {
    assert_eq!(resolve_host_with(Some(""), Some("tcp://b:2")), "tcp://b:2");
    assert_eq!(resolve_host_with(Some("  "), Some("")), DEFAULT_HOST);
    assert_eq!(resolve_host_with(None, None), DEFAULT_HOST);
}

#[test]
fn every_scheme_parses() {
    assert_eq!(
        Endpoint::parse("docker-container://buildkitd").unwrap(),
        Endpoint::DockerContainer {
            container: "buildkitd".to_string()
        }
    );
    assert_eq!(
        Endpoint::parse("podman-container://bk").unwrap(),
        Endpoint::PodmanContainer {
            container: "bk".to_string()
        }
    );
    assert_eq!(
        Endpoint::parse("unix:///run/buildkit/buildkitd.sock").unwrap(),
        Endpoint::Unix(PathBuf::from("/run/buildkit/buildkitd.sock"))
    );
    assert_eq!(
        "tcp://10.0.0.5:1234".parse::<Endpoint>().unwrap(),
        Endpoint::Tcp {
            host: "10.0.0.5".to_string(),
            port: 1234
        }
    );
}

#[test]
fn display_renders_the_parsed_form() {
    for host in [
        "docker-container://buildkitd",
        "podman-container://bk",
        "unix:///run/buildkit/buildkitd.sock",
        "tcp://builder.local:1234",
    ] {
        assert_eq!(Endpoint::parse(host).unwrap().to_string(), host);
    }
}

#[test]
fn malformed_hosts_are_connection_errors() {
    let cases = [
        ("buildkitd", "missing scheme"),
        ("tcp://", "missing address"),
        ("ssh://box", "unsupported scheme"),
        ("unix://relative.sock", "must be absolute"),
        ("tcp://builder.local", "host:port"),
        ("tcp://:1234", "empty host"),
        ("tcp://builder.local:http", "invalid port"),
    ];

    for (host, expected) in cases {
        match Endpoint::parse(host) {
            Err(PlansolveError::ConnectionError(msg)) => {
                assert!(msg.contains(expected), "{host}: {msg}")
            }
            other => panic!("{host}: expected ConnectionError, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn open_connects_to_the_explicit_endpoint() {
    init_tracing();

    let connector = FakeConnector::new(FakeBackend::default());
    let conn = with_timeout(Connection::open(&connector, Some("podman-container://bk")))
        .await
        .expect("connect");

    let expected = Endpoint::PodmanContainer {
        container: "bk".to_string(),
    };
    assert_eq!(conn.endpoint(), &expected);
    assert_eq!(connector.endpoints(), vec![expected]);
}

#[tokio::test]
async fn open_rejects_bad_host_without_connecting() {
    init_tracing();

    let connector = FakeConnector::new(FakeBackend::default());
    let result = Connection::open(&connector, Some("nope")).await;

    assert!(matches!(result, Err(PlansolveError::ConnectionError(_))));
    assert!(connector.endpoints().is_empty());
}

#[tokio::test]
async fn connector_failure_names_the_endpoint() {
    init_tracing();

    let connector = FakeConnector::failing("dial unix: no such file");
    let result = Connection::open(&connector, Some("unix:///run/bk.sock")).await;

    match result {
        Err(PlansolveError::ConnectionError(msg)) => {
            assert!(msg.contains("unix:///run/bk.sock"), "{msg}");
            assert!(msg.contains("no such file"), "{msg}");
        }
        other => panic!("expected ConnectionError, got {other:?}"),
    }
}
