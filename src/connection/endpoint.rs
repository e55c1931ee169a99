// src/connection/endpoint.rs

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::{PlansolveError, Result};

/// Address of a backend, parsed from `scheme://address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Backend running inside a named docker container.
    DockerContainer { container: String },
    /// Backend running inside a named podman container.
    PodmanContainer { container: String },
    /// Unix domain socket.
    Unix(PathBuf),
    /// Plain TCP.
    Tcp { host: String, port: u16 },
}

impl Endpoint {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (scheme, address) = s.split_once("://").ok_or_else(|| {
            PlansolveError::ConnectionError(format!("'{s}': missing scheme (expected scheme://address)"))
        })?;

        if address.is_empty() {
            return Err(PlansolveError::ConnectionError(format!(
                "'{s}': missing address after scheme"
            )));
        }

        match scheme {
            "docker-container" => Ok(Endpoint::DockerContainer {
                container: address.to_string(),
            }),
            "podman-container" => Ok(Endpoint::PodmanContainer {
                container: address.to_string(),
            }),
            "unix" => {
                let path = PathBuf::from(address);
                if !path.is_absolute() {
                    return Err(PlansolveError::ConnectionError(format!(
                        "'{s}': unix socket path must be absolute"
                    )));
                }
                Ok(Endpoint::Unix(path))
            }
            "tcp" => parse_tcp(s, address),
            other => Err(PlansolveError::ConnectionError(format!(
                "'{s}': unsupported scheme '{other}'"
            ))),
        }
    }
}

fn parse_tcp(full: &str, address: &str) -> Result<Endpoint> {
    let (host, port) = address.rsplit_once(':').ok_or_else(|| {
        PlansolveError::ConnectionError(format!("'{full}': tcp address needs host:port"))
    })?;

    if host.is_empty() {
        return Err(PlansolveError::ConnectionError(format!(
            "'{full}': tcp address has an empty host"
        )));
    }

    let port = port.parse::<u16>().map_err(|e| {
        PlansolveError::ConnectionError(format!("'{full}': invalid port '{port}': {e}"))
    })?;

    Ok(Endpoint::Tcp {
        host: host.to_string(),
        port,
    })
}

impl FromStr for Endpoint {
    type Err = PlansolveError;

    fn from_str(s: &str) -> Result<Self> {
        Endpoint::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::DockerContainer { container } => write!(f, "docker-container://{container}"),
            Endpoint::PodmanContainer { container } => write!(f, "podman-container://{container}"),
            Endpoint::Unix(path) => write!(f, "unix://{}", path.display()),
            Endpoint::Tcp { host, port } => write!(f, "tcp://{host}:{port}"),
        }
    }
}
