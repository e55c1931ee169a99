// src/engine/clean.rs

//! Normalization of backend failures before they reach the caller.

/// Fragments the backend wraps around every failure.
const NOISE: &[&str] = &[
    "failed to solve: ",
    "executor failed running ",
    "buildkit-runc did not terminate successfully",
];

/// gRPC status prefix, e.g. `rpc error: code = Unknown desc = `.
const RPC_PREFIX: &str = "rpc error: code = ";
const RPC_DESC: &str = " desc = ";

/// Render `err` with its cause chain and strip transport and runtime noise.
pub fn clean_solve_error(err: &anyhow::Error) -> String {
    let mut msg = format!("{err:#}");

    while let Some(start) = msg.find(RPC_PREFIX) {
        let Some(desc) = msg[start..].find(RPC_DESC) else {
            break;
        };
        msg.replace_range(start..start + desc + RPC_DESC.len(), "");
    }

    for noise in NOISE {
        msg = msg.replace(noise, "");
    }

    let msg = msg.trim().trim_end_matches(':').trim();
    if msg.is_empty() {
        "backend reported an empty error".to_string()
    } else {
        msg.to_string()
    }
}
