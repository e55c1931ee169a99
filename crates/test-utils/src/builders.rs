#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use anyhow::anyhow;
use plansolve::backend::{
    BoxFuture, Digest, Directory, SolveStatus, Vertex, VertexLog, VertexStatus,
};
use plansolve::config::{ClientSection, ConfigFile, LoggingSection, OutputSection, RawConfigFile};
use plansolve::plan::{Plan, Solver};
use plansolve::types::SourceFormat;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                client: ClientSection::default(),
                output: OutputSection::default(),
                logging: LoggingSection::default(),
            },
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.config.client.host = Some(host.to_string());
        self
    }

    pub fn event_buffer(mut self, n: usize) -> Self {
        self.config.client.event_buffer = n;
        self
    }

    pub fn pipe_capacity(mut self, n: usize) -> Self {
        self.config.client.pipe_capacity = n;
        self
    }

    pub fn format(mut self, format: SourceFormat) -> Self {
        self.config.output.format = format;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for in-memory tar archives.
#[derive(Default)]
pub struct TarBuilder {
    entries: Vec<(String, Option<Vec<u8>>)>,
}

impl TarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.entries.push((path.to_string(), Some(contents.into())));
        self
    }

    pub fn dir(mut self, path: &str) -> Self {
        self.entries.push((path.to_string(), None));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, contents) in self.entries {
            match contents {
                Some(data) => append_file(&mut builder, &path, &data).unwrap(),
                None => {
                    let mut header = tar::Header::new_gnu();
                    header.set_entry_type(tar::EntryType::Directory);
                    header.set_size(0);
                    header.set_mode(0o755);
                    header.set_cksum();
                    builder
                        .append_data(&mut header, &path, io::empty())
                        .unwrap();
                }
            }
        }
        builder.into_inner().unwrap()
    }
}

/// Encode a virtual directory as a tar archive, the way the fake backend
/// exports build results.
pub fn encode_directory(directory: &Directory) -> io::Result<Vec<u8>> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, contents) in directory.files() {
        append_file(&mut builder, path, contents)?;
    }
    builder.into_inner()
}

fn append_file(builder: &mut tar::Builder<Vec<u8>>, path: &str, data: &[u8]) -> io::Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, path, data)
}

/// Stage of plan evaluation, used to record calls and inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStage {
    Update,
    Compute,
    Export,
}

/// A plan whose overlay is a fixed set of files.
#[derive(Debug, Clone, Default)]
pub struct StaticPlan {
    files: Vec<(String, Vec<u8>)>,
    local_dirs: BTreeMap<String, PathBuf>,
    fail_at: Option<PlanStage>,
    stages: Arc<Mutex<Vec<PlanStage>>>,
}

impl StaticPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.files.push((path.to_string(), contents.into()));
        self
    }

    pub fn with_local_dir(mut self, label: &str, path: impl Into<PathBuf>) -> Self {
        self.local_dirs.insert(label.to_string(), path.into());
        self
    }

    pub fn failing_at(mut self, stage: PlanStage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    /// Stages that ran, in order.
    pub fn stages(&self) -> Vec<PlanStage> {
        self.stages.lock().unwrap().clone()
    }

    fn enter(&self, stage: PlanStage) -> anyhow::Result<()> {
        self.stages.lock().unwrap().push(stage);
        if self.fail_at == Some(stage) {
            return Err(anyhow!("plan stage {:?} failed", stage));
        }
        Ok(())
    }
}

impl Plan for StaticPlan {
    fn local_dirs(&self) -> BTreeMap<String, PathBuf> {
        self.local_dirs.clone()
    }

    fn update<'a>(&'a self, _solver: &'a Solver) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move { self.enter(PlanStage::Update) })
    }

    fn compute_outputs<'a>(&'a self, _solver: &'a Solver) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move { self.enter(PlanStage::Compute) })
    }

    fn export_overlay(&self, scratch: Directory) -> anyhow::Result<Directory> {
        self.enter(PlanStage::Export)?;
        let mut dir = scratch;
        for (path, contents) in &self.files {
            dir.insert(path.clone(), contents.clone());
        }
        Ok(dir)
    }
}

/// Builder for `Vertex` progress entries.
pub struct VertexBuilder {
    vertex: Vertex,
}

impl VertexBuilder {
    pub fn new(digest: &str, name: &str) -> Self {
        Self {
            vertex: Vertex::new(digest, name),
        }
    }

    pub fn started(mut self) -> Self {
        self.vertex.started = Some(SystemTime::UNIX_EPOCH);
        self
    }

    /// Mark completed `millis` after start.
    pub fn completed_after(mut self, millis: u64) -> Self {
        let started = SystemTime::UNIX_EPOCH;
        self.vertex.started = Some(started);
        self.vertex.completed = Some(started + Duration::from_millis(millis));
        self
    }

    pub fn cached(mut self) -> Self {
        self.vertex.cached = true;
        self.vertex.completed = Some(SystemTime::UNIX_EPOCH);
        self
    }

    pub fn error(mut self, msg: &str) -> Self {
        self.vertex.error = Some(msg.to_string());
        self.vertex.completed = Some(SystemTime::UNIX_EPOCH);
        self
    }

    pub fn build(self) -> Vertex {
        self.vertex
    }
}

/// A log chunk written by `digest` on `stream`.
pub fn log_chunk(digest: &str, stream: u32, data: &str) -> VertexLog {
    VertexLog {
        vertex: Digest::new(digest),
        stream,
        data: data.as_bytes().to_vec(),
        timestamp: None,
    }
}

/// A finished progress counter for `digest`.
pub fn finished_counter(digest: &str, id: &str, current: u64, total: u64) -> VertexStatus {
    VertexStatus {
        id: id.to_string(),
        vertex: Digest::new(digest),
        name: id.to_string(),
        current,
        total,
        completed: Some(SystemTime::UNIX_EPOCH),
    }
}

/// One status batch.
pub fn status(vertexes: Vec<Vertex>, logs: Vec<VertexLog>) -> SolveStatus {
    SolveStatus {
        vertexes,
        statuses: Vec::new(),
        logs,
    }
}
