// src/engine/group.rs

//! Cancel-on-first-error task group.
//!
//! Tasks are spawned on a `JoinSet`. [`TaskGroup::wait`] awaits every task
//! and returns the group's failure, if any. The failure belongs to the first
//! task that claims it, either itself through its [`TaskScope`] or when
//! `wait` sees its error. Claiming cancels the group's token. Errors from
//! other tasks after that are fallout: they are logged and dropped, no
//! matter in which order the tasks finish.
//!
//! Tasks opt into cancellation by watching [`TaskGroup::token`]; tasks that
//! do not watch it must be unblocked some other way, e.g. by a channel or
//! pipe closing. Dropping the group aborts whatever is left.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, OnceLock};

use tokio::task::{Id, JoinSet};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::debug;

use crate::errors::{PlansolveError, Result};

/// A task's handle on its group.
///
/// A task that is about to make other tasks fail (e.g. by closing a pipe
/// they read) claims its own error first with [`TaskScope::fail`], so their
/// errors count as fallout.
#[derive(Debug, Clone)]
pub struct TaskScope {
    name: &'static str,
    cancel: CancellationToken,
    failed_task: Arc<OnceLock<&'static str>>,
}

impl TaskScope {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Claim `err` as the group's failure and cancel the group.
    ///
    /// Returns `err` if this task is the first to fail (or already owns the
    /// failure), and `Cancelled` otherwise. `Cancelled` itself never claims.
    pub fn fail(&self, err: PlansolveError) -> PlansolveError {
        if matches!(err, PlansolveError::Cancelled) {
            return err;
        }

        let owner = *self.failed_task.get_or_init(|| self.name);
        if owner == self.name {
            self.cancel.cancel();
            err
        } else {
            debug!(task = self.name, failed_task = owner, error = %err, "error after group failure; dropping");
            PlansolveError::Cancelled
        }
    }
}

/// Task names must be unique within a group.
pub struct TaskGroup {
    tasks: JoinSet<Result<()>>,
    names: HashMap<Id, &'static str>,
    cancel: CancellationToken,
    failed_task: Arc<OnceLock<&'static str>>,
}

impl TaskGroup {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
            names: HashMap::new(),
            cancel: CancellationToken::new(),
            failed_task: Arc::new(OnceLock::new()),
        }
    }

    /// Token cancelled when the group fails.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn spawn<F>(&mut self, name: &'static str, task: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let handle = self.tasks.spawn(task);
        self.names.insert(handle.id(), name);
    }

    /// Spawn a task that gets a [`TaskScope`] to claim failures early.
    pub fn spawn_scoped<F, Fut>(&mut self, name: &'static str, task: F)
    where
        F: FnOnce(TaskScope) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let scope = self.scope(name);
        self.spawn(name, task(scope));
    }

    fn scope(&self, name: &'static str) -> TaskScope {
        TaskScope {
            name,
            cancel: self.cancel.clone(),
            failed_task: Arc::clone(&self.failed_task),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every task and return the group's failure, if any.
    ///
    /// If every failing task only reported `Cancelled`, that is returned.
    pub async fn wait(mut self) -> Result<()> {
        let mut first_error: Option<PlansolveError> = None;
        let mut cancelled = false;

        while let Some(joined) = self.tasks.join_next_with_id().await {
            let (name, result) = match joined {
                Ok((id, result)) => (self.task_name(id), result),
                Err(join_err) => {
                    let name = self.task_name(join_err.id());
                    let err = PlansolveError::TaskAborted {
                        task: name,
                        message: join_err.to_string(),
                    };
                    (name, Err(err))
                }
            };

            match result.map_err(|err| self.scope(name).fail(err)) {
                Ok(()) => debug!(task = name, "group task finished"),
                Err(PlansolveError::Cancelled) => {
                    debug!(task = name, "group task cancelled");
                    cancelled = true;
                }
                Err(err) => {
                    debug!(task = name, error = %err, "group task failed; group cancelled");
                    first_error = Some(err);
                }
            }
        }

        match (first_error, cancelled) {
            (Some(err), _) => Err(err),
            (None, true) => Err(PlansolveError::Cancelled),
            (None, false) => Ok(()),
        }
    }

    fn task_name(&self, id: Id) -> &'static str {
        self.names.get(&id).copied().unwrap_or("unknown")
    }
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskGroup {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
