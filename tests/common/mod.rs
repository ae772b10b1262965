#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

use jjdag::backend::{Backend, Worker};
use jjdag::error::BackendError;
use jjdag::graph::DagModel;
use jjdag::model::{
    ChangeId, CommitHash, Node, OperationId, OperationLogEntry, OperationResult, ParentRef,
    PendingOperation, Snapshot,
};
use jjdag::session::{Session, SessionConfig};

/// Builds node lists; timestamps follow insertion order.
#[derive(Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, change: &str, parents: &[&str]) -> Self {
        let mut node = Node::new(ChangeId::new(change), CommitHash::new(format!("{change}0")));
        node.parents = parents
            .iter()
            .map(|p| ParentRef::Visible(ChangeId::new(*p)))
            .collect();
        node.description = format!("change {change}");
        node.author = "dev@example.com".to_string();
        node.timestamp = self.nodes.len() as i64 + 1;
        self.nodes.push(node);
        self
    }

    pub fn working_copy(mut self, change: &str) -> Self {
        for n in &mut self.nodes {
            n.is_working_copy = n.change_id.as_str() == change;
        }
        self
    }

    pub fn immutable(mut self, change: &str) -> Self {
        if let Some(n) = self.nodes.iter_mut().find(|n| n.change_id.as_str() == change) {
            n.is_immutable = true;
        }
        self
    }

    pub fn bookmark(mut self, change: &str, name: &str) -> Self {
        if let Some(n) = self.nodes.iter_mut().find(|n| n.change_id.as_str() == change) {
            n.bookmarks.insert(name.to_string());
        }
        self
    }

    pub fn nodes(self) -> Vec<Node> {
        self.nodes
    }

    pub fn model(self, seq: u64) -> Result<DagModel> {
        let snap = Snapshot::new(seq, "all()", self.nodes, operations(2));
        DagModel::build(Arc::new(snap)).context("build model")
    }
}

pub fn id(s: &str) -> ChangeId {
    ChangeId::new(s)
}

/// Operation log with `n` entries, the oldest being the root operation.
pub fn operations(n: usize) -> Vec<OperationLogEntry> {
    (0..n)
        .map(|i| OperationLogEntry {
            id: OperationId(if i + 1 == n {
                "000000000000".to_string()
            } else {
                format!("op{:010}", n - i)
            }),
            description: format!("op {}", n - i),
            time: String::new(),
        })
        .collect()
}

type Handler = Box<dyn Fn(&PendingOperation, &mut Vec<Node>) -> OperationResult + Send + Sync>;

struct State {
    nodes: Vec<Node>,
    operations: Vec<OperationLogEntry>,
    submitted: Vec<PendingOperation>,
    fail_next_fetch: Option<String>,
}

/// In-memory repository. Operations are applied by a test-supplied handler
/// that edits the node list.
pub struct ScriptedBackend {
    state: Mutex<State>,
    handler: Handler,
}

impl ScriptedBackend {
    pub fn new(nodes: Vec<Node>) -> Arc<Self> {
        Self::with_handler(nodes, |_, _| OperationResult::Applied { operation: None })
    }

    pub fn with_handler(
        nodes: Vec<Node>,
        handler: impl Fn(&PendingOperation, &mut Vec<Node>) -> OperationResult
        + Send
        + Sync
        + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                nodes,
                operations: operations(2),
                submitted: Vec::new(),
                fail_next_fetch: None,
            }),
            handler: Box::new(handler),
        })
    }

    /// Simulates a change made outside the viewer.
    pub fn set_nodes(&self, nodes: Vec<Node>) {
        self.state.lock().unwrap().nodes = nodes;
    }

    pub fn fail_next_fetch(&self, stderr: &str) {
        self.state.lock().unwrap().fail_next_fetch = Some(stderr.to_string());
    }

    pub fn submitted(&self) -> Vec<PendingOperation> {
        self.state.lock().unwrap().submitted.clone()
    }
}

impl Backend for ScriptedBackend {
    fn fetch_log(&self, _revset: &str) -> Result<Vec<Node>, BackendError> {
        let mut state = self.state.lock().unwrap();
        if let Some(stderr) = state.fail_next_fetch.take() {
            return Err(BackendError::Failed { stderr });
        }
        Ok(state.nodes.clone())
    }

    fn fetch_operation_log(&self) -> Result<Vec<OperationLogEntry>, BackendError> {
        Ok(self.state.lock().unwrap().operations.clone())
    }

    fn submit(&self, op: &PendingOperation) -> Result<OperationResult, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.submitted.push(op.clone());
        let result = (self.handler)(op, &mut state.nodes);
        if let OperationResult::Applied { .. } = result {
            let n = state.operations.len();
            let id = OperationId(format!("op{:010}", n + 1));
            state.operations.insert(
                0,
                OperationLogEntry {
                    id: id.clone(),
                    description: op.kind.label().to_string(),
                    time: String::new(),
                },
            );
            return Ok(OperationResult::Applied {
                operation: Some(id),
            });
        }
        Ok(result)
    }
}

pub fn session(revset: &str) -> Session {
    Session::new(SessionConfig {
        revset: revset.to_string(),
        refresh_interval: None,
        ignore_immutable: false,
    })
}

/// Forwards requests between session and worker until both are idle.
pub fn settle(session: &mut Session, worker: &mut Worker) -> Result<()> {
    while session.fetching() || session.busy() {
        let event = worker
            .recv_blocking()
            .context("worker stopped while requests were outstanding")?;
        let next = session.handle(event);
        worker.send_all(next);
    }
    Ok(())
}

/// A session that has applied the backend's first snapshot.
pub fn started(backend: Arc<ScriptedBackend>) -> Result<(Session, Worker)> {
    let mut worker = Worker::new(backend)?;
    let mut session = session("all()");
    worker.send_all(session.request_fetch());
    settle(&mut session, &mut worker)?;
    Ok((session, worker))
}
