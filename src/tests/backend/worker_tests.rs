use super::*;
use crate::model::{Node, OperationKind, OperationLogEntry};
use crate::tests_support::GraphBuilder;

struct Canned {
    nodes: Vec<Node>,
}

impl Backend for Canned {
    fn fetch_log(&self, _revset: &str) -> Result<Vec<Node>, BackendError> {
        Ok(self.nodes.clone())
    }

    fn fetch_operation_log(&self) -> Result<Vec<OperationLogEntry>, BackendError> {
        Ok(Vec::new())
    }

    fn submit(&self, op: &PendingOperation) -> Result<OperationResult, BackendError> {
        if op.id == 13 {
            panic!("unlucky operation");
        }
        Ok(OperationResult::Rejected {
            reason: format!("refused {}", op.id),
        })
    }
}

fn worker() -> Worker {
    let snap = GraphBuilder::new().add("a", &[]).add("b", &["a"]).snapshot(1);
    let backend = Canned {
        nodes: snap.nodes().to_vec(),
    };
    Worker::new(Arc::new(backend)).unwrap()
}

fn undo(id: u64) -> PendingOperation {
    PendingOperation {
        id,
        kind: OperationKind::Undo,
        targets: Vec::new(),
        revisions: Vec::new(),
        destination_revision: None,
        ignore_immutable: false,
    }
}

#[test]
fn fetch_comes_back_with_its_sequence_number() {
    let mut w = worker();
    w.send(Request::Fetch {
        seq: 7,
        revset: "all()".into(),
    });
    match w.recv_blocking() {
        Some(BackendEvent::Snapshot { seq, result }) => {
            assert_eq!(seq, 7);
            let snap = result.unwrap();
            assert_eq!(snap.seq(), 7);
            assert_eq!(snap.revset(), "all()");
            assert_eq!(snap.len(), 2);
        }
        other => panic!("expected a snapshot, got {other:?}"),
    }
}

#[test]
fn submit_result_is_delivered() {
    let mut w = worker();
    w.send(Request::Submit(undo(3)));
    match w.recv_blocking() {
        Some(BackendEvent::Operation { id, result }) => {
            assert_eq!(id, 3);
            assert_eq!(
                result.unwrap(),
                OperationResult::Rejected {
                    reason: "refused 3".into()
                }
            );
        }
        other => panic!("expected an operation result, got {other:?}"),
    }
}

#[test]
fn panicking_backend_reports_disconnected() {
    let mut w = worker();
    w.send(Request::Submit(undo(13)));
    match w.recv_blocking() {
        Some(BackendEvent::Operation { id, result }) => {
            assert_eq!(id, 13);
            assert!(matches!(result, Err(BackendError::Disconnected)));
        }
        other => panic!("expected an operation result, got {other:?}"),
    }
}

#[test]
fn try_recv_is_empty_before_anything_is_sent() {
    let mut w = worker();
    assert!(w.try_recv().is_none());
}
