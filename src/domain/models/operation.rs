#[cfg(test)]
#[path = "operation_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationId(u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "op-{}", self.0);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationKind {
    FetchDocuments,
    UploadDocument { filename: String },
    DeleteDocument { id: String },
    SendMessage,
    LoadHistory { session_id: String },
}

/// Registry of the asynchronous operations a store is waiting on.
///
/// Ids grow monotonically per store, so they double as the generation tag
/// used to tell fresh results from stale ones. An operation that has been
/// superseded is dropped from the registry and its result is ignored when it
/// eventually arrives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Operations {
    last_issued: u64,
    pending: BTreeMap<OperationId, OperationKind>,
}

impl Operations {
    pub fn begin(&mut self, kind: OperationKind) -> OperationId {
        self.last_issued += 1;
        let id = OperationId(self.last_issued);
        self.pending.insert(id, kind);

        return id;
    }

    /// Removes a completed operation. Returns `None` when the operation was
    /// superseded while in flight, in which case its result must be dropped.
    pub fn finish(&mut self, id: OperationId) -> Option<OperationKind> {
        return self.pending.remove(&id);
    }

    pub fn supersede<F>(&mut self, mut predicate: F)
    where
        F: FnMut(OperationId, &OperationKind) -> bool,
    {
        self.pending.retain(|id, kind| return !predicate(*id, kind));
    }

    pub fn supersede_all(&mut self) {
        self.pending.clear();
    }

    pub fn last_issued(&self) -> Option<OperationId> {
        if self.last_issued == 0 {
            return None;
        }

        return Some(OperationId(self.last_issued));
    }

    pub fn is_pending(&self, id: OperationId) -> bool {
        return self.pending.contains_key(&id);
    }

    pub fn is_empty(&self) -> bool {
        return self.pending.is_empty();
    }

    pub fn len(&self) -> usize {
        return self.pending.len();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OperationId, &OperationKind)> {
        return self.pending.iter();
    }
}
