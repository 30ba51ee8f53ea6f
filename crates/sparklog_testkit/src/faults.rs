//! Fault injection for the storage layer.
//!
//! [`FailingBackend`] wraps another backend and fails reads according to a
//! shared [`FaultHandle`]. The handle stays with the test after the backend
//! has been moved into a [`LogReader`](sparklog_core::LogReader), so faults
//! can be armed mid-iteration.

use sparklog_storage::{StorageBackend, StorageError, StorageResult};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

const NEVER: u64 = u64::MAX;

#[derive(Debug)]
struct FaultPlan {
    /// Reads touching this offset or beyond fail.
    fail_from: AtomicU64,
    /// Reads numbered at or past this count fail.
    read_budget: AtomicU64,
    reads: AtomicUsize,
    injected: AtomicUsize,
}

/// Test-side control over a [`FailingBackend`].
#[derive(Debug, Clone)]
pub struct FaultHandle(Arc<FaultPlan>);

impl FaultHandle {
    /// Fails every read that touches `offset` or any later byte.
    pub fn fail_from(&self, offset: u64) {
        self.0.fail_from.store(offset, Ordering::SeqCst);
    }

    /// Lets `n` more reads succeed, then fails every read after them.
    pub fn fail_after_reads(&self, n: usize) {
        let budget = (self.reads() + n) as u64;
        self.0.read_budget.store(budget, Ordering::SeqCst);
    }

    /// Clears all armed faults.
    pub fn heal(&self) {
        self.0.fail_from.store(NEVER, Ordering::SeqCst);
        self.0.read_budget.store(NEVER, Ordering::SeqCst);
    }

    /// Reads attempted so far, failed ones included.
    pub fn reads(&self) -> usize {
        self.0.reads.load(Ordering::SeqCst)
    }

    /// Reads that were failed on purpose.
    pub fn injected(&self) -> usize {
        self.0.injected.load(Ordering::SeqCst)
    }
}

/// A backend whose reads fail on demand.
pub struct FailingBackend {
    inner: Box<dyn StorageBackend>,
    plan: Arc<FaultPlan>,
}

impl FailingBackend {
    /// Wraps `inner` with no faults armed.
    pub fn new(inner: Box<dyn StorageBackend>) -> (Self, FaultHandle) {
        let plan = Arc::new(FaultPlan {
            fail_from: AtomicU64::new(NEVER),
            read_budget: AtomicU64::new(NEVER),
            reads: AtomicUsize::new(0),
            injected: AtomicUsize::new(0),
        });
        let handle = FaultHandle(Arc::clone(&plan));
        (Self { inner, plan }, handle)
    }

    fn should_fail(&self, offset: u64, len: usize, read_no: usize) -> Option<String> {
        let fail_from = self.plan.fail_from.load(Ordering::SeqCst);
        let end = offset.saturating_add(len as u64);
        if len > 0 && end > fail_from {
            return Some(format!("injected fault reading [{offset}, {end})"));
        }
        if read_no as u64 >= self.plan.read_budget.load(Ordering::SeqCst) {
            return Some(format!("injected fault on read #{read_no}"));
        }
        None
    }
}

impl StorageBackend for FailingBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let read_no = self.plan.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.should_fail(offset, len, read_no) {
            self.plan.injected.fetch_add(1, Ordering::SeqCst);
            return Err(StorageError::Unavailable(reason));
        }
        self.inner.read_at(offset, len)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        self.inner.append(data)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.inner.flush()
    }

    fn size(&self) -> StorageResult<u64> {
        self.inner.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparklog_storage::InMemoryBackend;

    fn backend() -> (FailingBackend, FaultHandle) {
        FailingBackend::new(Box::new(InMemoryBackend::with_data(vec![7; 64])))
    }

    #[test]
    fn passes_through_when_unarmed() {
        let (backend, handle) = backend();
        assert_eq!(backend.read_at(0, 4).unwrap(), vec![7; 4]);
        assert_eq!(backend.size().unwrap(), 64);
        assert_eq!(handle.reads(), 1);
        assert_eq!(handle.injected(), 0);
    }

    #[test]
    fn fails_reads_past_offset() {
        let (backend, handle) = backend();
        handle.fail_from(32);

        assert!(backend.read_at(0, 32).is_ok());
        assert!(matches!(
            backend.read_at(30, 4),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(handle.injected(), 1);

        handle.heal();
        assert!(backend.read_at(30, 4).is_ok());
    }

    #[test]
    fn fails_after_read_budget() {
        let (backend, handle) = backend();
        backend.read_at(0, 1).unwrap();
        handle.fail_after_reads(2);

        assert!(backend.read_at(0, 1).is_ok());
        assert!(backend.read_at(0, 1).is_ok());
        assert!(backend.read_at(0, 1).is_err());
        assert!(backend.read_at(0, 1).is_err());
        assert_eq!(handle.injected(), 2);
    }
}
