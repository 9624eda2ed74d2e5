use std::sync::atomic::{AtomicBool, Ordering};

/// Single-slot lease guarding mutating requests against double invocation.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    busy: AtomicBool,
}

/// Held while a request runs; releases the slot on drop.
#[derive(Debug)]
pub(crate) struct Lease<'a> {
    busy: &'a AtomicBool,
}

impl InFlight {
    /// Atomically acquires the lease.
    /// Returns `None` if another request holds it.
    pub(crate) fn try_acquire(&self) -> Option<Lease<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Lease { busy: &self.busy })
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
