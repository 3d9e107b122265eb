use std::sync::atomic::{AtomicUsize, Ordering};

// Listeners are compared by identity across every editor's bus, so ids come
// from one process-wide counter rather than a per-bus sequence
static NEXT_LISTENER_ID: AtomicUsize = AtomicUsize::new(1);

pub fn generate_id() -> usize {
    NEXT_LISTENER_ID.fetch_add(1, Ordering::SeqCst)
}
