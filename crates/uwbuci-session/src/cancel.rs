use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag that stops a ranging loop between two `range_run` calls.
///
/// Clones observe the same flag, so one clone can be moved into a signal
/// handler while the loop holds another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_from_another_thread() {
        let token = CancelToken::new();
        let handle = token.clone();
        std::thread::spawn(move || handle.cancel())
            .join()
            .expect("cancel thread should finish");
        assert!(token.is_cancelled());
    }
}
