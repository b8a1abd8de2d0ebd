//! Sealed request queue
//!
//! Each target's requests are built up front into a fixed-capacity queue.
//! Once full the queue is sealed: it accepts no further writes, and workers
//! popping from it see `None` after the last item is taken.

use crate::config::TargetSpec;
use crate::request::pattern::UrlGenerator;
use crate::request::{build_request, BuildError, BuiltRequest};
use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::Notify;

/// Rejected write
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue is full")]
    Full,

    #[error("queue is sealed")]
    Sealed,
}

/// Fixed-capacity multi-consumer queue with an explicit end of input
pub struct SealedQueue<T> {
    items: ArrayQueue<T>,
    sealed: AtomicBool,
    notify: Notify,
}

impl<T> SealedQueue<T> {
    /// Create an empty queue
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: ArrayQueue::new(capacity.max(1)),
            sealed: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Append an item
    pub fn push(&self, item: T) -> Result<(), QueueError> {
        if self.is_sealed() {
            return Err(QueueError::Sealed);
        }
        self.items.push(item).map_err(|_| QueueError::Full)?;
        self.notify.notify_one();
        Ok(())
    }

    /// Forbid further writes and wake every waiting consumer
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Take the next item
    ///
    /// Waits while the queue is empty and unsealed. Returns `None` once the
    /// queue is sealed and drained.
    pub async fn pop(&self) -> Option<T> {
        loop {
            // Register before checking so a push or seal in between is not missed
            let notified = self.notify.notified();

            if let Some(item) = self.items.pop() {
                return Some(item);
            }
            if self.is_sealed() {
                // A push may have landed just before the seal
                return self.items.pop();
            }

            notified.await;
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }
}

/// Build and seal the request set of one target
///
/// Builds exactly `target.count` requests in order and stops at the first
/// failure.
pub fn build_target_queue(
    target: &TargetSpec,
    urls: &mut dyn UrlGenerator,
) -> Result<SealedQueue<BuiltRequest>, BuildError> {
    let queue = SealedQueue::new(target.count);

    for _ in 0..target.count {
        let request = build_request(target, urls)?;
        if let Err(e) = queue.push(request) {
            tracing::warn!("Dropping built request for {}: {}", target.url, e);
        }
    }

    queue.seal();
    Ok(queue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::pattern::LiteralUrlGenerator;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_push_past_capacity() {
        let queue = SealedQueue::new(2);
        assert!(queue.push(1).is_ok());
        assert!(queue.push(2).is_ok());
        assert_eq!(queue.push(3), Err(QueueError::Full));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.capacity(), 2);
    }

    #[test]
    fn test_push_after_seal() {
        let queue = SealedQueue::new(4);
        queue.push(1).unwrap();
        queue.seal();
        assert_eq!(queue.push(2), Err(QueueError::Sealed));
        assert!(queue.is_sealed());
    }

    #[tokio::test]
    async fn test_pop_drains_then_closes() {
        let queue = SealedQueue::new(3);
        for i in 0..3 {
            queue.push(i).unwrap();
        }
        queue.seal();

        assert_eq!(queue.pop().await, Some(0));
        assert_eq!(queue.pop().await, Some(1));
        assert_eq!(queue.pop().await, Some(2));
        assert_eq!(queue.pop().await, None);
        assert_eq!(queue.pop().await, None);
    }

    #[tokio::test]
    async fn test_pop_wakes_on_late_push() {
        let queue = Arc::new(SealedQueue::new(1));
        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push("late").unwrap();

        let got = tokio::time::timeout(Duration::from_secs(2), consumer)
            .await
            .expect("consumer not woken")
            .unwrap();
        assert_eq!(got, Some("late"));
    }

    #[tokio::test]
    async fn test_pop_wakes_on_seal() {
        let queue: Arc<SealedQueue<u32>> = Arc::new(SealedQueue::new(1));
        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move { queue.pop().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.seal();

        for consumer in consumers {
            let got = tokio::time::timeout(Duration::from_secs(2), consumer)
                .await
                .expect("consumer not woken")
                .unwrap();
            assert_eq!(got, None);
        }
    }

    #[test]
    fn test_build_target_queue() {
        let mut target = TargetSpec::new("http://localhost/q");
        target.count = 7;

        let queue = build_target_queue(&target, &mut LiteralUrlGenerator).unwrap();
        assert_eq!(queue.len(), 7);
        assert!(queue.is_sealed());
    }

    #[test]
    fn test_build_target_queue_aborts_on_failure() {
        let mut target = TargetSpec::new("http://localhost/q");
        target.method = "BAD METHOD".to_string();

        assert!(build_target_queue(&target, &mut LiteralUrlGenerator).is_err());
    }
}
