//! Request Coalescer Module
//!
//! Collapses concurrent work for the same key into a single execution.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::error::{CacheError, Result};

/// Completion slot shared by every caller of one execution.
type Slot<V> = Option<Result<V>>;

type Calls<V> = Arc<Mutex<HashMap<String, watch::Receiver<Slot<V>>>>>;

// == Coalescer ==
/// Runs at most one unit of work per key at a time.
///
/// The first caller for a key starts the work on its own task; every caller
/// that arrives while it is in flight, the first one included, waits for
/// that task and receives a clone of its result. A caller that gives up
/// waiting does not stop the work. Once the work finishes, the in-flight
/// record is dropped, so the next caller starts a fresh execution. Nothing
/// is cached here.
#[derive(Debug)]
pub struct Coalescer<V> {
    calls: Calls<V>,
}

impl<V> Default for Coalescer<V> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// Removes the in-flight record when the spawned work ends, even by panic.
struct InFlight<V> {
    calls: Calls<V>,
    key: String,
}

impl<V> Drop for InFlight<V> {
    fn drop(&mut self) {
        self.calls.lock().remove(&self.key);
    }
}

impl<V> Coalescer<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Work ==
    /// Starts the future built by `func` unless a call for `key` is already
    /// in flight, then waits for the shared result.
    ///
    /// The work runs on a spawned tokio task, so it completes even when
    /// every waiting caller is dropped. If it panics, waiters are released
    /// with [`CacheError::Internal`].
    pub async fn work<F, Fut>(&self, key: &str, func: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let (mut rx, leader) = {
            let mut calls = self.calls.lock();
            match calls.get(key) {
                Some(rx) => (rx.clone(), None),
                None => {
                    let (tx, rx) = watch::channel(None);
                    calls.insert(key.to_string(), rx.clone());
                    (rx, Some(tx))
                }
            }
        };

        if let Some(tx) = leader {
            let in_flight = InFlight {
                calls: self.calls.clone(),
                key: key.to_string(),
            };
            let fut = func();
            tokio::spawn(async move {
                let _in_flight = in_flight;
                let result = fut.await;
                tx.send_replace(Some(result));
            });
        }

        let shared = match rx.wait_for(Option::is_some).await {
            Ok(slot) => (*slot).clone(),
            Err(_) => None,
        };
        shared.unwrap_or_else(|| {
            Err(CacheError::Internal(format!(
                "in-flight load for key {key} ended without a result"
            )))
        })
    }

    /// Returns the number of keys with a call currently in flight.
    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_execution() {
        let group = Arc::new(Coalescer::<String>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let group = group.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                group
                    .work("key", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok("value".to_string())
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok("value".to_string()));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_errors_are_shared() {
        let group = Arc::new(Coalescer::<String>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let group = group.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                group
                    .work("bad", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Err(CacheError::Loader("bad not exist".to_string()))
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(
                handle.await.unwrap(),
                Err(CacheError::Loader("bad not exist".to_string()))
            );
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_new_wave_runs_again() {
        let group = Coalescer::<u32>::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            let result = group
                .work("key", || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
            assert_eq!(result, Ok(7));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_coalesce() {
        let group = Arc::new(Coalescer::<String>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for i in 0..4 {
            let group = group.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("key-{i}");
                group
                    .work(&key, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(format!("value-{i}"))
                    })
                    .await
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), Ok(format!("value-{i}")));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_aborted_first_caller_still_serves_followers() {
        let group = Arc::new(Coalescer::<String>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let first = {
            let group = group.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                group
                    .work("slow", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        Ok("loaded".to_string())
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(group.in_flight(), 1);

        let follower = {
            let group = group.clone();
            tokio::spawn(async move {
                group
                    .work("slow", || async { Ok("follower".to_string()) })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        first.abort();
        let result = follower.await.unwrap();

        assert_eq!(result, Ok("loaded".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_work_finishes_after_every_caller_leaves() {
        let group = Arc::new(Coalescer::<String>::new());
        let done = Arc::new(AtomicUsize::new(0));

        let caller = {
            let group = group.clone();
            let done = done.clone();
            tokio::spawn(async move {
                group
                    .work("key", || async move {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        done.fetch_add(1, Ordering::SeqCst);
                        Ok("value".to_string())
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        caller.abort();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
        assert_eq!(group.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_panicking_work_releases_waiters() {
        let group = Coalescer::<String>::new();

        let result = group
            .work("boom", || async {
                if true {
                    panic!("loader exploded");
                }
                Ok("unreachable".to_string())
            })
            .await;

        assert!(matches!(result, Err(CacheError::Internal(_))));
        assert_eq!(group.in_flight(), 0);
    }
}
