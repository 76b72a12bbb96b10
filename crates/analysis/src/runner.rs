use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Why a single item produced no result.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("operation failed: {0:#}")]
    Failed(anyhow::Error),

    #[error("operation timed out after {0:?}")]
    TimedOut(Duration),

    #[error("operation panicked: {0}")]
    Panicked(String),
}

/// Bounded fan-out: at most `limit` operations in flight, one result slot
/// per input, output in input order.
#[derive(Debug, Clone, Copy)]
pub struct BoundedRunner {
    limit: usize,
    timeout: Duration,
}

impl BoundedRunner {
    /// `limit` is clamped to at least 1.
    pub fn new(limit: usize, timeout: Duration) -> Self {
        Self {
            limit: limit.max(1),
            timeout,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run `operation` over `items`.
    ///
    /// A failing, timed-out or panicking item only affects its own slot.
    /// Timed-out operations are dropped at their next suspension point.
    pub async fn run<T, R, F, Fut>(
        &self,
        items: Vec<T>,
        operation: F,
    ) -> Vec<Result<R, RunnerError>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.limit));
        let timeout = self.timeout;

        let handles: Vec<_> = items
            .into_iter()
            .map(|item| {
                let semaphore = Arc::clone(&semaphore);
                let task = operation(item);
                tokio::spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| RunnerError::Failed(anyhow::anyhow!(e)))?;
                    match tokio::time::timeout(timeout, task).await {
                        Ok(Ok(value)) => Ok(value),
                        Ok(Err(err)) => Err(RunnerError::Failed(err)),
                        Err(_) => Err(RunnerError::TimedOut(timeout)),
                    }
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_error) if join_error.is_panic() => {
                    Err(RunnerError::Panicked(panic_message(join_error.into_panic())))
                }
                Err(join_error) => Err(RunnerError::Failed(anyhow::anyhow!(join_error))),
            };
            results.push(result);
        }
        results
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
