//! Ctrl-C handling for long-running commands

use std::future::Future;

/// Run `work` unless `interrupt` completes first; `None` means interrupted
pub async fn until_interrupted<F, I>(work: F, interrupt: I) -> Option<F::Output>
where
    F: Future,
    I: Future<Output = ()>,
{
    tokio::select! {
        output = work => Some(output),
        _ = interrupt => None,
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::{pending, ready};

    #[tokio::test]
    async fn test_work_finishes_first() {
        let result = until_interrupted(ready(42), pending::<()>()).await;
        assert_eq!(result, Some(42));
    }

    #[tokio::test]
    async fn test_interrupt_wins() {
        let result = until_interrupted(pending::<u32>(), ready(())).await;
        assert_eq!(result, None);
    }
}
