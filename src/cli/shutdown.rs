use tokio::select;
use tokio_util::sync::CancellationToken;

/// Cancels `cancelation` on ctrl-c. Returns early once something else cancels it, so the
/// listener never outlives the timer.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => {},
    };
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::detect_shutdown;

    #[tokio::test]
    async fn returns_after_external_cancel() {
        let token = CancellationToken::new();
        token.cancel();
        detect_shutdown(token.clone()).await;
        assert!(token.is_cancelled());
    }
}
