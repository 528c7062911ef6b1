use anyhow::Result;
use std::future::Future;
use std::time::Duration;

/// Run `op` up to `max_attempts` times, sleeping `base_delay * 2^n` after the
/// n-th failure. The last error is returned (with context) once attempts run
/// out; callers decide whether that is fatal or degrades to a fallback.
pub async fn with_backoff<T, F, Fut>(
    label: &str,
    max_attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        tracing::debug!(attempt = attempt + 1, attempts, "loading {}", label);
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                attempt += 1;
                tracing::warn!(attempt, attempts, error = %e, "{} failed", label);
                if attempt >= attempts {
                    return Err(e.context(format!("{} failed after {} attempts", label, attempts)));
                }
                tokio::time::sleep(base_delay * 2u32.saturating_pow(attempt - 1)).await;
            }
        }
    }
}
