use std::fmt::Display;
use std::future::Future;

/// Awaits `fut` and degrades any error to `fallback`, logging it as a
/// warning. Used for lookups whose failure must not fail the caller.
pub async fn with_fallback_value<F, T, E>(fut: F, fallback: T, what: &str) -> T
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match fut.await {
        Ok(value) => value,
        Err(reason) => {
            tracing::warn!(%reason, "Could not fetch {what}, continuing without it");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_successful_values_through() {
        let value =
            with_fallback_value(async { Ok::<_, String>(7) }, 0, "seven").await;

        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn degrades_errors_to_fallback() {
        let value = with_fallback_value(
            async { Err::<Vec<u64>, _>("node down") },
            vec![],
            "child slots",
        )
        .await;

        assert!(value.is_empty());
    }
}
