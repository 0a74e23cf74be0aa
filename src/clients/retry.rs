//! Retentativa com backoff exponencial para chamadas externas

use std::future::Future;
use std::time::Duration;

use super::{ClientError, ClientResult};

pub const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY: Duration = Duration::from_millis(250);

/// Quais falhas permitem reenviar a mesma chamada
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Consulta ou operação idempotente: qualquer falha transitória
    Idempotent,
    /// Criação ou disparo: só quando o pedido não chegou ao provedor
    Unsent,
}

impl RetryPolicy {
    fn allows(self, err: &ClientError) -> bool {
        match self {
            RetryPolicy::Idempotent => err.is_transient(),
            RetryPolicy::Unsent => err.is_unsent(),
        }
    }
}

/// Executa `operation` até `MAX_ATTEMPTS` vezes enquanto o erro for transitório
pub async fn with_retry<T, F, Fut>(label: &str, operation: F) -> ClientResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    with_retry_policy(label, RetryPolicy::Idempotent, operation).await
}

pub async fn with_retry_policy<T, F, Fut>(
    label: &str,
    policy: RetryPolicy,
    mut operation: F,
) -> ClientResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if policy.allows(&err) && attempt < MAX_ATTEMPTS => {
                let delay = BASE_DELAY * 2u32.pow(attempt - 1);
                log::warn!(
                    "⚠️ {} falhou (tentativa {}/{}): {}. Nova tentativa em {:?}",
                    label,
                    attempt,
                    MAX_ATTEMPTS,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                log::error!("❌ {} falhou: {}", label, err);
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_errors_then_succeeds() {
        let calls = &AtomicU32::new(0);
        let result = with_retry("teste", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(ClientError::Status { provider: "x", status: 502, body: String::new() })
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_errors_are_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: ClientResult<()> = with_retry("teste", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Status { provider: "x", status: 400, body: String::new() })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = &AtomicU32::new(0);
        let result: ClientResult<()> = with_retry("teste", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Status { provider: "x", status: 500, body: String::new() })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_is_not_resent_after_server_error() {
        // 5xx pode ter criado o documento do outro lado
        let calls = &AtomicU32::new(0);
        let result: ClientResult<()> = with_retry_policy("teste", RetryPolicy::Unsent, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Status { provider: "x", status: 502, body: String::new() })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_is_resent_when_throttled() {
        let calls = &AtomicU32::new(0);
        let result = with_retry_policy("teste", RetryPolicy::Unsent, || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ClientError::Status { provider: "x", status: 429, body: String::new() })
            } else {
                Ok("doc-1")
            }
        })
        .await;
        assert_eq!(result.unwrap(), "doc-1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
