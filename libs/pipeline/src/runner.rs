use tokio_util::sync::CancellationToken;

use step_api::{Batch, Consumer};

use crate::{S3Step, StepRunError};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Batch'ей получено от consumer'а.
    pub batches: u64,
    /// Объектов загружено.
    pub uploaded: u64,
}

// ═══════════════════════════════════════════════════════════════
//  Consumer loop: consumer.poll() → step.execute()
// ═══════════════════════════════════════════════════════════════

/// Крутить consumer loop до конца потока или отмены.
///
/// Сообщения обрабатываются строго по одному: следующий poll только
/// после завершения upload'а. Первая ошибка key/upload прерывает loop
/// и возвращается вызывающему (retry/dead-letter решает он).
pub async fn run_step(
    step: &S3Step,
    consumer: &mut dyn Consumer,
    token: CancellationToken,
) -> Result<RunStats, StepRunError> {
    let mut stats = RunStats::default();

    loop {
        let batch = tokio::select! {
            polled = consumer.poll() => match polled? {
                Some(batch) => batch,
                None => {
                    tracing::info!(step = %step.metadata().id, "consumer exhausted");
                    break;
                }
            },
            _ = token.cancelled() => {
                tracing::info!(step = %step.metadata().id, "cancellation requested");
                break;
            }
        };
        stats.batches += 1;

        // Step читает payload из головы batch'а, поэтому каждое сообщение
        // получает свой batch из одного элемента.
        for consumed in batch.into_messages() {
            let current = Batch::single(consumed);
            let Some(head) = current.head() else { continue };

            if let Err(e) = step.execute(head.message(), &current).await {
                tracing::error!(step = %step.metadata().id, error = %e, "step failed");
                return Err(e);
            }
            stats.uploaded += 1;
        }
    }

    tracing::info!(
        step = %step.metadata().id,
        batches = stats.batches,
        uploaded = stats.uploaded,
        "finished"
    );
    Ok(stats)
}
