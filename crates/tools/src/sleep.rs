use std::time::Duration;

use {async_trait::async_trait, tracing::debug};

use crate::{
    context::{MessageTool, ToolContext},
    error::Result,
};

/// Delay primitive.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Pauses the conversation flow. Negative durations do nothing.
pub struct SleepTool<S: Sleeper = TokioSleeper> {
    seconds: i64,
    sleeper: S,
}

impl SleepTool {
    pub fn new(seconds: i64) -> Self {
        Self::with_sleeper(seconds, TokioSleeper)
    }
}

impl<S: Sleeper> SleepTool<S> {
    pub fn with_sleeper(seconds: i64, sleeper: S) -> Self {
        Self { seconds, sleeper }
    }
}

#[async_trait]
impl<S: Sleeper> MessageTool for SleepTool<S> {
    type Output = ();

    fn name(&self) -> &'static str {
        "sleep"
    }

    async fn execute(&self, _ctx: &ToolContext) -> Result<Self::Output> {
        if self.seconds < 0 {
            debug!(seconds = self.seconds, "negative sleep ignored");
            return Ok(());
        }
        let seconds = self.seconds.unsigned_abs();
        self.sleeper.sleep(Duration::from_secs(seconds)).await;
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::testing::Harness,
        std::sync::{Arc, Mutex},
    };

    #[derive(Clone, Default)]
    struct RecordingSleeper {
        calls: Arc<Mutex<Vec<Duration>>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.calls.lock().unwrap().push(duration);
        }
    }

    #[tokio::test]
    async fn positive_duration_is_slept() {
        let h = Harness::new();
        let sleeper = RecordingSleeper::default();
        SleepTool::with_sleeper(3, sleeper.clone())
            .execute(&h.ctx)
            .await
            .unwrap();
        assert_eq!(*sleeper.calls.lock().unwrap(), vec![Duration::from_secs(3)]);
    }

    #[tokio::test]
    async fn zero_still_invokes_the_delay() {
        let h = Harness::new();
        let sleeper = RecordingSleeper::default();
        SleepTool::with_sleeper(0, sleeper.clone())
            .execute(&h.ctx)
            .await
            .unwrap();
        assert_eq!(*sleeper.calls.lock().unwrap(), vec![Duration::ZERO]);
    }

    #[tokio::test]
    async fn negative_duration_never_invokes_the_delay() {
        let h = Harness::new();
        let sleeper = RecordingSleeper::default();
        SleepTool::with_sleeper(-5, sleeper.clone())
            .execute(&h.ctx)
            .await
            .unwrap();
        assert!(sleeper.calls.lock().unwrap().is_empty());
        assert!(h.store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_sleeper_advances_time() {
        let h = Harness::new();
        let start = tokio::time::Instant::now();
        SleepTool::new(2).execute(&h.ctx).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
