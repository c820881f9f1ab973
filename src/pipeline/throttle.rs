use std::time::Duration;

use crate::config::PipelineConfig;

/// Fixed pauses between calls. Not adaptive.
#[derive(Debug, Clone, Default)]
pub struct Throttle {
    action_delay: Duration,
    page_delay: Duration,
    retry_delay: Duration,
}

impl Throttle {
    pub fn new(action_delay: Duration, page_delay: Duration, retry_delay: Duration) -> Self {
        Self {
            action_delay,
            page_delay,
            retry_delay,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.action_delay(), config.page_delay(), config.retry_delay())
    }

    /// No pauses at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub async fn after_action(&self) {
        pause(self.action_delay).await;
    }

    pub async fn after_page(&self) {
        pause(self.page_delay).await;
    }

    pub async fn before_retry(&self) {
        pause(self.retry_delay).await;
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_uses_millis() {
        let throttle = Throttle::from_config(&PipelineConfig::default());
        assert_eq!(throttle.action_delay, Duration::from_millis(200));
        assert_eq!(throttle.page_delay, Duration::from_secs(1));
        assert_eq!(throttle.retry_delay, Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pauses_advance_virtual_time() {
        let throttle = Throttle::new(
            Duration::from_millis(200),
            Duration::from_secs(1),
            Duration::from_secs(10),
        );
        let start = tokio::time::Instant::now();
        throttle.after_action().await;
        throttle.after_page().await;
        throttle.before_retry().await;
        assert!(start.elapsed() >= Duration::from_millis(11_200));
    }
}
