//! Splash progress simulation

use bridge_traits::{ShellChrome, UiDispatcher};
use core_runtime::config::TimingConfig;
use futures::FutureExt;
use std::sync::Arc;
use tracing::debug;

/// Percent values shown on the splash indicator, in order.
///
/// Bounded: ends at exactly 100 regardless of the step size.
pub fn progress_steps(timing: &TimingConfig) -> Vec<u8> {
    let step = u32::from(timing.splash_progress_step.max(1));
    (1..=timing.splash_progress_steps())
        .map(|n| (n * step).min(100) as u8)
        .collect()
}

/// Drive the splash indicator: wait the initial delay, then post one step
/// per interval onto the UI context.
///
/// Returns once 100 % is posted or the UI context is gone. Callers stop it
/// early by dropping the future.
pub async fn run_progress(
    timing: TimingConfig,
    chrome: Arc<dyn ShellChrome>,
    ui: Arc<dyn UiDispatcher>,
) {
    tokio::time::sleep(timing.splash_progress_delay).await;

    let steps = progress_steps(&timing);
    let last = steps.len().saturating_sub(1);
    for (i, percent) in steps.into_iter().enumerate() {
        let chrome = Arc::clone(&chrome);
        let job = async move { chrome.set_splash_progress(percent) }.boxed();
        if let Err(e) = ui.dispatch(job) {
            debug!(error = %e, "Splash progress stopped");
            return;
        }
        if i < last {
            tokio::time::sleep(timing.splash_progress_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_desktop::TokioUiDispatcher;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct ProgressLog(Mutex<Vec<u8>>);

    impl ShellChrome for ProgressLog {
        fn show_splash(&self) {}
        fn set_splash_progress(&self, percent: u8) {
            self.0.lock().unwrap().push(percent);
        }
        fn set_loading_overlay(&self, _visible: bool) {}
        fn set_page_progress(&self, _percent: Option<u8>) {}
        fn show_help_affordance(&self) {}
    }

    #[test]
    fn test_default_steps_reach_exactly_100() {
        let steps = progress_steps(&TimingConfig::default());
        assert_eq!(steps.len(), 10);
        assert_eq!(steps.first(), Some(&10));
        assert_eq!(steps.last(), Some(&100));
    }

    #[test]
    fn test_uneven_step_is_capped() {
        let timing = TimingConfig {
            splash_progress_step: 30,
            ..TimingConfig::default()
        };
        assert_eq!(progress_steps(&timing), vec![30, 60, 90, 100]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_follows_delay_and_interval() {
        let log = Arc::new(ProgressLog::default());
        let ui = Arc::new(TokioUiDispatcher::spawn());
        let task = tokio::spawn(run_progress(
            TimingConfig::default(),
            log.clone(),
            ui.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(450)).await;
        ui.idle().await;
        assert!(log.0.lock().unwrap().is_empty());

        // Steps land at 500, 700, 900 and 1100 ms.
        tokio::time::sleep(Duration::from_millis(750)).await;
        ui.idle().await;
        assert_eq!(*log.0.lock().unwrap(), vec![10, 20, 30, 40]);

        task.await.unwrap();
        ui.idle().await;
        assert_eq!(log.0.lock().unwrap().last(), Some(&100));
    }
}
