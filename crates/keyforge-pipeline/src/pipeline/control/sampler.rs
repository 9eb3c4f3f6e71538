use crate::pipeline::error::{Error, Result};
use core::time::Duration;
use sysinfo::{MINIMUM_CPU_UPDATE_INTERVAL, System};

/// A single CPU utilization reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadSample {
    /// Average utilization across all CPUs, in percent.
    pub utilization: f64,
}

/// Source of system load readings for the rate controller.
///
/// This abstraction allows the controller to run against the real system or a
/// scripted sequence of readings in tests.
pub trait LoadSampler: Send + 'static {
    /// Measures current utilization.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LoadSample`] if no reading could be taken. The
    /// controller skips the tick rather than failing.
    fn sample(&mut self) -> impl Future<Output = Result<LoadSample>> + Send;
}

/// Measures global CPU utilization with `sysinfo`.
///
/// CPU usage is a delta between two refreshes, so each sample refreshes,
/// waits for the configured window, and refreshes again.
pub struct SystemLoadSampler {
    system: System,
    window: Duration,
}

impl SystemLoadSampler {
    /// `window` is raised to `sysinfo`'s minimum update interval if shorter.
    pub fn new(window: Duration) -> Self {
        Self {
            system: System::new(),
            window: window.max(MINIMUM_CPU_UPDATE_INTERVAL),
        }
    }
}

impl LoadSampler for SystemLoadSampler {
    async fn sample(&mut self) -> Result<LoadSample> {
        self.system.refresh_cpu_usage();
        tokio::time::sleep(self.window).await;
        self.system.refresh_cpu_usage();

        if self.system.cpus().is_empty() {
            return Err(Error::LoadSample {
                reason: "no CPUs reported by the system".to_owned(),
            });
        }

        let utilization = f64::from(self.system.global_cpu_usage());
        if !utilization.is_finite() {
            return Err(Error::LoadSample {
                reason: format!("non-finite CPU utilization: {utilization}"),
            });
        }

        Ok(LoadSample { utilization })
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadSampler, SystemLoadSampler};
    use core::time::Duration;

    #[tokio::test]
    async fn system_sample_is_a_percentage() {
        let mut sampler = SystemLoadSampler::new(Duration::from_millis(250));
        let sample = sampler.sample().await.unwrap();

        assert!(
            (0.0..=100.0).contains(&sample.utilization),
            "utilization out of range: {}",
            sample.utilization
        );
    }
}
