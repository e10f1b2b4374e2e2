use std::time::{Duration, Instant};

use log::{info, trace};

/// Per-frame stage timings.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameProfiler {
    /// Dispatch plus reduce of the transform pipeline.
    pub transform_time: Duration,
    /// Sum of time spent inside worker tasks.
    pub worker_busy_time: Duration,
    pub shadow_time: Duration,
    pub main_pass_time: Duration,
    pub total_frame_time: Duration,

    pub object_count: usize,
    pub rendered_count: usize,
}

impl FrameProfiler {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn share(part: Duration, total_us: f32) -> f32 {
        (part.as_micros() as f32 / total_us) * 100.0
    }

    pub fn report(&self) {
        let total_us = self.total_frame_time.as_micros() as f32;
        if total_us < 1.0 {
            return;
        }

        info!(
            "frame: {:.2} ms, objects {}, rendered {}",
            self.total_frame_time.as_secs_f32() * 1000.0,
            self.object_count,
            self.rendered_count
        );
        info!(
            "  transforms: {:.2} ms ({:.1}%), worker busy {:.2} ms",
            self.transform_time.as_secs_f32() * 1000.0,
            Self::share(self.transform_time, total_us),
            self.worker_busy_time.as_secs_f32() * 1000.0
        );
        info!(
            "  shadows:    {:.2} ms ({:.1}%)",
            self.shadow_time.as_secs_f32() * 1000.0,
            Self::share(self.shadow_time, total_us)
        );
        info!(
            "  main pass:  {:.2} ms ({:.1}%)",
            self.main_pass_time.as_secs_f32() * 1000.0,
            Self::share(self.main_pass_time, total_us)
        );
    }
}

/// Times one frame stage into a [`FrameProfiler`] field.
///
/// Traces when the stage starts and how long it ran.
pub struct StageTimer<'a> {
    stage: &'static str,
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> StageTimer<'a> {
    pub fn new(stage: &'static str, output: &'a mut Duration) -> Self {
        trace!("{stage}: started");
        Self {
            stage,
            start: Instant::now(),
            output,
        }
    }
}

impl Drop for StageTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        *self.output += elapsed;
        trace!("{}: {} us", self.stage, elapsed.as_micros());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_timer_accumulates() {
        let mut total = Duration::ZERO;
        {
            let _timer = StageTimer::new("test", &mut total);
            std::thread::sleep(Duration::from_millis(1));
        }
        let first = total;
        {
            let _timer = StageTimer::new("test", &mut total);
        }
        assert!(first >= Duration::from_millis(1));
        assert!(total >= first);
    }
}
