use std::time::{Duration, Instant};

const REPORT_INTERVAL: u32 = 100;

/// Averages frame times over a fixed number of frames.
pub struct LoopClock {
    frame_count: u32,
    accum_time: Duration,
    last_frame_inst: Instant,
}

impl LoopClock {
    pub fn start_clock() -> Self {
        LoopClock {
            frame_count: 0,
            accum_time: Duration::ZERO,
            last_frame_inst: Instant::now(),
        }
    }

    /// Records one frame; every 100 frames returns the average frame time in ms.
    pub fn tick(&mut self) -> Option<f32> {
        let now = Instant::now();
        self.record(now.duration_since(self.last_frame_inst));
        self.last_frame_inst = now;
        self.report()
    }

    fn record(&mut self, frame_time: Duration) {
        self.accum_time += frame_time;
        self.frame_count += 1;
    }

    fn report(&mut self) -> Option<f32> {
        (self.frame_count == REPORT_INTERVAL).then(|| {
            let average_frametime = self.accum_time.as_secs_f32() * 1000.0 / self.frame_count as f32;
            self.accum_time = Duration::ZERO;
            self.frame_count = 0;
            average_frametime
        })
    }
}
