use std::time::Instant;

/// Monotonic time source read once per frame.
pub trait Clock {
    /// Seconds since the clock started.
    fn now(&self) -> f64;

    /// Seconds elapsed during the last frame.
    fn delta_time(&self) -> f64;
}

/// Fixed-step clock advanced explicitly by the caller.
#[derive(Debug, Clone)]
pub struct FrameClock {
    now: f64,
    step: f64,
}

impl FrameClock {
    pub fn new(step: f64) -> Self {
        Self { now: 0.0, step }
    }

    /// 60 frames per second.
    pub fn sixty_hz() -> Self {
        Self::new(1.0 / 60.0)
    }

    pub fn advance(&mut self) -> f64 {
        self.now += self.step;
        self.now
    }

    pub fn advance_by(&mut self, seconds: f64) -> f64 {
        self.now += seconds;
        self.now
    }
}

impl Clock for FrameClock {
    fn now(&self) -> f64 {
        self.now
    }

    fn delta_time(&self) -> f64 {
        self.step
    }
}

/// Wall clock. Call [`SystemClock::tick`] once per frame.
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
    last_frame: Instant,
    delta: f64,
}

impl SystemClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta: 0.0,
        }
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn delta_time(&self) -> f64 {
        self.delta
    }
}
