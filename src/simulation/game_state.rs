//! Session progress: score, elapsed time and the game-over flag

/// Score and lifecycle of one session
#[derive(Debug, Clone, Default)]
pub struct GameState {
    /// Passengers delivered to their destination
    pub score: u64,

    /// Ticks simulated so far
    pub ticks: u64,

    /// Set once any station overflows
    pub is_over: bool,

    /// Whether the game-over event has been emitted
    pub over_announced: bool,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one delivered passenger and return the new score
    pub fn record_delivery(&mut self) -> u64 {
        self.score += 1;
        self.score
    }

    /// Advance the clock by one tick
    pub fn update(&mut self) {
        self.ticks += 1;
    }

    pub fn end(&mut self) {
        self.is_over = true;
    }

    /// Elapsed simulated time in seconds
    pub fn elapsed_secs(&self, tick_rate: u32) -> f64 {
        self.ticks as f64 / f64::from(tick_rate.max(1))
    }

    /// Get a summary string for display
    pub fn summary(&self, tick_rate: u32) -> String {
        format!(
            "Score: {} | Ticks: {} | Time: {:.1}s{}",
            self.score,
            self.ticks,
            self.elapsed_secs(tick_rate),
            if self.is_over { " | GAME OVER" } else { "" }
        )
    }
}
