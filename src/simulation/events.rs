//! Events pushed to the presentation layer

/// How long an alert stays on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDuration {
    Ticks(u32),
    Permanent,
}

/// A message shown to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub duration: AlertDuration,
}

impl Alert {
    pub fn timed(message: impl Into<String>, ticks: u32) -> Self {
        Self {
            message: message.into(),
            duration: AlertDuration::Ticks(ticks),
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            duration: AlertDuration::Permanent,
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.duration == AlertDuration::Permanent
    }

    /// Count down one tick. Returns false once the alert has expired.
    pub fn age(&mut self) -> bool {
        match &mut self.duration {
            AlertDuration::Permanent => true,
            AlertDuration::Ticks(remaining) => {
                *remaining = remaining.saturating_sub(1);
                *remaining > 0
            }
        }
    }
}

/// Something the presentation layer should react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    /// A passenger reached their destination
    ScoreIncremented { score: u64 },
    /// A station overflowed; the session is over
    GameOver { final_score: u64 },
    Alert(Alert),
}
