/// Tracks consecutive failures of a repeated operation against a threshold.
///
/// Any success resets the run, so only an unbroken streak of failures
/// exhausts the budget.
#[derive(Debug, Clone)]
pub struct FailureBudget {
    threshold: u32,
    consecutive: u32,
}

impl FailureBudget {
    /// `threshold` failures in a row exhaust the budget (minimum 1)
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive: 0,
        }
    }

    /// Record a failure; returns true once the threshold is reached
    pub fn record_failure(&mut self) -> bool {
        self.consecutive = self.consecutive.saturating_add(1);
        self.is_exhausted()
    }

    pub fn record_success(&mut self) {
        self.consecutive = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.consecutive >= self.threshold
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}
