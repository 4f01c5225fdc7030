use serde::{Deserialize, Serialize};

/// Lifecycle of one acquisition run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AcquisitionState {
    #[default]
    Idle,
    Connected,
    Streaming,
    Stopped,
}

impl AcquisitionState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: AcquisitionState) -> bool {
        use AcquisitionState::*;

        matches!(
            (self, target),
            (Idle, Connected) |
            // connect failure
            (Idle, Stopped) |

            (Connected, Streaming) |
            // sink failed to open
            (Connected, Stopped) |

            (Streaming, Stopped) |

            (Stopped, Idle)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Connected => "Connected",
            Self::Streaming => "Streaming",
            Self::Stopped => "Stopped",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connected | Self::Streaming)
    }
}
