use serde::Serialize;

/// Indicator written to the status region when a session starts.
pub const LOADING_INDICATOR: &str = "Loading...";

/// Status text shown when no HTTP client could be obtained.
pub const CLIENT_UNAVAILABLE_MESSAGE: &str =
    "[ Dynamic page update failed: XMLHttpRequest is null ]";

/// Status text shown for any status code other than 200, 203 and 503.
pub fn unexpected_status_message(status: u16) -> String {
    format!("[ Dynamic page update failed: Unexpected HTTP response code: {status} ]")
}

/// Where a polling session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum PollPhase {
    #[default]
    Idle,
    Waiting,
    InFlight,
    Done,
    Failed,
    Cancelled,
}

impl PollPhase {
    /// No transition leaves a terminal phase.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }
}

/// How a response status code drives the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 200 or 203: the body is the fragment.
    Content,
    /// 503: the server is still preparing the fragment.
    NotReady,
    Unexpected,
}

pub fn classify(status: u16) -> ResponseClass {
    match status {
        200 | 203 => ResponseClass::Content,
        503 => ResponseClass::NotReady,
        _ => ResponseClass::Unexpected,
    }
}

/// Final result of a polling session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PollOutcome {
    Delivered {
        status: u16,
        attempts: u32,
    },
    Failed {
        status: Option<u16>,
        message: String,
        attempts: u32,
    },
    Cancelled {
        attempts: u32,
    },
}

impl PollOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// Number of requests the session issued.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Delivered { attempts, .. }
            | Self::Failed { attempts, .. }
            | Self::Cancelled { attempts } => *attempts,
        }
    }

    pub(super) fn phase(&self) -> PollPhase {
        match self {
            Self::Delivered { .. } => PollPhase::Done,
            Self::Failed { .. } => PollPhase::Failed,
            Self::Cancelled { .. } => PollPhase::Cancelled,
        }
    }
}
