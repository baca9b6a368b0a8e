//! Outcomes of executing a test case against the live API.

use serde::{Deserialize, Serialize};

/// Coarse classification of an execution outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictKind {
    /// The call behaved as expected.
    Success,
    /// The call completed but an oracle rejected the response.
    Failure,
    /// The call could not be completed (transport error, adapter crash).
    Error,
}

/// Result of one execution, opaque beyond its use in objective scoring.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Verdict {
    pub kind: VerdictKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

impl Verdict {
    pub fn success(status_code: u16) -> Self {
        Verdict {
            kind: VerdictKind::Success,
            status_code: Some(status_code),
            detail: String::new(),
        }
    }

    pub fn failure(status_code: Option<u16>, detail: impl Into<String>) -> Self {
        Verdict {
            kind: VerdictKind::Failure,
            status_code,
            detail: detail.into(),
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Verdict {
            kind: VerdictKind::Error,
            status_code: None,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == VerdictKind::Success
    }

    /// Failures and errors both count as failing outcomes.
    pub fn is_failing(&self) -> bool {
        self.kind != VerdictKind::Success
    }

    /// True when the API answered with a 4xx status.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status_code, Some(code) if (400..500).contains(&code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(Verdict::success(200).is_success());
        assert!(Verdict::error("connection refused").is_failing());

        let rejected = Verdict::failure(Some(404), "not found");
        assert!(rejected.is_failing());
        assert!(rejected.is_client_error());
        assert!(!Verdict::failure(Some(500), "boom").is_client_error());
        assert!(!Verdict::error("timeout").is_client_error());
    }
}
