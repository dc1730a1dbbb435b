//! Failure categories and remediation hints for `plan`

use tripcrew::TripError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ApiKey,
    Connectivity,
    Other,
}

impl FailureKind {
    pub fn headline(&self) -> &'static str {
        match self {
            Self::ApiKey => "This looks like an API key issue",
            Self::Connectivity => "This looks like a connection issue",
            Self::Other => "Unexpected failure",
        }
    }

    pub fn steps(&self) -> &'static [&'static str] {
        match self {
            Self::ApiKey => &[
                "Check GOOGLE_API_KEY and SERPER_API_KEY in your environment or .env file",
                "Make sure the Google key has the Generative AI API enabled",
                "Check that billing is enabled on your Google Cloud project",
            ],
            Self::Connectivity => &[
                "Check your internet connection",
                "Try again in a few minutes",
                "Check whether a firewall is blocking the connection",
            ],
            Self::Other => &["Run `tripcrew diagnose` to check your setup"],
        }
    }
}

/// Categorize a failed run by error kind, falling back to its message
pub fn classify(err: &TripError) -> FailureKind {
    if let TripError::Llm(e) = err {
        if e.is_auth() {
            return FailureKind::ApiKey;
        }
        if e.is_connectivity() {
            return FailureKind::Connectivity;
        }
    }
    classify_message(&err.to_string())
}

pub fn classify_message(message: &str) -> FailureKind {
    let lower = message.to_lowercase();
    if message.contains("401") || message.contains("403") || message.contains("API key") {
        FailureKind::ApiKey
    } else if lower.contains("timeout") || lower.contains("timed out") || lower.contains("connection") {
        FailureKind::Connectivity
    } else {
        FailureKind::Other
    }
}
