//! Siteverify wire types and the acceptance policy.

use serde::{Deserialize, Serialize};

/// Default action a signup token must have been minted for.
pub const DEFAULT_EXPECTED_ACTION: &str = "signup";

/// Default minimum score for a token to be accepted.
pub const DEFAULT_MIN_SCORE: f64 = 0.7;

/// Raw siteverify response body.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteVerifyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}

/// What a token has to satisfy to pass the gate.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationPolicy {
    pub expected_action: String,
    pub min_score: f64,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self {
            expected_action: DEFAULT_EXPECTED_ACTION.to_string(),
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

/// Outcome of verifying one token.
///
/// Score and action are kept on rejection so callers can log them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verification {
    pub ok: bool,
    pub score: f64,
    pub action: String,
}

impl Verification {
    /// A rejection with nothing known about the token.
    pub fn rejected() -> Self {
        Self {
            ok: false,
            score: 0.0,
            action: String::new(),
        }
    }

    /// Apply the policy to a siteverify response.
    pub fn evaluate(response: &SiteVerifyResponse, policy: &VerificationPolicy) -> Self {
        let score = response.score.unwrap_or(0.0);
        let action = response.action.clone().unwrap_or_default();

        let ok = response.success && action == policy.expected_action && score >= policy.min_score;

        Self { ok, score, action }
    }
}
