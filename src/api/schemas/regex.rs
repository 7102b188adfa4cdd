use crate::domain::share::Share;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRequest {
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub test_string: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub pattern: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub share_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedRegexResponse {
    pub pattern: String,
    pub test_string: String,
}

impl From<Share> for SharedRegexResponse {
    fn from(share: Share) -> Self {
        Self { pattern: share.pattern, test_string: share.sample }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub is_valid: bool,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub matches: Vec<String>,
}
