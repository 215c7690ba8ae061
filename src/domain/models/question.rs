use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuestionRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Answer {
    pub answer: String,
    #[serde(rename = "sources", default)]
    pub source_ids: Vec<String>,
    #[serde(rename = "confidence", default)]
    pub confidence_score: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub services: BTreeMap<String, String>,
}
