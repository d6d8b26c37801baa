use crate::context::Context;
use crate::fusion::{FusionEngine, FusionResult};
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::sync::Arc;

/// One line of a batch input file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub url: String,
    #[serde(default)]
    pub context: Option<Context>,
}

/// Parse JSON Lines requests, skipping blank lines
pub fn read_requests<R: BufRead>(reader: R) -> Result<Vec<ScoreRequest>> {
    let mut requests = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.with_context(|| format!("Failed to read line {line_number}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let request: ScoreRequest = serde_json::from_str(&line)
            .with_context(|| format!("Invalid request on line {line_number}"))?;
        requests.push(request);
    }

    Ok(requests)
}

/// Score every request as its own blocking task, returning results in input order
pub async fn score_all(
    engine: Arc<FusionEngine>,
    requests: Vec<ScoreRequest>,
) -> Result<Vec<FusionResult>> {
    let handles: Vec<_> = requests
        .into_iter()
        .map(|request| {
            let engine = Arc::clone(&engine);
            tokio::task::spawn_blocking(move || {
                engine.score(&request.url, request.context.as_ref())
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (index, handle) in handles.into_iter().enumerate() {
        let result = handle
            .await
            .with_context(|| format!("Scoring task for request {} failed", index + 1))?;
        results.push(result);
    }

    log::info!("Scored {} request(s)", results.len());
    Ok(results)
}
