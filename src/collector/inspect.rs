// Inspect stage: container start time

use super::fanout::{FanOutLimits, fan_out};
use crate::docker_repo::RuntimeGateway;
use crate::error::CollectError;
use crate::models::StartSample;
use chrono::DateTime;
use std::collections::HashMap;
use std::sync::Arc;

/// Parses an RFC 3339 timestamp (fractional seconds allowed) into whole epoch seconds.
pub fn parse_started_at(value: &str) -> Result<f64, CollectError> {
    let t = DateTime::parse_from_rfc3339(value).map_err(|source| CollectError::StartTime {
        value: value.to_string(),
        source,
    })?;
    Ok(t.timestamp() as f64)
}

pub(crate) async fn collect_start_times<G: RuntimeGateway>(
    gateway: &Arc<G>,
    ids: &[String],
    limits: FanOutLimits,
) -> HashMap<String, StartSample> {
    fan_out("inspect", ids.to_vec(), limits, |id| {
        let gateway = gateway.clone();
        let id = id.clone();
        async move {
            let raw = gateway
                .started_at(&id)
                .await?
                .ok_or(CollectError::MissingStartTime)?;
            let started_at_unix_seconds = parse_started_at(&raw)?;
            Ok(StartSample {
                id,
                started_at_unix_seconds,
            })
        }
    })
    .await
    .into_iter()
    .collect()
}
