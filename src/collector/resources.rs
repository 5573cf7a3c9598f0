// Stat stage: one one-shot stats query per running container

use super::fanout::{FanOutLimits, fan_out};
use crate::docker_repo::{NetworkSelection, RuntimeGateway, decode_stats};
use crate::error::CollectError;
use crate::models::ResourceSample;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) async fn collect_resources<G: RuntimeGateway>(
    gateway: &Arc<G>,
    ids: &[String],
    limits: FanOutLimits,
    network: NetworkSelection,
) -> HashMap<String, ResourceSample> {
    fan_out("stats", ids.to_vec(), limits, |id| {
        let gateway = gateway.clone();
        let id = id.clone();
        async move {
            let doc = gateway.stats(&id).await?;
            if !doc.is_object() {
                return Err(CollectError::Malformed("stats"));
            }
            Ok(decode_stats(&id, &doc, network))
        }
    })
    .await
    .into_iter()
    .collect()
}
