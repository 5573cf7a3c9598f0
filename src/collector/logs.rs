// Log stage: line and pattern-match counts for stdout and stderr of each container

use super::fanout::{FanOutLimits, fan_out};
use crate::docker_repo::{LogStream, RuntimeGateway};
use crate::models::{LogSample, StreamCount};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// Counts newline-terminated lines of a log buffer.
///
/// The segment after the last `\n` is not counted as a line. When `pattern` is
/// set and the buffer has at least one newline, every segment is tested
/// against it.
pub fn count_lines(buf: &[u8], pattern: Option<&Regex>) -> StreamCount {
    let lines = buf.iter().filter(|b| **b == b'\n').count() as u64;
    let matches = match pattern {
        Some(re) if lines > 0 => String::from_utf8_lossy(buf)
            .split('\n')
            .filter(|line| re.is_match(line))
            .count() as u64,
        _ => 0,
    };
    StreamCount { lines, matches }
}

pub(crate) async fn collect_logs<G: RuntimeGateway>(
    gateway: &Arc<G>,
    ids: &[String],
    limits: FanOutLimits,
    pattern: Option<&Regex>,
) -> HashMap<String, LogSample> {
    let keys: Vec<(String, LogStream)> = ids
        .iter()
        .flat_map(|id| {
            [
                (id.clone(), LogStream::Stdout),
                (id.clone(), LogStream::Stderr),
            ]
        })
        .collect();

    let results = fan_out("logs", keys, limits, |(id, stream)| {
        let gateway = gateway.clone();
        let pattern = pattern.cloned();
        let id = id.clone();
        let stream = *stream;
        async move {
            let buf = gateway.logs(&id, stream).await?;
            Ok(count_lines(&buf, pattern.as_ref()))
        }
    })
    .await;

    let mut streams: HashMap<String, (Option<StreamCount>, Option<StreamCount>)> = HashMap::new();
    for ((id, stream), count) in results {
        let slot = streams.entry(id).or_default();
        match stream {
            LogStream::Stdout => slot.0 = Some(count),
            LogStream::Stderr => slot.1 = Some(count),
        }
    }
    streams
        .into_iter()
        .filter_map(|(id, (stdout, stderr))| {
            LogSample::from_streams(id.clone(), stdout, stderr).map(|s| (id, s))
        })
        .collect()
}
