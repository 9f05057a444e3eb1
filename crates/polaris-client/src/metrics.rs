//! Single-shot metrics polling against the inference server's `/metrics`
//! endpoint.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use polaris_common::{JobState, JobStatus, MetricsResponse, MetricsSnapshot};

/// Timeouts for the one HTTP request a metrics query makes.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the HTTP client used for metrics polling.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Fetch a metrics snapshot for a job, given its freshly derived status.
///
/// Anything short of a running server with a parseable exposition comes
/// back as `Unavailable` text — metrics unavailability is an expected,
/// recoverable condition, not an error. No network call is made unless the
/// job is RUNNING with a known base URL. Each call is independent; no
/// connection state is held between calls.
pub async fn get_metrics(http: &reqwest::Client, status: &JobStatus) -> MetricsResponse {
    if status.state != JobState::Running {
        return MetricsResponse::Unavailable(status.describe());
    }
    let Some(base_url) = &status.base_url else {
        return MetricsResponse::Unavailable(format!(
            "job {} is RUNNING but the server address is not yet known",
            status.job_id
        ));
    };

    let url = format!("{}/metrics", base_url.trim_end_matches('/'));
    let resp = match http.get(&url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::debug!(error = %e, %url, "metrics endpoint not responding");
            return MetricsResponse::Unavailable(format!("metrics endpoint not responding: {e}"));
        }
    };
    if !resp.status().is_success() {
        return MetricsResponse::Unavailable(format!(
            "metrics endpoint returned HTTP {}",
            resp.status()
        ));
    }
    let body = match resp.text().await {
        Ok(t) => t,
        Err(e) => {
            return MetricsResponse::Unavailable(format!("failed to read metrics body: {e}"));
        }
    };

    MetricsResponse::Snapshot(MetricsSnapshot {
        collected_at: Utc::now(),
        metrics: parse_exposition(&body),
    })
}

/// Parse a line-based metric exposition into a flat name → value map.
/// Labels are stripped; for repeated names the last sample wins.
pub fn parse_exposition(body: &str) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        // Value is the last whitespace-separated token.
        let Some((head, value_str)) = line.rsplit_once(|c: char| c.is_whitespace()) else {
            continue;
        };
        let Ok(value) = value_str.parse::<f64>() else {
            continue;
        };
        let name = match head.split_once('{') {
            Some((name, _labels)) => name,
            None => head,
        }
        .trim();
        if name.is_empty() {
            continue;
        }
        out.insert(name.to_string(), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exposition_lines_and_strips_labels() {
        let body = "\
# HELP vllm:num_requests_waiting Number of waiting requests.
# TYPE vllm:num_requests_waiting gauge
vllm:num_requests_waiting{model=\"llama-7b\"} 3
vllm:num_requests_running{model=\"llama-7b\"} 1
vllm:gpu_cache_usage_perc 0.45
not a metric line
vllm:bad_value{x=\"y\"} NaN?
";
        let metrics = parse_exposition(body);
        assert_eq!(metrics.get("vllm:num_requests_waiting"), Some(&3.0));
        assert_eq!(metrics.get("vllm:num_requests_running"), Some(&1.0));
        assert_eq!(metrics.get("vllm:gpu_cache_usage_perc"), Some(&0.45));
        assert_eq!(metrics.len(), 3);
    }

    #[test]
    fn repeated_names_keep_the_last_sample() {
        let metrics = parse_exposition("m{a=\"1\"} 1\nm{a=\"2\"} 2\n");
        assert_eq!(metrics.get("m"), Some(&2.0));
        assert_eq!(metrics.len(), 1);
    }

    #[tokio::test]
    async fn non_running_job_short_circuits_without_network() {
        let status = JobStatus {
            job_id: 42,
            model_name: Some("llama-7b".into()),
            state: JobState::Pending,
            reason: Some("Resources".into()),
            base_url: None,
        };
        // An unroutable client would hang or error if a request were made;
        // the PENDING short-circuit must answer instantly.
        let resp = get_metrics(&http_client(), &status).await;
        match resp {
            MetricsResponse::Unavailable(text) => {
                assert!(text.contains("PENDING"), "text was: {text}");
            }
            MetricsResponse::Snapshot(_) => panic!("expected unavailable"),
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades_to_text() {
        let status = JobStatus {
            job_id: 42,
            model_name: None,
            state: JobState::Running,
            reason: None,
            // Reserved TEST-NET address, nothing listens here.
            base_url: Some("http://192.0.2.1:9".into()),
        };
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(200))
            .timeout(Duration::from_millis(400))
            .build()
            .unwrap();
        match get_metrics(&http, &status).await {
            MetricsResponse::Unavailable(text) => {
                assert!(text.contains("not responding"), "text was: {text}");
            }
            MetricsResponse::Snapshot(_) => panic!("expected unavailable"),
        }
    }
}
