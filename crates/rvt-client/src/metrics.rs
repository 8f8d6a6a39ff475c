//! Client-side metrics for gateway calls and session events.
//!
//! Nothing here installs a recorder; without one every macro is a no-op.

use std::{sync::LazyLock, time::Duration};

use metrics::{counter, histogram};
use regex::Regex;

use crate::gateway::Failure;

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("uuid pattern is valid")
});
static NUMERIC_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d+(/|$)").expect("numeric pattern is valid"));
// Subject and unit names are user text
static NAME_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(subjects|units)/[^/]+").expect("name pattern is valid")
});

/// Record one finished gateway call
pub(crate) fn record_gateway_call(
    method: &str,
    path: &str,
    failure: Option<&Failure>,
    elapsed: Duration,
) {
    let path = normalize_path(path);
    let outcome = failure.map_or("success", Failure::kind);

    counter!(
        "rvt_gateway_requests_total",
        "method" => method.to_string(),
        "path" => path.clone(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        "rvt_gateway_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path
    )
    .record(elapsed.as_secs_f64());
}

/// Record a login, register or logout outcome
pub fn record_auth_event(event_type: &'static str, success: bool) {
    let status = if success { "success" } else { "failure" };

    counter!(
        "rvt_auth_events_total",
        "type" => event_type,
        "status" => status
    )
    .increment(1);
}

/// Replace ids with `:id` and subject/unit names with `:name` to keep label
/// cardinality bounded
fn normalize_path(path: &str) -> String {
    let named = NAME_SEGMENT.replace_all(path, "/${1}/:name");
    let normalized = UUID_SEGMENT.replace_all(&named, ":id");
    NUMERIC_SEGMENT
        .replace_all(&normalized, "/:id$1")
        .into_owned()
}
