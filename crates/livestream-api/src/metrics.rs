use std::fmt::Write;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use livestream_core::Visibility;

use crate::state::AppState;

pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut out = String::with_capacity(2048);
    let p = &state.poller;
    let id = escape_label(p.poller_id());
    let stats = p.stats().await;

    // Writing into a String cannot fail.
    let _ = writeln!(out, "# TYPE livestream_poller_info info");
    let _ = writeln!(out, "# HELP livestream_poller_info Information about the status poller");
    let _ = writeln!(
        out,
        "livestream_poller_info{{poller_id=\"{}\",endpoint=\"{}\",created=\"{}\"}} 1",
        id,
        escape_label(&p.config().endpoint),
        p.created_at().to_rfc3339()
    );

    let _ = writeln!(out, "# TYPE livestream_poller_state stateset");
    let _ = writeln!(out, "# HELP livestream_poller_state Current state of the status poller");
    let s = p.state().await.to_string();
    for variant in &["idle", "active", "stopping", "stopped"] {
        let _ = writeln!(
            out,
            "livestream_poller_state{{poller_id=\"{}\",state=\"{}\"}} {}",
            id,
            variant,
            if s == *variant { 1 } else { 0 }
        );
    }

    let _ = writeln!(out, "# TYPE livestream_poll_cycles counter");
    let _ = writeln!(out, "# HELP livestream_poll_cycles Status query cycles run");
    let _ = writeln!(out, "livestream_poll_cycles_total{{poller_id=\"{}\"}} {}", id, stats.cycles);

    let _ = writeln!(out, "# TYPE livestream_poll_failures counter");
    let _ = writeln!(out, "# HELP livestream_poll_failures Status query cycles that failed");
    let _ = writeln!(
        out,
        "livestream_poll_failures_total{{poller_id=\"{}\"}} {}",
        id, stats.failures
    );

    let _ = writeln!(out, "# TYPE livestream_poll_set_size gauge");
    let _ = writeln!(out, "# HELP livestream_poll_set_size Channels the next cycle will check");
    let _ = writeln!(
        out,
        "livestream_poll_set_size{{poller_id=\"{}\"}} {}",
        id,
        stats.poll_set.len()
    );

    let _ = writeln!(out, "# TYPE livestream_channel_online gauge");
    let _ = writeln!(
        out,
        "# HELP livestream_channel_online 1 if the channel is marked online, 0 if offline"
    );
    for e in state.board.elements().await {
        let Some(visibility) = e.visibility else {
            continue;
        };
        let _ = writeln!(
            out,
            "livestream_channel_online{{poller_id=\"{}\",channel=\"{}\"}} {}",
            id,
            escape_label(&e.channel),
            if visibility == Visibility::Online { 1 } else { 0 }
        );
    }

    let _ = writeln!(out, "# TYPE livestream_last_check_timestamp_seconds gauge");
    let _ = writeln!(
        out,
        "# HELP livestream_last_check_timestamp_seconds Unix timestamp of the last cycle"
    );
    if let Some(t) = stats.last_checked {
        let secs = t.timestamp() as f64 + (t.timestamp_subsec_millis() as f64 / 1000.0);
        let _ = writeln!(
            out,
            "livestream_last_check_timestamp_seconds{{poller_id=\"{}\"}} {:.3}",
            id, secs
        );
    }

    let _ = writeln!(out, "# TYPE livestream_uptime_seconds gauge");
    let _ = writeln!(out, "# HELP livestream_uptime_seconds Time since the poller was created");
    let uptime = (chrono::Utc::now() - p.created_at()).num_milliseconds() as f64 / 1000.0;
    let _ = writeln!(
        out,
        "livestream_uptime_seconds{{poller_id=\"{}\"}} {:.3}",
        id, uptime
    );

    let _ = writeln!(out, "# EOF");

    (
        [(
            header::CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        out,
    )
}

/// Escape a label value: backslash, double quote and line feed.
fn escape_label(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}
