//! HTML fragment with one element per channel, carrying the same ids and
//! classes a page stylesheet targets.

use std::fmt::Write;

use axum::extract::State;
use axum::response::Html;

use livestream_core::Element;

use crate::state::AppState;

/// GET /widget
pub async fn widget(State(state): State<AppState>) -> Html<String> {
    Html(render(&state.board.elements().await))
}

pub fn render(elements: &[Element]) -> String {
    let mut out = String::with_capacity(128 * elements.len().max(1));
    for e in elements {
        let _ = writeln!(
            out,
            "<div id=\"{}\" class=\"{}\" data-channel=\"{}\"></div>",
            escape(&e.id),
            escape(&e.classes.join(" ")),
            escape(&e.channel),
        );
    }
    out
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
