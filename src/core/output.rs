//! Terminal and JSON rendering shared by the CLI commands.

use crate::core::time;
use serde_json::{Map, Value};

/// Bumped when a field is removed or changes meaning.
pub const ENVELOPE_VERSION: u32 = 1;

/// Flatten `message` onto one line and cut it at `width` characters.
pub fn preview(message: &str, width: usize) -> String {
    let flat = message.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(width) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

/// Wrap a command result for `--format json`.
///
/// Object payloads are merged at the top level; anything else lands under
/// `"data"`. Header fields win over payload keys of the same name.
pub fn envelope(cmd: &str, status: &str, payload: Value) -> Value {
    let mut out = match payload {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => Map::from_iter([("data".to_string(), other)]),
    };
    out.insert("envelope_version".into(), ENVELOPE_VERSION.into());
    out.insert("waymark".into(), env!("CARGO_PKG_VERSION").into());
    out.insert("ts".into(), time::now_epoch_z().into());
    out.insert("event_id".into(), time::new_event_id().into());
    out.insert("cmd".into(), cmd.into());
    out.insert("status".into(), status.into());
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preview_flattens_whitespace() {
        assert_eq!(
            preview("Implementation\n  complete", 80),
            "Implementation complete"
        );
    }

    #[test]
    fn preview_cuts_on_char_boundary() {
        assert_eq!(preview("ééééé", 3), "ééé...");
        assert_eq!(preview("abc", 3), "abc");
    }

    #[test]
    fn envelope_merges_object_payload() {
        let out = envelope("save", "ok", json!({"checkpoint": {"sequence": 3}}));
        assert_eq!(out["cmd"], "save");
        assert_eq!(out["status"], "ok");
        assert_eq!(out["envelope_version"], ENVELOPE_VERSION);
        assert_eq!(out["waymark"], env!("CARGO_PKG_VERSION"));
        assert_eq!(out["checkpoint"]["sequence"], 3);
        assert!(out["event_id"].is_string());
    }

    #[test]
    fn envelope_header_wins_and_scalars_nest() {
        let out = envelope("latest", "ok", json!({"status": "spoofed"}));
        assert_eq!(out["status"], "ok");

        let out = envelope("agents", "ok", json!([1, 2]));
        assert_eq!(out["data"], json!([1, 2]));
    }
}
