//! Frame encoding and decoding for the hub's socket.io channel.
//!
//! The hub speaks socket.io (protocol v4) over engine.io v3. Every
//! application message travels as an engine.io MESSAGE packet (`4`)
//! wrapping a socket.io EVENT packet (`2`), so the text on the wire is
//! `42` followed by a JSON array `[event_name, payload]`:
//!
//! ```text
//! 42["message",{"msg":"DeviceInfoDocGetList","seq":1}]
//! ```
//!
//! Outgoing frames are produced with serde so quoting and escaping are
//! always correct. Inbound frames are unwrapped structurally: the numeric
//! packet prefix is stripped, the first JSON value after it must be a
//! `[tag, payload]` array, and anything trailing that value is ignored. A
//! change in framing therefore surfaces as [`Error::Protocol`] instead of
//! a silently mangled payload.

use serde::Serialize;
use serde_json::Value;

use crate::error::Error;
use crate::models::DeviceSnapshot;

/// Packet prefix for an engine.io MESSAGE carrying a socket.io EVENT.
pub const EVENT_PACKET_PREFIX: &str = "42";

/// socket.io event name the hub uses for request/response traffic.
pub const MESSAGE_EVENT: &str = "message";

/// Message type of the device list request (and its response).
pub const DEVICE_LIST_MSG: &str = "DeviceInfoDocGetList";

/// Message type of the device command request.
pub const DEVICE_SET_MSG: &str = "DeviceInfoSet";

/// Event marker the hub emits when device state changes.
pub const DATA_UPDATE_MARKER: &str = "DataUpdate";

const DEVICE_SET_DATATYPE: &str = "DeviceInfoSetType";
const SWITCH_MODE_COMMAND: &str = "security-panel.switch-mode";
const QUERY_SEQ: u32 = 1;
const COMMAND_SEQ: u32 = 2;

// ── Frame newtypes ───────────────────────────────────────────────────

/// Literal outgoing text for a mode-change command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame(String);

/// Literal outgoing text for the "list all devices" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFrame(String);

/// An inbound text message, opaque until decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame(String);

macro_rules! frame_text {
    ($($ty:ident),+) => {$(
        impl $ty {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    )+};
}

frame_text!(CommandFrame, QueryFrame, RawFrame);

impl RawFrame {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.0.contains(marker)
    }
}

impl From<String> for RawFrame {
    fn from(text: String) -> Self {
        Self(text)
    }
}

// ── Outgoing payloads ────────────────────────────────────────────────
//
// Field order here is wire order.

#[derive(Serialize)]
struct QueryPayload {
    msg: &'static str,
    seq: u32,
}

#[derive(Serialize)]
struct CommandPayload<'a> {
    msg: &'static str,
    datatype: &'static str,
    body: [CommandTarget<'a>; 1],
    seq: u32,
}

#[derive(Serialize)]
struct CommandTarget<'a> {
    zid: &'a str,
    command: CommandSet<'a>,
}

#[derive(Serialize)]
struct CommandSet<'a> {
    v1: [DeviceCommand<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceCommand<'a> {
    command_type: &'static str,
    data: ModeData<'a>,
}

#[derive(Serialize)]
struct ModeData<'a> {
    mode: &'a str,
}

/// Serialize `[MESSAGE_EVENT, payload]` behind the event packet prefix.
fn wrap_event(payload: &impl Serialize) -> Result<String, Error> {
    let array =
        serde_json::to_string(&(MESSAGE_EVENT, payload)).map_err(|e| Error::Serialization {
            message: e.to_string(),
            payload: String::new(),
        })?;
    Ok(format!("{EVENT_PACKET_PREFIX}{array}"))
}

// ── Encoding ─────────────────────────────────────────────────────────

/// Encode a `security-panel.switch-mode` command for device `zid`.
///
/// `mode` is transmitted verbatim; the hub understands `none`, `some` and
/// `all`. Validating it is the caller's business.
pub fn encode_command(zid: &str, mode: &str) -> Result<CommandFrame, Error> {
    let payload = CommandPayload {
        msg: DEVICE_SET_MSG,
        datatype: DEVICE_SET_DATATYPE,
        body: [CommandTarget {
            zid,
            command: CommandSet {
                v1: [DeviceCommand {
                    command_type: SWITCH_MODE_COMMAND,
                    data: ModeData { mode },
                }],
            },
        }],
        seq: COMMAND_SEQ,
    };
    wrap_event(&payload).map(CommandFrame)
}

/// Encode the request for a full device list.
pub fn encode_query() -> Result<QueryFrame, Error> {
    wrap_event(&QueryPayload {
        msg: DEVICE_LIST_MSG,
        seq: QUERY_SEQ,
    })
    .map(QueryFrame)
}

// ── Decoding ─────────────────────────────────────────────────────────

/// Unwrap an inbound event frame into its `(tag, payload)` pair.
pub fn unwrap_event(raw: &RawFrame) -> Result<(String, Value), Error> {
    if raw.is_empty() {
        return Err(Error::EmptyFrame);
    }

    let text = raw.as_str();
    let body = text.trim_start_matches(|c: char| c.is_ascii_digit());
    if body.len() == text.len() {
        return Err(protocol_error("missing packet type prefix", text));
    }

    // Only the first value counts; trailing transport bytes are dropped.
    let mut values = serde_json::Deserializer::from_str(body).into_iter::<Value>();
    let array = match values.next() {
        Some(Ok(Value::Array(array))) => array,
        Some(Ok(_)) => return Err(protocol_error("event packet is not an array", text)),
        Some(Err(e)) => return Err(protocol_error(&e.to_string(), text)),
        None => return Err(protocol_error("event packet has no body", text)),
    };

    let mut items = array.into_iter();
    let tag = match items.next() {
        Some(Value::String(tag)) => tag,
        _ => return Err(protocol_error("event packet has no type tag", text)),
    };
    let payload = items
        .next()
        .ok_or_else(|| protocol_error("event packet has no payload", text))?;

    Ok((tag, payload))
}

/// Decode an inbound frame into a [`DeviceSnapshot`].
pub fn decode_frame(raw: &RawFrame) -> Result<DeviceSnapshot, Error> {
    let (tag, payload) = unwrap_event(raw)?;
    tracing::trace!(tag = %tag, "decoding snapshot payload");

    if !payload.is_object() {
        return Err(protocol_error("event payload is not an object", raw.as_str()));
    }

    serde_json::from_value(payload.clone()).map_err(|e| Error::Serialization {
        message: e.to_string(),
        payload: payload.to_string(),
    })
}

fn protocol_error(message: &str, frame: &str) -> Error {
    let preview: String = frame.chars().take(200).collect();
    Error::Protocol {
        message: message.to_owned(),
        frame: preview,
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_frame_is_literal() {
        insta::assert_snapshot!(
            encode_query().unwrap().as_str(),
            @r#"42["message",{"msg":"DeviceInfoDocGetList","seq":1}]"#
        );
    }

    #[test]
    fn command_frame_is_literal() {
        insta::assert_snapshot!(
            encode_command("Z1", "some").unwrap().as_str(),
            @r#"42["message",{"msg":"DeviceInfoSet","datatype":"DeviceInfoSetType","body":[{"zid":"Z1","command":{"v1":[{"commandType":"security-panel.switch-mode","data":{"mode":"some"}}]}}],"seq":2}]"#
        );
    }

    #[test]
    fn command_frame_carries_zid_and_mode() {
        let frame = encode_command("Z1", "some").unwrap();
        assert!(frame.as_str().contains(r#""zid":"Z1""#));
        assert!(frame.as_str().contains(r#""data":{"mode":"some"}"#));
    }

    #[test]
    fn command_encoding_is_deterministic() {
        let pairs = [
            ("", ""),
            ("Z1", "some"),
            ("zone \"7\"", "all"),
            ("a\\b", "mode\nwith\tcontrol"),
            ("ünïcødé", "none"),
        ];
        for (zid, mode) in pairs {
            assert_eq!(encode_command(zid, mode).unwrap(), encode_command(zid, mode).unwrap());
        }
    }

    #[test]
    fn command_encoding_escapes_quotes() {
        let frame = encode_command("zone\"7", "so\"me").unwrap();
        assert!(frame.as_str().contains(r#""zid":"zone\"7""#));

        // The escaped frame must survive a structural round trip.
        let (tag, payload) = unwrap_event(&RawFrame::new(frame.into_string())).unwrap();
        assert_eq!(tag, "message");
        assert_eq!(payload["body"][0]["zid"], "zone\"7");
        assert_eq!(payload["body"][0]["command"]["v1"][0]["data"]["mode"], "so\"me");
    }

    #[test]
    fn unserializable_payload_is_an_error() {
        let payload = std::collections::BTreeMap::from([(vec![1_u8], 1_u8)]);
        assert!(matches!(
            wrap_event(&payload),
            Err(Error::Serialization { .. })
        ));
    }

    #[test]
    fn empty_strings_are_passed_through() {
        let frame = encode_command("", "").unwrap();
        assert!(frame.as_str().contains(r#""zid":"""#));
        assert!(frame.as_str().contains(r#""data":{"mode":""}"#));
    }

    #[test]
    fn decode_captured_sample() {
        let raw = RawFrame::new(
            r#"42["message",{"msg":"DeviceInfoDocGetList","seq":1,"body":[{"general":{"v2":{"zid":"abc"}}}]}]"#,
        );
        let snap = decode_frame(&raw).unwrap();
        assert_eq!(snap.msg, "DeviceInfoDocGetList");
        assert_eq!(snap.seq, Some(1));
        assert_eq!(snap.body.len(), 1);
        assert_eq!(snap.body[0].general.v2.zid.as_deref(), Some("abc"));
    }

    #[test]
    fn decode_tolerates_null_and_partial_sections() {
        let raw = RawFrame::new(
            r#"42["message",{"msg":"DeviceInfoDocGetList","body":[
                {"general":{"v2":{"zid":"abc","tags":null}}},
                {"general":{"v2":{"zid":"def"}},"device":null},
                {"general":{"v2":{"zid":"ghi"}},"impulse":{"v1":[{}]}}
            ]}]"#,
        );
        let snap = decode_frame(&raw).unwrap();
        assert_eq!(snap.body.len(), 3);

        let abc = snap.device("abc").unwrap();
        assert!(abc.general.v2.tags.is_empty());
        assert!(!snap.device("def").unwrap().faulted());
        assert_eq!(snap.device("ghi").unwrap().impulse_types().count(), 0);
    }

    #[test]
    fn decode_ignores_trailing_transport_bytes() {
        let raw = RawFrame::new(
            r#"42["message",{"msg":"DeviceInfoDocGetList","body":[]}]\u001e"#,
        );
        let snap = decode_frame(&raw).unwrap();
        assert!(snap.body.is_empty());
    }

    #[test]
    fn decode_accepts_other_event_tags() {
        let raw = RawFrame::new(r#"42["DataUpdate",{"msg":"DataUpdate","body":[]}]"#);
        assert_eq!(decode_frame(&raw).unwrap().msg, "DataUpdate");
    }

    #[test]
    fn decode_empty_frame() {
        assert!(matches!(
            decode_frame(&RawFrame::new("")),
            Err(Error::EmptyFrame)
        ));
    }

    #[test]
    fn decode_rejects_unknown_framing() {
        for text in [
            r#"["message",{"msg":"x"}]"#,
            "42not json",
            r#"42{"msg":"x"}"#,
            "42[]",
            r#"42[1,{"msg":"x"}]"#,
            r#"42["message"]"#,
            r#"42["message","text payload"]"#,
            "40",
        ] {
            let result = decode_frame(&RawFrame::new(text));
            assert!(
                matches!(result, Err(Error::Protocol { .. })),
                "expected protocol error for {text:?}, got {result:?}"
            );
        }
    }

    #[test]
    fn decode_reports_missing_fields_separately() {
        let raw = RawFrame::new(r#"42["message",{"seq":1,"body":[]}]"#);
        assert!(matches!(
            decode_frame(&raw),
            Err(Error::Serialization { .. })
        ));
    }
}
