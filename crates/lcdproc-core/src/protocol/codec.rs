//! Text codec for the LCDproc control protocol.
//!
//! Wire format: newline-terminated UTF-8 lines of space-separated tokens.
//! Free-text tokens are brace-quoted:
//!
//! ```text
//! widget_set myapp_s0 myapp_s0_w1 1 2 {hello there}
//! ```
//!
//! Encoding ([`encode_command`]) and parsing ([`parse_line`]) are pure and
//! exact-format: the byte-for-byte line layout is what LCDd expects, so the
//! tests in this module pin the output strings literally.

use thiserror::Error;

use crate::domain::ids::ScreenId;
use crate::protocol::messages::{Capabilities, Command, ScreenOption, ServerMessage};

/// Errors that can occur while parsing an inbound line.
///
/// Unknown lines are *not* errors; they parse to
/// [`ServerMessage::Unknown`] so callers can observe them.  Parsing fails
/// only when the handshake greeting itself is malformed, because the
/// connection cannot proceed without valid capabilities.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// A numeric field of the `connect` greeting did not parse as an integer.
    #[error("malformed greeting field `{key}`: {value:?} is not an integer")]
    MalformedGreeting { key: String, value: String },
}

// ── Serializer utilities ──────────────────────────────────────────────────────

/// Wraps free text in the protocol's `{…}` quoting convention.
///
/// Required whenever a value may contain whitespace.
pub fn quote(text: &str) -> String {
    format!("{{{text}}}")
}

/// Converts ordered key/value pairs into the flat token sequence
/// `[prefix+key₁, value₁, prefix+key₂, value₂, …]`, preserving the input
/// order.  The prefix is `-` unless `dash_keys` is false.
pub fn flatten<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)], dash_keys: bool) -> Vec<String> {
    let prefix = if dash_keys { "-" } else { "" };
    let mut tokens = Vec::with_capacity(pairs.len() * 2);
    for (key, value) in pairs {
        tokens.push(format!("{prefix}{}", key.as_ref()));
        tokens.push(value.as_ref().to_string());
    }
    tokens
}

// ── Command encoding ──────────────────────────────────────────────────────────

/// Renders a [`Command`] to its wire line, without the trailing newline.
pub fn encode_command(cmd: &Command) -> String {
    match cmd {
        Command::Hello => "hello".to_string(),
        Command::SetClientName { name } => format!("client_set -name {}", quote(name)),
        Command::ScreenAdd { screen } => format!("screen_add {screen}"),
        Command::ScreenSet { screen, options } => {
            let mut line = format!("screen_set {screen}");
            for token in flatten_options(options) {
                line.push(' ');
                line.push_str(&token);
            }
            line
        }
        Command::ScreenDel { screen } => format!("screen_del {screen}"),
        Command::WidgetAdd {
            screen,
            widget,
            kind,
        } => format!("widget_add {screen} {widget} {kind}"),
        Command::WidgetSet {
            screen,
            widget,
            params,
        } => {
            let mut line = format!("widget_set {screen} {widget}");
            for param in params {
                line.push(' ');
                line.push_str(&param.to_string());
            }
            line
        }
        Command::WidgetDel { screen, widget } => format!("widget_del {screen} {widget}"),
    }
}

/// Flattens screen options into the dash-prefixed key/value token sequence,
/// preserving caller order.
fn flatten_options(options: &[ScreenOption]) -> Vec<String> {
    let pairs: Vec<(&str, String)> = options.iter().map(|o| (o.key(), o.value())).collect();
    flatten(&pairs, true)
}

// ── Line parsing ──────────────────────────────────────────────────────────────

/// Parses one inbound line (newline already stripped by the framing layer).
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedGreeting`] when a `connect` greeting
/// carries a non-numeric geometry field.  Every other unrecognized line is
/// `Ok(ServerMessage::Unknown(..))`.
pub fn parse_line(line: &str) -> Result<ServerMessage, ProtocolError> {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("connect") => parse_greeting(tokens).map(ServerMessage::Connect),
        Some("success") => Ok(ServerMessage::Success),
        Some("listen") => Ok(match tokens.next() {
            Some(id) => ServerMessage::Listen(ScreenId::from_raw(id)),
            None => ServerMessage::Unknown(line.to_string()),
        }),
        Some("ignore") => Ok(match tokens.next() {
            Some(id) => ServerMessage::Ignore(ScreenId::from_raw(id)),
            None => ServerMessage::Unknown(line.to_string()),
        }),
        Some("huh?") => {
            let reason = line.trim_start()["huh?".len()..].trim().to_string();
            Ok(ServerMessage::Huh(reason))
        }
        _ => Ok(ServerMessage::Unknown(line.to_string())),
    }
}

/// Parses the token stream after `connect` into [`Capabilities`].
///
/// Recognized keys consume the following token as their value; anything else
/// (such as the bare `lcd` marker some server versions emit) is skipped.
/// A recognized key at the end of the line with no value is ignored.
fn parse_greeting<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
) -> Result<Capabilities, ProtocolError> {
    let mut caps = Capabilities::default();
    while let Some(token) = tokens.next() {
        if !is_greeting_key(token) {
            continue;
        }
        let Some(value) = tokens.next() else { break };
        match token {
            "LCDproc" => caps.version = value.to_string(),
            "protocol" => caps.protocol_version = value.to_string(),
            "wid" => caps.size.width = parse_geometry(token, value)?,
            "hgt" => caps.size.height = parse_geometry(token, value)?,
            "cellwid" => caps.cell_size.width = parse_geometry(token, value)?,
            "cellhgt" => caps.cell_size.height = parse_geometry(token, value)?,
            _ => {}
        }
    }
    Ok(caps)
}

fn is_greeting_key(token: &str) -> bool {
    matches!(
        token,
        "LCDproc" | "protocol" | "wid" | "hgt" | "cellwid" | "cellhgt"
    )
}

fn parse_geometry(key: &str, value: &str) -> Result<u32, ProtocolError> {
    value
        .parse()
        .map_err(|_| ProtocolError::MalformedGreeting {
            key: key.to_string(),
            value: value.to_string(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::WidgetId;
    use crate::protocol::messages::{Param, Priority, WidgetKind};

    fn screen(n: u64) -> ScreenId {
        ScreenId::numbered("myapp", n)
    }

    // ── Serializer utilities ─────────────────────────────────────────────────

    #[test]
    fn test_quote_wraps_in_braces() {
        assert_eq!(quote("hi there"), "{hi there}");
        assert_eq!(quote(""), "{}");
    }

    #[test]
    fn test_flatten_dash_prefixes_keys_in_order() {
        let pairs = [("a", "1"), ("b", "2")];
        assert_eq!(flatten(&pairs, true), vec!["-a", "1", "-b", "2"]);
    }

    #[test]
    fn test_flatten_without_dash() {
        let pairs = [("name", "{x}")];
        assert_eq!(flatten(&pairs, false), vec!["name", "{x}"]);
    }

    #[test]
    fn test_flatten_empty_is_empty() {
        let pairs: [(&str, &str); 0] = [];
        assert!(flatten(&pairs, true).is_empty());
    }

    // ── Command encoding ─────────────────────────────────────────────────────

    #[test]
    fn test_encode_hello() {
        assert_eq!(encode_command(&Command::Hello), "hello");
    }

    #[test]
    fn test_encode_client_set_quotes_name() {
        let cmd = Command::SetClientName {
            name: "my client".to_string(),
        };
        assert_eq!(encode_command(&cmd), "client_set -name {my client}");
    }

    #[test]
    fn test_encode_screen_add() {
        let cmd = Command::ScreenAdd { screen: screen(0) };
        assert_eq!(encode_command(&cmd), "screen_add myapp_s0");
    }

    #[test]
    fn test_encode_screen_set_preserves_option_order() {
        let cmd = Command::ScreenSet {
            screen: screen(1),
            options: vec![
                ScreenOption::Priority(Priority::Alert),
                ScreenOption::Name("status page".to_string()),
                ScreenOption::Duration(32),
            ],
        };
        assert_eq!(
            encode_command(&cmd),
            "screen_set myapp_s1 -priority alert -name {status page} -duration 32"
        );
    }

    #[test]
    fn test_encode_screen_del() {
        let cmd = Command::ScreenDel { screen: screen(2) };
        assert_eq!(encode_command(&cmd), "screen_del myapp_s2");
    }

    #[test]
    fn test_encode_widget_add_with_type_token() {
        let s = screen(0);
        let cmd = Command::WidgetAdd {
            widget: WidgetId::numbered(&s, 0),
            screen: s,
            kind: WidgetKind::HorizontalBar,
        };
        assert_eq!(encode_command(&cmd), "widget_add myapp_s0 myapp_s0_w0 hbar");
    }

    #[test]
    fn test_encode_widget_set_mixed_params() {
        let s = screen(0);
        let cmd = Command::WidgetSet {
            widget: WidgetId::numbered(&s, 1),
            screen: s,
            params: vec![
                Param::Int(1),
                Param::Int(2),
                Param::Quoted("hello there".to_string()),
            ],
        };
        assert_eq!(
            encode_command(&cmd),
            "widget_set myapp_s0 myapp_s0_w1 1 2 {hello there}"
        );
    }

    #[test]
    fn test_encode_widget_set_word_param_unquoted() {
        let s = screen(0);
        let cmd = Command::WidgetSet {
            widget: WidgetId::numbered(&s, 3),
            screen: s,
            params: vec![Param::Int(4), Param::Int(1), Param::Word("HEART".to_string())],
        };
        assert_eq!(
            encode_command(&cmd),
            "widget_set myapp_s0 myapp_s0_w3 4 1 HEART"
        );
    }

    #[test]
    fn test_encode_widget_del() {
        let s = screen(0);
        let cmd = Command::WidgetDel {
            widget: WidgetId::title(&s),
            screen: s,
        };
        assert_eq!(encode_command(&cmd), "widget_del myapp_s0 myapp_s0_wTITLE");
    }

    // ── Greeting parsing ─────────────────────────────────────────────────────

    #[test]
    fn test_parse_full_greeting() {
        let msg =
            parse_line("connect LCDproc 0.5.7 protocol 0.3 wid 20 hgt 4 cellwid 5 cellhgt 8")
                .expect("greeting must parse");
        let ServerMessage::Connect(caps) = msg else {
            panic!("expected Connect, got {msg:?}");
        };
        assert_eq!(caps.version, "0.5.7");
        assert_eq!(caps.protocol_version, "0.3");
        assert_eq!(caps.size.width, 20);
        assert_eq!(caps.size.height, 4);
        assert_eq!(caps.cell_size.width, 5);
        assert_eq!(caps.cell_size.height, 8);
        assert!(caps.is_negotiated());
    }

    #[test]
    fn test_parse_greeting_skips_unknown_tokens() {
        // Real LCDd 0.5.x emits a bare `lcd` marker before the geometry keys.
        let msg = parse_line("connect LCDproc 0.5.9 protocol 0.3 lcd wid 16 hgt 2 cellwid 5 cellhgt 8")
            .unwrap();
        let ServerMessage::Connect(caps) = msg else {
            panic!("expected Connect");
        };
        assert_eq!(caps.size.width, 16);
        assert_eq!(caps.size.height, 2);
    }

    #[test]
    fn test_parse_greeting_with_non_numeric_geometry_fails() {
        let err = parse_line("connect LCDproc 0.5.7 protocol 0.3 wid twenty hgt 4").unwrap_err();
        assert_eq!(
            err,
            ProtocolError::MalformedGreeting {
                key: "wid".to_string(),
                value: "twenty".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_greeting_missing_fields_defaults_to_zero() {
        let msg = parse_line("connect LCDproc 0.5.7").unwrap();
        let ServerMessage::Connect(caps) = msg else {
            panic!("expected Connect");
        };
        assert_eq!(caps.size.width, 0);
        assert_eq!(caps.cell_size.height, 0);
    }

    // ── Notification parsing ─────────────────────────────────────────────────

    #[test]
    fn test_parse_success() {
        assert_eq!(parse_line("success").unwrap(), ServerMessage::Success);
    }

    #[test]
    fn test_parse_listen_and_ignore() {
        assert_eq!(
            parse_line("listen myapp_s0").unwrap(),
            ServerMessage::Listen(ScreenId::from_raw("myapp_s0"))
        );
        assert_eq!(
            parse_line("ignore myapp_s0").unwrap(),
            ServerMessage::Ignore(ScreenId::from_raw("myapp_s0"))
        );
    }

    #[test]
    fn test_parse_listen_without_id_is_unknown() {
        assert_eq!(
            parse_line("listen").unwrap(),
            ServerMessage::Unknown("listen".to_string())
        );
    }

    #[test]
    fn test_parse_huh_carries_reason() {
        assert_eq!(
            parse_line("huh? invalid command").unwrap(),
            ServerMessage::Huh("invalid command".to_string())
        );
    }

    #[test]
    fn test_parse_unrecognized_line_is_unknown() {
        assert_eq!(
            parse_line("key left").unwrap(),
            ServerMessage::Unknown("key left".to_string())
        );
    }

    #[test]
    fn test_parse_empty_line_is_unknown() {
        assert_eq!(
            parse_line("").unwrap(),
            ServerMessage::Unknown(String::new())
        );
    }
}
