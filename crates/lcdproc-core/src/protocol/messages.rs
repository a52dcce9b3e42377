//! All LCDproc control-protocol message types.
//!
//! Outbound traffic is modelled as the [`Command`] enum, inbound traffic as
//! the [`ServerMessage`] enum.  The wire rendering and parsing live in
//! [`crate::protocol::codec`].

use std::fmt;

use crate::domain::ids::{ScreenId, WidgetId};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Default TCP port LCDd listens on.
pub const DEFAULT_PORT: u16 = 13666;

// ── Capabilities ──────────────────────────────────────────────────────────────

/// A width/height pair, used both for display size (in character cells) and
/// cell size (in pixels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellArea {
    pub width: u32,
    pub height: u32,
}

/// Display capabilities reported by the server in its `connect` greeting.
///
/// All fields are zero/empty until the handshake completes; they are
/// populated atomically when the greeting line is parsed and never change
/// afterwards for the lifetime of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Server version string (the value after the `LCDproc` key).
    pub version: String,
    /// Protocol version string (the value after the `protocol` key).
    pub protocol_version: String,
    /// Display size in character cells (`wid` × `hgt`).
    pub size: CellArea,
    /// Size of one character cell in pixels (`cellwid` × `cellhgt`).
    pub cell_size: CellArea,
}

impl Capabilities {
    /// Whether the greeting has been parsed (true once the handshake reached
    /// the ready state).
    pub fn is_negotiated(&self) -> bool {
        !self.version.is_empty()
    }
}

// ── Widget kinds ──────────────────────────────────────────────────────────────

/// The six widget kinds understood by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// A full-width title bar; one per screen.
    Title,
    /// A text string at a grid position.
    String,
    /// A horizontal bar gauge growing to the right.
    HorizontalBar,
    /// A vertical bar gauge growing upwards.
    VerticalBar,
    /// A named icon from the server's fixed vocabulary.
    Icon,
    /// A large multi-cell digit (1–10, where 10 renders a colon).
    BigNumber,
}

impl WidgetKind {
    /// The type token sent in `widget_add`.
    pub fn wire_name(self) -> &'static str {
        match self {
            WidgetKind::Title => "title",
            WidgetKind::String => "string",
            WidgetKind::HorizontalBar => "hbar",
            WidgetKind::VerticalBar => "vbar",
            WidgetKind::Icon => "icon",
            WidgetKind::BigNumber => "num",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ── Positional parameters ─────────────────────────────────────────────────────

/// One positional parameter of a `widget_set` command.
///
/// The distinction matters only for rendering: quoted parameters are wrapped
/// in `{…}` because their content may contain whitespace, bare words and
/// integers are emitted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// An integer token (grid coordinates, bar lengths, digits).
    Int(i64),
    /// A bare single-word token (icon names).
    Word(String),
    /// A brace-quoted free-text token (titles, string contents).
    Quoted(String),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Int(n) => write!(f, "{n}"),
            Param::Word(w) => f.write_str(w),
            Param::Quoted(s) => write!(f, "{{{s}}}"),
        }
    }
}

// ── Screen options ────────────────────────────────────────────────────────────

/// Screen priority classes accepted by `screen_set -priority`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Hidden,
    Background,
    Info,
    Foreground,
    Alert,
    Input,
}

impl Priority {
    pub fn wire_name(self) -> &'static str {
        match self {
            Priority::Hidden => "hidden",
            Priority::Background => "background",
            Priority::Info => "info",
            Priority::Foreground => "foreground",
            Priority::Alert => "alert",
            Priority::Input => "input",
        }
    }
}

/// Heartbeat display modes accepted by `screen_set -heartbeat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heartbeat {
    On,
    Off,
    /// Defer to the server-wide setting.
    Open,
}

impl Heartbeat {
    pub fn wire_name(self) -> &'static str {
        match self {
            Heartbeat::On => "on",
            Heartbeat::Off => "off",
            Heartbeat::Open => "open",
        }
    }
}

/// Backlight modes accepted by `screen_set -backlight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backlight {
    On,
    Off,
    /// Defer to the server-wide setting.
    Open,
    Toggle,
    Blink,
    Flash,
}

impl Backlight {
    pub fn wire_name(self) -> &'static str {
        match self {
            Backlight::On => "on",
            Backlight::Off => "off",
            Backlight::Open => "open",
            Backlight::Toggle => "toggle",
            Backlight::Blink => "blink",
            Backlight::Flash => "flash",
        }
    }
}

/// Cursor styles accepted by `screen_set -cursor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    On,
    Off,
    Under,
    Block,
}

impl CursorStyle {
    pub fn wire_name(self) -> &'static str {
        match self {
            CursorStyle::On => "on",
            CursorStyle::Off => "off",
            CursorStyle::Under => "under",
            CursorStyle::Block => "block",
        }
    }
}

/// One recognized `screen_set` option.
///
/// The option vocabulary is closed; unrecognized keys cannot be expressed.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenOption {
    /// Human-readable screen name (brace-quoted on the wire).
    Name(String),
    /// Screen width in cells; defaults to the full display.
    Width(u32),
    /// Screen height in cells; defaults to the full display.
    Height(u32),
    /// Rotation priority class.
    Priority(Priority),
    /// Heartbeat indicator mode.
    Heartbeat(Heartbeat),
    /// Backlight mode while this screen is visible.
    Backlight(Backlight),
    /// How long the screen stays visible per rotation, in eighths of a second.
    Duration(u32),
    /// Remove the screen after this many eighths of a second.
    Timeout(u32),
    /// Cursor style while this screen is visible.
    Cursor(CursorStyle),
    /// Cursor column (1-based).
    CursorX(u32),
    /// Cursor row (1-based).
    CursorY(u32),
}

impl ScreenOption {
    /// The wire key, without the leading dash.
    pub fn key(&self) -> &'static str {
        match self {
            ScreenOption::Name(_) => "name",
            ScreenOption::Width(_) => "wid",
            ScreenOption::Height(_) => "hgt",
            ScreenOption::Priority(_) => "priority",
            ScreenOption::Heartbeat(_) => "heartbeat",
            ScreenOption::Backlight(_) => "backlight",
            ScreenOption::Duration(_) => "duration",
            ScreenOption::Timeout(_) => "timeout",
            ScreenOption::Cursor(_) => "cursor",
            ScreenOption::CursorX(_) => "cursor_x",
            ScreenOption::CursorY(_) => "cursor_y",
        }
    }

    /// The wire value token, quoted where the content may contain whitespace.
    pub fn value(&self) -> String {
        match self {
            ScreenOption::Name(name) => crate::protocol::codec::quote(name),
            ScreenOption::Width(n)
            | ScreenOption::Height(n)
            | ScreenOption::Duration(n)
            | ScreenOption::Timeout(n)
            | ScreenOption::CursorX(n)
            | ScreenOption::CursorY(n) => n.to_string(),
            ScreenOption::Priority(p) => p.wire_name().to_string(),
            ScreenOption::Heartbeat(h) => h.wire_name().to_string(),
            ScreenOption::Backlight(b) => b.wire_name().to_string(),
            ScreenOption::Cursor(c) => c.wire_name().to_string(),
        }
    }
}

// ── Outbound commands ─────────────────────────────────────────────────────────

/// One outbound protocol command.
///
/// Rendered to a wire line by [`crate::protocol::codec::encode_command`];
/// the sender appends the newline terminator.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Opens the handshake.
    Hello,
    /// Registers the client's display name after the greeting.
    SetClientName { name: String },
    /// `screen_add <id>`
    ScreenAdd { screen: ScreenId },
    /// `screen_set <id> [-key value]...` with only the newly supplied
    /// options, in caller order.
    ScreenSet {
        screen: ScreenId,
        options: Vec<ScreenOption>,
    },
    /// `screen_del <id>`
    ScreenDel { screen: ScreenId },
    /// `widget_add <screen> <widget> <type>`
    WidgetAdd {
        screen: ScreenId,
        widget: WidgetId,
        kind: WidgetKind,
    },
    /// `widget_set <screen> <widget> <param>...`
    WidgetSet {
        screen: ScreenId,
        widget: WidgetId,
        params: Vec<Param>,
    },
    /// `widget_del <screen> <widget>`
    WidgetDel { screen: ScreenId, widget: WidgetId },
}

// ── Inbound messages ──────────────────────────────────────────────────────────

/// One inbound line from the server, parsed by
/// [`crate::protocol::codec::parse_line`].
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// The handshake greeting carrying the negotiated capabilities.
    Connect(Capabilities),
    /// Positive acknowledgement of the previous command; carries no data.
    Success,
    /// The named screen became visible on the display.
    Listen(ScreenId),
    /// The named screen was hidden.
    Ignore(ScreenId),
    /// Negative acknowledgement (`huh? <reason>`); the server rejected a
    /// command.
    Huh(String),
    /// Any line this client does not recognize.  Surfaced to callers rather
    /// than silently dropped, so protocol drift is observable.
    Unknown(String),
}
