//! Screen and widget identifier newtypes.
//!
//! LCDd identifies every screen and widget by an opaque string chosen by the
//! client.  This client derives them deterministically:
//!
//! - screens:  `<clientName>_s<N>` with a per-connection counter starting at 0
//! - widgets:  `<screenId>_w<N>` with a per-screen counter starting at 0
//! - the title widget of a screen uses the fixed id `<screenId>_wTITLE`
//!
//! Counters are never reused within a connection's lifetime, so ids stay
//! unique even after deletions.

use std::fmt;

/// Identifier of a screen registered with the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScreenId(String);

impl ScreenId {
    /// Builds the id for the `index`-th screen of the named client.
    pub fn numbered(client_name: &str, index: u64) -> Self {
        Self(format!("{client_name}_s{index}"))
    }

    /// Wraps a raw id string received from the server (e.g. in a `listen`
    /// notification).  No format validation is applied: the server echoes
    /// back whatever id the client registered.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The wire representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a widget registered on a screen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WidgetId(String);

impl WidgetId {
    /// Builds the id for the `index`-th widget of a screen.
    pub fn numbered(screen: &ScreenId, index: u64) -> Self {
        Self(format!("{screen}_w{index}"))
    }

    /// Builds the fixed id used for a screen's title widget.
    ///
    /// Each screen has at most one title widget; requesting it twice must
    /// yield the same id, so the suffix is a constant rather than a counter.
    pub fn title(screen: &ScreenId) -> Self {
        Self(format!("{screen}_wTITLE"))
    }

    /// The wire representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_id_format() {
        let id = ScreenId::numbered("myapp", 0);
        assert_eq!(id.as_str(), "myapp_s0");
        assert_eq!(ScreenId::numbered("myapp", 7).as_str(), "myapp_s7");
    }

    #[test]
    fn test_widget_id_format() {
        let screen = ScreenId::numbered("myapp", 2);
        assert_eq!(WidgetId::numbered(&screen, 0).as_str(), "myapp_s2_w0");
        assert_eq!(WidgetId::numbered(&screen, 11).as_str(), "myapp_s2_w11");
    }

    #[test]
    fn test_title_widget_id_is_fixed_per_screen() {
        let screen = ScreenId::numbered("myapp", 0);
        let a = WidgetId::title(&screen);
        let b = WidgetId::title(&screen);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "myapp_s0_wTITLE");
    }

    #[test]
    fn test_ids_are_unique_across_counters() {
        let screen = ScreenId::numbered("c", 0);
        let ids: Vec<WidgetId> = (0..50).map(|i| WidgetId::numbered(&screen, i)).collect();
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn test_from_raw_round_trips_display() {
        let id = ScreenId::from_raw("other_s3");
        assert_eq!(id.to_string(), "other_s3");
    }
}
