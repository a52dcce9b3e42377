//! Widget handles: positioned display primitives on a screen.
//!
//! One [`Widget`] value type covers all six kinds; kind-specific operations
//! check the tag and fail with [`ClientError::KindMismatch`] when misused.
//! Every full set caches its parameter list in the shared registry, and the
//! partial updates (`set_pos`, `set_label`, `set_value`, `set_icon_name`)
//! rebuild the missing positions from that cache.
//!
//! All grid coordinates are 1-based character cells.  Bar lengths are
//! derived from the negotiated display geometry, so bar widgets render
//! meaningless (zero) lengths before the connection reaches `Ready`.

use std::sync::Arc;

use lcdproc_core::{Capabilities, Command, Param, ScreenId, WidgetId, WidgetKind};
use tokio::sync::Mutex;
use tracing::debug;

use crate::connection::{send_command, Shared, WidgetRecord};
use crate::error::ClientError;

/// Handle to one widget registered on a screen.
///
/// Created by the factory methods on [`crate::Screen`].  Cheap to clone;
/// the cached parameter state lives in the shared registry, so partial
/// updates observe full sets made through any clone.
#[derive(Clone)]
pub struct Widget {
    id: WidgetId,
    screen: ScreenId,
    kind: WidgetKind,
    shared: Arc<Mutex<Shared>>,
}

/// Computes the pixel length of a bar widget.
///
/// - horizontal: `round((size.width − x + 1) × cell_size.width × fraction)`
/// - vertical:   `round(y × cell_size.height × fraction)`
fn bar_length(caps: &Capabilities, kind: WidgetKind, x: i64, y: i64, fraction: f64) -> i64 {
    let full_pixels = match kind {
        WidgetKind::HorizontalBar => {
            (caps.size.width as f64 - x as f64 + 1.0) * caps.cell_size.width as f64
        }
        WidgetKind::VerticalBar => y as f64 * caps.cell_size.height as f64,
        _ => 0.0,
    };
    (full_pixels * fraction).round() as i64
}

/// The cached `(x, y)` of the most recent full set, defaulting to `(1, 1)`
/// when no full set has happened yet.
fn cached_position(record: &WidgetRecord) -> (i64, i64) {
    match record.last_params.as_deref() {
        Some([Param::Int(x), Param::Int(y), ..]) => (*x, *y),
        _ => (1, 1),
    }
}

impl Widget {
    pub(crate) fn new(
        id: WidgetId,
        screen: ScreenId,
        kind: WidgetKind,
        shared: Arc<Mutex<Shared>>,
    ) -> Self {
        Self {
            id,
            screen,
            kind,
            shared,
        }
    }

    /// The generated widget id (`<screenId>_w<N>`, or `<screenId>_wTITLE`).
    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    /// The id of the owning screen.
    pub fn screen_id(&self) -> &ScreenId {
        &self.screen
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    fn ensure_kind(
        &self,
        operation: &'static str,
        allowed: &[WidgetKind],
    ) -> Result<(), ClientError> {
        if allowed.contains(&self.kind) {
            Ok(())
        } else {
            Err(ClientError::KindMismatch {
                widget: self.id.clone(),
                operation,
                actual: self.kind,
            })
        }
    }

    /// Looks up this widget's registry record, failing with a stale-handle
    /// error when the screen or widget has been deleted.
    fn record_mut<'a>(&self, guard: &'a mut Shared) -> Result<&'a mut WidgetRecord, ClientError> {
        let screen = guard
            .screens
            .get_mut(&self.screen)
            .ok_or_else(|| ClientError::StaleScreen(self.screen.clone()))?;
        screen
            .widgets
            .get_mut(&self.id)
            .ok_or_else(|| ClientError::StaleWidget(self.id.clone()))
    }

    /// Records `params` as the widget's last full parameter set and sends
    /// `widget_set`.
    async fn store_and_send(
        &self,
        guard: &mut Shared,
        params: Vec<Param>,
    ) -> Result<(), ClientError> {
        let record = self.record_mut(guard)?;
        record.last_params = Some(params.clone());
        send_command(
            guard,
            &Command::WidgetSet {
                screen: self.screen.clone(),
                widget: self.id.clone(),
                params,
            },
        )
        .await
    }

    /// Sends a raw positional parameter list.  The typed operations below
    /// are preferable; this is the escape hatch for parameters this client
    /// does not model.
    pub async fn set_params(&self, params: Vec<Param>) -> Result<(), ClientError> {
        let mut guard = self.shared.lock().await;
        self.store_and_send(&mut guard, params).await
    }

    // ── Full parameter sets ──────────────────────────────────────────────────

    /// Sets the text of a title widget.
    pub async fn set_title(&self, text: &str) -> Result<(), ClientError> {
        self.ensure_kind("set_title", &[WidgetKind::Title])?;
        let mut guard = self.shared.lock().await;
        self.store_and_send(&mut guard, vec![Param::Quoted(text.to_string())])
            .await
    }

    /// Places a string widget's text at `(x, y)`.
    pub async fn set_text(&self, x: u16, y: u16, text: &str) -> Result<(), ClientError> {
        self.ensure_kind("set_text", &[WidgetKind::String])?;
        let mut guard = self.shared.lock().await;
        self.store_and_send(
            &mut guard,
            vec![
                Param::Int(x.into()),
                Param::Int(y.into()),
                Param::Quoted(text.to_string()),
            ],
        )
        .await
    }

    /// Places a bar widget at `(x, y)` filled to `fraction` (0.0–1.0) of
    /// the available run.
    pub async fn set_percentage(&self, x: u16, y: u16, fraction: f64) -> Result<(), ClientError> {
        self.ensure_kind(
            "set_percentage",
            &[WidgetKind::HorizontalBar, WidgetKind::VerticalBar],
        )?;
        let mut guard = self.shared.lock().await;
        let length = bar_length(&guard.capabilities, self.kind, x.into(), y.into(), fraction);
        self.store_and_send(
            &mut guard,
            vec![Param::Int(x.into()), Param::Int(y.into()), Param::Int(length)],
        )
        .await
    }

    /// Places an icon at `(x, y)`.  The name comes from the server's fixed
    /// vocabulary (e.g. `HEART`, `ARROW_UP`) and is not validated locally;
    /// an unknown name comes back as a `huh?` event.
    pub async fn set_icon(&self, x: u16, y: u16, name: &str) -> Result<(), ClientError> {
        self.ensure_kind("set_icon", &[WidgetKind::Icon])?;
        let mut guard = self.shared.lock().await;
        self.store_and_send(
            &mut guard,
            vec![
                Param::Int(x.into()),
                Param::Int(y.into()),
                Param::Word(name.to_string()),
            ],
        )
        .await
    }

    /// Places a big-number widget at column `x` showing `digit` (1–10,
    /// where 10 renders a colon).  The range is not validated locally.
    pub async fn set_digit(&self, x: u16, digit: u8) -> Result<(), ClientError> {
        self.ensure_kind("set_digit", &[WidgetKind::BigNumber])?;
        let mut guard = self.shared.lock().await;
        self.store_and_send(
            &mut guard,
            vec![Param::Int(x.into()), Param::Int(digit.into())],
        )
        .await
    }

    // ── Partial updates ──────────────────────────────────────────────────────

    /// Moves the widget to `(x, y)` keeping the rest of the cached
    /// parameters.  Before any full set the remaining parameter defaults to
    /// the integer `0`.
    pub async fn set_pos(&self, x: u16, y: u16) -> Result<(), ClientError> {
        self.ensure_kind(
            "set_pos",
            &[
                WidgetKind::String,
                WidgetKind::HorizontalBar,
                WidgetKind::VerticalBar,
                WidgetKind::Icon,
            ],
        )?;
        let mut guard = self.shared.lock().await;
        let tail: Vec<Param> = match self.record_mut(&mut guard)?.last_params.as_deref() {
            Some(params) => params.get(2..).unwrap_or(&[]).to_vec(),
            None => vec![Param::Int(0)],
        };
        let mut params = vec![Param::Int(x.into()), Param::Int(y.into())];
        params.extend(tail);
        self.store_and_send(&mut guard, params).await
    }

    /// Replaces a string widget's text, reusing the cached position
    /// (default `(1, 1)` before any full set).
    pub async fn set_label(&self, text: &str) -> Result<(), ClientError> {
        self.ensure_kind("set_label", &[WidgetKind::String])?;
        let mut guard = self.shared.lock().await;
        let (x, y) = cached_position(self.record_mut(&mut guard)?);
        self.store_and_send(
            &mut guard,
            vec![Param::Int(x), Param::Int(y), Param::Quoted(text.to_string())],
        )
        .await
    }

    /// Refills a bar widget to `fraction`, recomputing the length from the
    /// cached position (default `(1, 1)` before any full set).
    pub async fn set_value(&self, fraction: f64) -> Result<(), ClientError> {
        self.ensure_kind(
            "set_value",
            &[WidgetKind::HorizontalBar, WidgetKind::VerticalBar],
        )?;
        let mut guard = self.shared.lock().await;
        let (x, y) = cached_position(self.record_mut(&mut guard)?);
        let length = bar_length(&guard.capabilities, self.kind, x, y, fraction);
        self.store_and_send(
            &mut guard,
            vec![Param::Int(x), Param::Int(y), Param::Int(length)],
        )
        .await
    }

    /// Replaces an icon widget's icon, reusing the cached position
    /// (default `(1, 1)` before any full set).
    pub async fn set_icon_name(&self, name: &str) -> Result<(), ClientError> {
        self.ensure_kind("set_icon_name", &[WidgetKind::Icon])?;
        let mut guard = self.shared.lock().await;
        let (x, y) = cached_position(self.record_mut(&mut guard)?);
        self.store_and_send(
            &mut guard,
            vec![Param::Int(x), Param::Int(y), Param::Word(name.to_string())],
        )
        .await
    }

    /// Sends `widget_del` and removes the widget from its screen's
    /// registry, staling all handles to it.
    ///
    /// # Errors
    ///
    /// Fails with a stale-handle error when already deleted.
    pub async fn delete(self) -> Result<(), ClientError> {
        let mut guard = self.shared.lock().await;
        let screen = guard
            .screens
            .get_mut(&self.screen)
            .ok_or_else(|| ClientError::StaleScreen(self.screen.clone()))?;
        if screen.widgets.remove(&self.id).is_none() {
            return Err(ClientError::StaleWidget(self.id.clone()));
        }
        debug!(widget = %self.id, "widget deleted");
        send_command(
            &mut guard,
            &Command::WidgetDel {
                screen: self.screen,
                widget: self.id,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcdproc_core::CellArea;

    fn caps_20x4() -> Capabilities {
        Capabilities {
            version: "0.5.7".to_string(),
            protocol_version: "0.3".to_string(),
            size: CellArea {
                width: 20,
                height: 4,
            },
            cell_size: CellArea {
                width: 5,
                height: 8,
            },
        }
    }

    #[test]
    fn test_hbar_length_full_from_column_one() {
        // round((20 − 1 + 1) × 5 × 1.0) = 100
        let len = bar_length(&caps_20x4(), WidgetKind::HorizontalBar, 1, 1, 1.0);
        assert_eq!(len, 100);
    }

    #[test]
    fn test_hbar_length_zero_fraction() {
        let len = bar_length(&caps_20x4(), WidgetKind::HorizontalBar, 1, 1, 0.0);
        assert_eq!(len, 0);
    }

    #[test]
    fn test_hbar_length_shrinks_with_start_column() {
        // round((20 − 11 + 1) × 5 × 0.5) = 25
        let len = bar_length(&caps_20x4(), WidgetKind::HorizontalBar, 11, 1, 0.5);
        assert_eq!(len, 25);
    }

    #[test]
    fn test_vbar_length_scales_with_row() {
        // round(4 × 8 × 0.5) = 16
        let len = bar_length(&caps_20x4(), WidgetKind::VerticalBar, 1, 4, 0.5);
        assert_eq!(len, 16);
    }

    #[test]
    fn test_bar_length_is_zero_before_handshake() {
        // All-zero capabilities: whatever the fraction, the result is 0.
        let len = bar_length(
            &Capabilities::default(),
            WidgetKind::VerticalBar,
            1,
            2,
            0.75,
        );
        assert_eq!(len, 0);
    }

    #[test]
    fn test_cached_position_defaults_to_origin() {
        let record = WidgetRecord {
            kind: WidgetKind::String,
            last_params: None,
        };
        assert_eq!(cached_position(&record), (1, 1));
    }

    #[test]
    fn test_cached_position_reads_leading_ints() {
        let record = WidgetRecord {
            kind: WidgetKind::String,
            last_params: Some(vec![
                Param::Int(3),
                Param::Int(2),
                Param::Quoted("x".to_string()),
            ]),
        };
        assert_eq!(cached_position(&record), (3, 2));
    }
}
