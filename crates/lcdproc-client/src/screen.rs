//! Screen handles: one registered canvas on the display server.

use std::sync::Arc;

use lcdproc_core::{Command, ScreenId, ScreenOption, WidgetId, WidgetKind};
use tokio::sync::Mutex;
use tracing::debug;

use crate::connection::{send_command, Shared, WidgetRecord};
use crate::error::ClientError;
use crate::widget::Widget;

/// Handle to one screen registered with the server.
///
/// Created by [`crate::LcdClient::add_screen`].  Cheap to clone; all clones
/// refer to the same registry record.  After [`Screen::delete`] (or after
/// the connection closes) every operation fails with a stale-handle error
/// instead of emitting commands for a dead object.
#[derive(Clone)]
pub struct Screen {
    id: ScreenId,
    shared: Arc<Mutex<Shared>>,
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Merges `incoming` into `existing`, last-write-wins per option key,
/// appending options with new keys in their supplied order.
fn merge_options(existing: &mut Vec<ScreenOption>, incoming: &[ScreenOption]) {
    for option in incoming {
        match existing.iter_mut().find(|o| o.key() == option.key()) {
            Some(slot) => *slot = option.clone(),
            None => existing.push(option.clone()),
        }
    }
}

impl Screen {
    pub(crate) fn new(id: ScreenId, shared: Arc<Mutex<Shared>>) -> Self {
        Self { id, shared }
    }

    /// The generated screen id (`<clientName>_s<N>`).
    pub fn id(&self) -> &ScreenId {
        &self.id
    }

    /// Merges `options` into the stored configuration and sends
    /// `screen_set` with exactly the newly supplied options, in caller
    /// order.  An empty `options` is a no-op: nothing is stored, nothing is
    /// sent.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::StaleScreen`] after deletion, or
    /// [`ClientError::ConnectionClosed`] / [`ClientError::Io`] on transport
    /// problems.
    pub async fn set_config(&self, options: Vec<ScreenOption>) -> Result<(), ClientError> {
        if options.is_empty() {
            return Ok(());
        }

        let mut guard = self.shared.lock().await;
        let record = guard
            .screens
            .get_mut(&self.id)
            .ok_or_else(|| ClientError::StaleScreen(self.id.clone()))?;
        merge_options(&mut record.options, &options);

        send_command(
            &mut guard,
            &Command::ScreenSet {
                screen: self.id.clone(),
                options,
            },
        )
        .await
    }

    /// Sends `screen_del` and removes the screen (and all its widgets) from
    /// the registry.  `listen`/`ignore` notifications for the deleted id
    /// become silent no-ops afterwards.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::StaleScreen`] when already deleted.
    pub async fn delete(self) -> Result<(), ClientError> {
        let mut guard = self.shared.lock().await;
        if guard.screens.remove(&self.id).is_none() {
            return Err(ClientError::StaleScreen(self.id.clone()));
        }
        debug!(screen = %self.id, "screen deleted");
        send_command(
            &mut guard,
            &Command::ScreenDel {
                screen: self.id.clone(),
            },
        )
        .await
    }

    /// Registers a widget of the given kind on this screen and sends
    /// `widget_add`.
    ///
    /// Widget ids are `<screenId>_w<N>` with a per-screen counter, except
    /// the title widget, which uses the fixed id `<screenId>_wTITLE` and is
    /// idempotent: requesting it twice returns a handle to the existing
    /// widget without sending anything.
    ///
    /// # Errors
    ///
    /// Fails with [`ClientError::StaleScreen`] after deletion, or on
    /// transport problems.
    pub async fn add_widget(&self, kind: WidgetKind) -> Result<Widget, ClientError> {
        let mut guard = self.shared.lock().await;
        let record = guard
            .screens
            .get_mut(&self.id)
            .ok_or_else(|| ClientError::StaleScreen(self.id.clone()))?;

        let id = if kind == WidgetKind::Title {
            let id = WidgetId::title(&self.id);
            if record.widgets.contains_key(&id) {
                return Ok(Widget::new(id, self.id.clone(), kind, Arc::clone(&self.shared)));
            }
            id
        } else {
            let id = WidgetId::numbered(&self.id, record.next_widget);
            record.next_widget += 1;
            id
        };

        record.widgets.insert(
            id.clone(),
            WidgetRecord {
                kind,
                last_params: None,
            },
        );

        send_command(
            &mut guard,
            &Command::WidgetAdd {
                screen: self.id.clone(),
                widget: id.clone(),
                kind,
            },
        )
        .await?;

        Ok(Widget::new(id, self.id.clone(), kind, Arc::clone(&self.shared)))
    }

    /// Adds (or returns the existing) title widget.
    pub async fn add_title(&self) -> Result<Widget, ClientError> {
        self.add_widget(WidgetKind::Title).await
    }

    /// Adds a text string widget.
    pub async fn add_string(&self) -> Result<Widget, ClientError> {
        self.add_widget(WidgetKind::String).await
    }

    /// Adds a horizontal bar gauge.
    pub async fn add_horizontal_bar(&self) -> Result<Widget, ClientError> {
        self.add_widget(WidgetKind::HorizontalBar).await
    }

    /// Adds a vertical bar gauge.
    pub async fn add_vertical_bar(&self) -> Result<Widget, ClientError> {
        self.add_widget(WidgetKind::VerticalBar).await
    }

    /// Adds an icon widget.
    pub async fn add_icon(&self) -> Result<Widget, ClientError> {
        self.add_widget(WidgetKind::Icon).await
    }

    /// Adds a big-number widget.
    pub async fn add_big_number(&self) -> Result<Widget, ClientError> {
        self.add_widget(WidgetKind::BigNumber).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcdproc_core::Priority;

    #[test]
    fn test_merge_overwrites_existing_key_in_place() {
        let mut existing = vec![
            ScreenOption::Name("old".to_string()),
            ScreenOption::Duration(8),
        ];
        merge_options(
            &mut existing,
            &[ScreenOption::Name("new".to_string())],
        );
        assert_eq!(
            existing,
            vec![
                ScreenOption::Name("new".to_string()),
                ScreenOption::Duration(8),
            ]
        );
    }

    #[test]
    fn test_merge_appends_new_keys_in_supplied_order() {
        let mut existing = vec![ScreenOption::Name("s".to_string())];
        merge_options(
            &mut existing,
            &[
                ScreenOption::Priority(Priority::Alert),
                ScreenOption::Duration(16),
            ],
        );
        assert_eq!(existing.len(), 3);
        assert_eq!(existing[1], ScreenOption::Priority(Priority::Alert));
        assert_eq!(existing[2], ScreenOption::Duration(16));
    }

    #[test]
    fn test_merge_into_empty() {
        let mut existing = Vec::new();
        merge_options(&mut existing, &[ScreenOption::Heartbeat(lcdproc_core::Heartbeat::Off)]);
        assert_eq!(existing.len(), 1);
    }
}
