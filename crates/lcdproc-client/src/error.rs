//! Error taxonomy for client operations.

use lcdproc_core::{ScreenId, WidgetId, WidgetKind};
use thiserror::Error;

/// Errors that can occur on any client, screen, or widget operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// TCP connection to the server failed.
    #[error("failed to connect to LCDd at {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred on the established connection.  The connection
    /// is torn down; a new client must be constructed to retry.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection has been closed (locally or by transport failure);
    /// no further commands can be sent.
    #[error("connection is closed")]
    ConnectionClosed,

    /// The screen behind this handle has been deleted.
    #[error("stale screen handle: {0} is no longer registered")]
    StaleScreen(ScreenId),

    /// The widget behind this handle has been deleted.
    #[error("stale widget handle: {0} is no longer registered")]
    StaleWidget(WidgetId),

    /// A widget operation was invoked on the wrong widget kind
    /// (e.g. `set_digit` on a string widget).
    #[error("widget {widget} is a `{actual}` and does not support `{operation}`")]
    KindMismatch {
        widget: WidgetId,
        operation: &'static str,
        actual: WidgetKind,
    },
}
