//! Connection and handshake state machine.
//!
//! Architecture:
//! - [`LcdClient`] owns the transport write half behind an `Arc<Mutex>`,
//!   shared with every [`Screen`] and widget handle derived from it.
//! - A spawned read loop decodes inbound lines (via the buffering
//!   [`LineReader`]) and forwards notifications on an `mpsc` channel.
//! - Every outbound command is written in full, under the lock, before the
//!   mutating call returns, so wire order equals call order for any caller.
//!
//! State machine:
//!
//! ```text
//! Disconnected → Connecting → Handshaking → Ready → Closed
//! ```
//!
//! `Closed` is terminal.  There is no reconnect: a transport failure tears
//! the connection down and a new client must be constructed to retry.

use std::collections::HashMap;
use std::sync::Arc;

use lcdproc_core::{
    encode_command, parse_line, Capabilities, Command, LineReader, Param, ScreenId, ScreenOption,
    ServerMessage, WidgetId, WidgetKind,
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    sync::{mpsc, Mutex},
};
use tracing::{debug, error, info, trace, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::screen::Screen;

/// Capacity of the event channel handed to the caller.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Read buffer size for the inbound loop; server lines are short.
const READ_BUF_SIZE: usize = 1024;

/// Connection lifecycle states.
///
/// No transition leads back out of [`Closed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport yet.
    #[default]
    Disconnected,
    /// Transport connect in progress.
    Connecting,
    /// `hello` sent; waiting for the server greeting.
    Handshaking,
    /// Greeting parsed, `client_set` sent; commands may flow.
    Ready,
    /// Torn down, locally or by transport failure.  Terminal.
    Closed,
}

/// Events delivered to the caller on the channel returned by
/// [`LcdClient::connect`] / [`LcdClient::attach`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The handshake completed; fired exactly once per connection.  By the
    /// time this is observed, `client_set -name {..}` has been written.
    Ready { capabilities: Capabilities },
    /// The server put the named screen on the display (`listen`).
    ScreenShown { screen: ScreenId },
    /// The server took the named screen off the display (`ignore`).
    ScreenHidden { screen: ScreenId },
    /// The server rejected a command (`huh? <reason>`).
    ServerError { message: String },
    /// An inbound line this client does not understand.
    Unrecognized { line: String },
    /// The transport failed; the connection is closed.
    TransportError { message: String },
    /// The server closed the connection.
    Disconnected,
}

// ── Shared connection state ───────────────────────────────────────────────────

/// Cached state of one widget registered with the server.
#[derive(Debug)]
pub(crate) struct WidgetRecord {
    pub kind: WidgetKind,
    /// Most recent full parameter set sent via `widget_set`; partial updates
    /// reuse positions cached here.
    pub last_params: Option<Vec<Param>>,
}

/// Registry entry for one screen and the widgets it owns.
#[derive(Debug, Default)]
pub(crate) struct ScreenRecord {
    /// Merged configuration, last-write-wins per option key.
    pub options: Vec<ScreenOption>,
    pub widgets: HashMap<WidgetId, WidgetRecord>,
    /// Per-screen widget counter; never reused, even after deletions.
    pub next_widget: u64,
}

/// State shared between the client handle, screen/widget handles, and the
/// read loop.  There is exactly one logical writer (whoever holds the lock)
/// and one logical reader (the spawned loop), so the single mutex is the
/// only synchronisation needed.
pub(crate) struct Shared {
    pub state: ConnectionState,
    pub writer: Option<Box<dyn AsyncWrite + Send + Unpin>>,
    pub capabilities: Capabilities,
    pub screens: HashMap<ScreenId, ScreenRecord>,
    /// Per-connection screen counter; never reused.
    pub next_screen: u64,
    pub client_name: String,
}

/// Encodes and writes one command, newline-terminated, in full.
///
/// On a write error the connection is torn down immediately (state moves to
/// `Closed`, the writer is dropped) and the error is returned to the caller.
pub(crate) async fn send_command(shared: &mut Shared, cmd: &Command) -> Result<(), ClientError> {
    if shared.state == ConnectionState::Closed {
        return Err(ClientError::ConnectionClosed);
    }
    let Some(writer) = shared.writer.as_mut() else {
        return Err(ClientError::ConnectionClosed);
    };

    let mut line = encode_command(cmd);
    trace!(command = %line, "sending");
    line.push('\n');

    if let Err(e) = writer.write_all(line.as_bytes()).await {
        error!("write failed, tearing connection down: {e}");
        shared.state = ConnectionState::Closed;
        shared.writer = None;
        return Err(ClientError::Io(e));
    }
    Ok(())
}

// ── Client handle ─────────────────────────────────────────────────────────────

/// Handle to one LCDd connection.
///
/// Cheap to clone; all clones (and the [`Screen`]/widget handles created
/// from them) share the same underlying connection.
#[derive(Clone)]
pub struct LcdClient {
    shared: Arc<Mutex<Shared>>,
}

impl LcdClient {
    /// Opens a TCP connection to the configured server and starts the
    /// handshake.
    ///
    /// Returns the client plus the event receiver.  Wait for
    /// [`ClientEvent::Ready`] before rendering bar widgets; their length
    /// computation needs the negotiated display geometry.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConnectFailed`] when the TCP connect fails and
    /// [`ClientError::Io`] when writing `hello` fails.
    pub async fn connect(
        config: ClientConfig,
    ) -> Result<(Self, mpsc::Receiver<ClientEvent>), ClientError> {
        let addr = config.addr();
        debug!(%addr, "connecting");
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|source| ClientError::ConnectFailed { addr, source })?;
        Self::attach(stream, config).await
    }

    /// Starts the handshake over an already-established bidirectional
    /// stream.
    ///
    /// This is the seam for non-TCP transports and for tests, which attach
    /// an in-memory duplex stream.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] when writing `hello` fails.
    pub async fn attach<S>(
        stream: S,
        config: ClientConfig,
    ) -> Result<(Self, mpsc::Receiver<ClientEvent>), ClientError>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);

        let shared = Arc::new(Mutex::new(Shared {
            state: ConnectionState::Connecting,
            writer: Some(Box::new(write_half)),
            capabilities: Capabilities::default(),
            screens: HashMap::new(),
            next_screen: 0,
            client_name: config.name,
        }));

        // Open the handshake before handing out the client.
        {
            let mut guard = shared.lock().await;
            send_command(&mut guard, &Command::Hello).await?;
            guard.state = ConnectionState::Handshaking;
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        tokio::spawn(read_loop(Arc::clone(&shared), read_half, tx));

        Ok((Self { shared }, rx))
    }

    /// Registers a new screen with the server and applies `options`.
    ///
    /// Sends `screen_add` immediately, then `screen_set` when `options` is
    /// non-empty.  The generated id is `<clientName>_s<N>` with a
    /// monotonically increasing counter.
    ///
    /// # Errors
    ///
    /// Fails when the connection is closed or a write fails.
    pub async fn add_screen(&self, options: Vec<ScreenOption>) -> Result<Screen, ClientError> {
        let id = {
            let mut guard = self.shared.lock().await;
            let id = ScreenId::numbered(&guard.client_name, guard.next_screen);
            guard.next_screen += 1;
            send_command(&mut guard, &Command::ScreenAdd { screen: id.clone() }).await?;
            guard.screens.insert(id.clone(), ScreenRecord::default());
            id
        };
        debug!(screen = %id, "screen registered");

        let screen = Screen::new(id, Arc::clone(&self.shared));
        screen.set_config(options).await?;
        Ok(screen)
    }

    /// The negotiated display capabilities (all zero before `Ready`).
    pub async fn capabilities(&self) -> Capabilities {
        self.shared.lock().await.capabilities.clone()
    }

    /// Current connection state.
    pub async fn state(&self) -> ConnectionState {
        self.shared.lock().await.state
    }

    /// Initiates graceful shutdown of the transport and moves to `Closed`.
    ///
    /// Registries are not drained: screen and widget records remain as stale
    /// in-memory state, and their handles error from now on.  Closing an
    /// already-closed connection is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] when the transport shutdown fails; the
    /// connection is considered closed regardless.
    pub async fn close(&self) -> Result<(), ClientError> {
        let mut guard = self.shared.lock().await;
        let writer = guard.writer.take();
        guard.state = ConnectionState::Closed;
        drop(guard);

        if let Some(mut writer) = writer {
            info!("closing connection");
            writer.shutdown().await?;
        }
        Ok(())
    }
}

// ── Read loop ─────────────────────────────────────────────────────────────────

/// Reads inbound chunks, reassembles lines, and dispatches each one in
/// arrival order.  Exits on EOF or transport error, tearing the connection
/// down either way.
async fn read_loop<R>(shared: Arc<Mutex<Shared>>, mut reader: R, tx: mpsc::Sender<ClientEvent>)
where
    R: AsyncRead + Send + Unpin,
{
    let mut lines = LineReader::new();
    let mut buf = [0u8; READ_BUF_SIZE];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                info!("server closed the connection");
                teardown(&shared).await;
                let _ = tx.send(ClientEvent::Disconnected).await;
                break;
            }
            Ok(n) => {
                for line in lines.push(&buf[..n]) {
                    handle_line(&shared, &tx, &line).await;
                }
            }
            Err(e) => {
                error!("read error on control channel: {e}");
                teardown(&shared).await;
                let _ = tx
                    .send(ClientEvent::TransportError {
                        message: e.to_string(),
                    })
                    .await;
                break;
            }
        }
    }
}

async fn teardown(shared: &Arc<Mutex<Shared>>) {
    let mut guard = shared.lock().await;
    guard.state = ConnectionState::Closed;
    guard.writer = None;
}

/// Dispatches one complete inbound line.
async fn handle_line(shared: &Arc<Mutex<Shared>>, tx: &mpsc::Sender<ClientEvent>, line: &str) {
    let message = match parse_line(line) {
        Ok(message) => message,
        Err(e) => {
            // A malformed greeting leaves the handshake incomplete; surface
            // the line rather than killing the connection over it.
            warn!(line, "unparseable server line: {e}");
            let _ = tx
                .send(ClientEvent::Unrecognized {
                    line: line.to_string(),
                })
                .await;
            return;
        }
    };

    match message {
        ServerMessage::Connect(capabilities) => {
            let event = {
                let mut guard = shared.lock().await;
                if guard.state != ConnectionState::Handshaking {
                    warn!("greeting received outside handshake; ignored");
                    None
                } else {
                    guard.capabilities = capabilities.clone();
                    let name = guard.client_name.clone();
                    match send_command(&mut guard, &Command::SetClientName { name }).await {
                        Ok(()) => {
                            guard.state = ConnectionState::Ready;
                            info!(
                                server = %capabilities.version,
                                protocol = %capabilities.protocol_version,
                                width = capabilities.size.width,
                                height = capabilities.size.height,
                                "handshake complete"
                            );
                            Some(ClientEvent::Ready { capabilities })
                        }
                        Err(e) => Some(ClientEvent::TransportError {
                            message: e.to_string(),
                        }),
                    }
                }
            };
            if let Some(event) = event {
                let _ = tx.send(event).await;
            }
        }

        // Inert acknowledgement of the previous command.
        ServerMessage::Success => trace!("server acknowledged"),

        ServerMessage::Listen(screen) => {
            if shared.lock().await.screens.contains_key(&screen) {
                let _ = tx.send(ClientEvent::ScreenShown { screen }).await;
            } else {
                trace!(%screen, "listen for unknown screen dropped");
            }
        }

        ServerMessage::Ignore(screen) => {
            if shared.lock().await.screens.contains_key(&screen) {
                let _ = tx.send(ClientEvent::ScreenHidden { screen }).await;
            } else {
                trace!(%screen, "ignore for unknown screen dropped");
            }
        }

        ServerMessage::Huh(message) => {
            warn!(%message, "server rejected a command");
            let _ = tx.send(ClientEvent::ServerError { message }).await;
        }

        ServerMessage::Unknown(line) => {
            debug!(%line, "unrecognized server line");
            let _ = tx.send(ClientEvent::Unrecognized { line }).await;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
