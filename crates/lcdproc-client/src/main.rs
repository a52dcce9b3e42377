//! LCDproc client demo entry point.
//!
//! Connects to a running LCDd server, puts up a small status screen
//! (title, text line, progress bar) and animates the bar while reacting
//! to server notifications.
//!
//! ```text
//! main()
//!  └─ ClientConfig::load()   -- optional TOML config file
//!  └─ LcdClient::connect()   -- handshake, capability negotiation
//!  └─ event dispatch loop
//!       ├─ Ready        -> build the demo screen
//!       ├─ ScreenShown  -> start animating the bar
//!       ├─ ScreenHidden -> pause the animation
//!       └─ Disconnected -> exit
//! ```
//!
//! Configuration is read from the path given as the first argument, or
//! defaults (127.0.0.1:13666) when no file is given.  `RUST_LOG` controls
//! log verbosity as usual.

use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lcdproc_client::{ClientConfig, ClientEvent, LcdClient, Screen, Widget};
use lcdproc_core::{Priority, ScreenOption};

/// The demo screen with its three widgets.
struct DemoScreen {
    screen: Screen,
    line: Widget,
    bar: Widget,
}

async fn build_demo_screen(client: &LcdClient) -> anyhow::Result<DemoScreen> {
    let screen = client
        .add_screen(vec![
            ScreenOption::Name("demo".to_string()),
            ScreenOption::Priority(Priority::Info),
        ])
        .await?;

    let title = screen.add_title().await?;
    title.set_title("lcdproc-client").await?;

    let line = screen.add_string().await?;
    line.set_text(1, 2, "starting up").await?;

    let bar = screen.add_horizontal_bar().await?;
    bar.set_percentage(1, 3, 0.0).await?;

    Ok(DemoScreen { screen, line, bar })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ClientConfig::load(Path::new(&path))?,
        None => ClientConfig::default(),
    };

    info!(addr = %config.addr(), name = %config.name, "connecting to LCDd");
    let (client, mut events) = LcdClient::connect(config).await?;

    // Ctrl-C tears the connection down; the read loop then delivers
    // `Disconnected` and the dispatch loop below exits.
    let shutdown_client = client.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_client.close().await;
        }
    });

    let mut demo: Option<DemoScreen> = None;
    let mut animate = false;
    let mut fill = 0.0_f64;
    let mut ticker = tokio::time::interval(Duration::from_millis(250));

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    ClientEvent::Ready { capabilities } => {
                        info!(
                            version = %capabilities.version,
                            width = capabilities.size.width,
                            height = capabilities.size.height,
                            "connected"
                        );
                        demo = Some(build_demo_screen(&client).await?);
                    }

                    ClientEvent::ScreenShown { screen } => {
                        info!(%screen, "screen visible");
                        animate = true;
                        if let Some(demo) = &demo {
                            demo.line.set_label("hello from Rust").await?;
                        }
                    }

                    ClientEvent::ScreenHidden { screen } => {
                        info!(%screen, "screen hidden");
                        animate = false;
                    }

                    ClientEvent::ServerError { message } => {
                        warn!(%message, "server rejected a command");
                    }

                    ClientEvent::Unrecognized { line } => {
                        warn!(%line, "unrecognized server line");
                    }

                    ClientEvent::TransportError { message } => {
                        warn!(%message, "transport error");
                    }

                    ClientEvent::Disconnected => {
                        info!("server connection closed");
                        break;
                    }
                }
            }

            _ = ticker.tick() => {
                if animate {
                    if let Some(demo) = &demo {
                        fill = if fill >= 1.0 { 0.0 } else { fill + 0.05 };
                        // Stop animating once the connection is gone; the
                        // dispatch loop exits on the Disconnected event.
                        if demo.bar.set_value(fill).await.is_err() {
                            animate = false;
                        }
                    }
                }
            }
        }
    }

    if let Some(demo) = demo.take() {
        // Best effort; the connection may already be gone.
        let _ = demo.screen.delete().await;
    }
    client.close().await?;

    info!("lcdproc-client stopped");
    Ok(())
}
