use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::error::StorageError;
use crate::middleware::{LogOptions, LoggedDisklet, MergedDisklet};
use crate::protocol::Response;
use crate::server::config::ServerConfig;
use crate::server::session::handle_session;
use crate::storage::{Disklet, FsDisklet};

/// Builds the store described by `config`: the root store, layered over
/// the fallback store when one is configured, behind operation logging.
pub fn open_store(config: &ServerConfig) -> Result<Arc<dyn Disklet>, StorageError> {
    let options = LogOptions {
        verbose: config.verbose,
        callback: None,
    };
    let root = FsDisklet::new(config.root_path())?;

    let disklet: Arc<dyn Disklet> = match config.fallback_path() {
        Some(fallback) => {
            let fallback = FsDisklet::new(fallback)?;
            info!("Reads fall back to {}", fallback.root().display());
            Arc::new(LoggedDisklet::new(MergedDisklet::new(root, fallback), options))
        }
        None => Arc::new(LoggedDisklet::new(root, options)),
    };

    Ok(disklet)
}

pub struct Server {
    listener: TcpListener,
    disklet: Arc<dyn Disklet>,
    config: Arc<ServerConfig>,
    slots: Arc<Semaphore>,
}

impl Server {
    /// Binds the listener described by `config` in front of `disklet`.
    pub async fn bind(config: ServerConfig, disklet: Arc<dyn Disklet>) -> io::Result<Self> {
        let address = config.listen_address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            error!("Failed to bind to {}: {}", address, e);
            e
        })?;

        info!("Server bound to {}", listener.local_addr()?);

        Ok(Self {
            listener,
            disklet,
            slots: Arc::new(Semaphore::new(config.max_clients)),
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, one task per client.
    pub async fn run(self) {
        info!(
            "Starting disklet server (max {} clients)",
            self.config.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let permit = match Arc::clone(&self.slots).try_acquire_owned() {
                        Ok(permit) => permit,
                        Err(_) => {
                            warn!("Rejecting {}: too many clients", addr);
                            tokio::spawn(reject_busy(stream));
                            continue;
                        }
                    };

                    let disklet = Arc::clone(&self.disklet);
                    let config = Arc::clone(&self.config);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        handle_session(stream, addr, disklet, config).await;
                        drop(permit);
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

async fn reject_busy(mut stream: TcpStream) {
    let line = Response::failure(None, "EBUSY", "Too many connections. Try again later.").to_line();
    let _ = stream.write_all(line.as_bytes()).await;
    let _ = stream.shutdown().await;
}
