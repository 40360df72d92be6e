//! Client sessions
//!
//! Reads request lines from one connection, runs each on the blocking pool,
//! and writes responses back as they complete. Responses may arrive out of
//! order; clients match them by `id`.

use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Semaphore, mpsc};

use crate::error::ProtocolError;
use crate::protocol::{
    LineRead, Response, discard_line, handle_request, parse_line, read_request_line, recover_id,
};
use crate::server::config::ServerConfig;
use crate::storage::Disklet;

/// Bound on responses queued for the writer
const RESPONSE_QUEUE: usize = 64;

pub async fn handle_session(
    stream: TcpStream,
    client_addr: SocketAddr,
    disklet: Arc<dyn Disklet>,
    config: Arc<ServerConfig>,
) {
    info!("Client connected: {}", client_addr);

    let (read_half, write_half) = stream.into_split();
    let (tx, rx) = mpsc::channel::<Response>(RESPONSE_QUEUE);
    let writer = tokio::spawn(write_responses(write_half, rx, client_addr));
    let in_flight = Arc::new(Semaphore::new(config.max_in_flight));

    let mut reader = BufReader::new(read_half);
    let mut line = Vec::new();

    loop {
        let read = match read_request_line(&mut reader, &mut line, config.max_request_length).await {
            Ok(read) => read,
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        };

        let request = match read {
            LineRead::Eof => {
                info!("Connection closed by client {}", client_addr);
                break;
            }
            LineRead::TooLong { length, terminated } => {
                let e = ProtocolError::RequestTooLong {
                    length,
                    limit: config.max_request_length,
                };
                warn!("Bad request from {}: {}", client_addr, e);
                if tx.send(Response::from_protocol_error(None, &e)).await.is_err() {
                    break;
                }
                if !terminated {
                    if let Err(e) = discard_line(&mut reader).await {
                        error!("Failed to read from {}: {}", client_addr, e);
                        break;
                    }
                }
                continue;
            }
            LineRead::Line => match parse_line(&line, config.max_request_length) {
                Ok(request) => request,
                Err(e) => {
                    warn!("Bad request from {}: {}", client_addr, e);
                    let id = recover_id(String::from_utf8_lossy(&line).trim_end());
                    if tx.send(Response::from_protocol_error(id, &e)).await.is_err() {
                        break;
                    }
                    continue;
                }
            },
        };

        // Stop reading while this session already has its share of work queued.
        let permit = match Arc::clone(&in_flight).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        let disklet = Arc::clone(&disklet);
        let tx = tx.clone();
        tokio::spawn(async move {
            let id = request.id;
            let response =
                match tokio::task::spawn_blocking(move || handle_request(&*disklet, request)).await {
                    Ok(response) => response,
                    Err(e) => {
                        error!("Request {:?} from {} aborted: {}", id, client_addr, e);
                        Response::failure(id, "EIO", "request aborted")
                    }
                };
            let _ = tx.send(response).await;
            drop(permit);
        });
    }

    // Writer finishes once every in-flight request has answered.
    drop(tx);
    if let Err(e) = writer.await {
        error!("Response writer for {} failed: {}", client_addr, e);
    }
    info!("Client {} disconnected", client_addr);
}

async fn write_responses(
    mut write_half: OwnedWriteHalf,
    mut rx: mpsc::Receiver<Response>,
    client_addr: SocketAddr,
) {
    while let Some(response) = rx.recv().await {
        if let Err(e) = write_half.write_all(response.to_line().as_bytes()).await {
            warn!("Failed to write to {}: {}", client_addr, e);
            break;
        }
    }
    let _ = write_half.shutdown().await;
}
