//! Inbound TCP acceptor.
//!
//! One task per connection; each connection carries exactly one message.
//! The handler reads until the peer shuts down its write half, dispatches,
//! writes the reply if the message calls for one, and closes. Sockets are
//! dropped (and thus closed) on every exit path.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};

use crate::node::{Node, NodeError};
use crate::protocol::Message;

/// Accept connections forever, spawning a handler task per connection.
pub async fn serve(node: Arc<Node>, listener: TcpListener) -> std::io::Result<()> {
    loop {
        let (stream, peer_addr) = listener.accept().await?;
        debug!("[p2p] connection from {peer_addr}");
        let node = node.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_connection(node, stream).await {
                warn!("[p2p] connection from {peer_addr} failed: {err}");
            }
        });
    }
}

async fn handle_connection(node: Arc<Node>, mut stream: TcpStream) -> Result<(), NodeError> {
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await?;

    let msg = match Message::decode(&raw) {
        Ok(msg) => msg,
        Err(err) => {
            // Malformed bytes are logged and dropped.
            warn!("[p2p] dropping undecodable message: {err}");
            return Ok(());
        }
    };

    if let Some(reply) = node.handle_message(msg).await? {
        stream.write_all(reply.as_bytes()).await?;
        stream.shutdown().await?;
    }

    Ok(())
}
