//! Outbound connections: one fresh TCP connection per message.
//!
//! A send writes the encoded record and shuts down the write half; the
//! receiver reads to EOF before dispatching. Request-style messages keep the
//! read half open for the single reply.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::node::NodeError;
use crate::protocol::Message;

/// Fire-and-forget: deliver one message to a peer.
pub async fn send_to_peer(peer: &str, msg: &Message) -> Result<(), NodeError> {
    let mut stream = TcpStream::connect(peer).await?;
    stream.write_all(msg.encode()?.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Deliver one message and read the single reply written on the same
/// connection.
pub async fn request(peer: &str, msg: &Message) -> Result<String, NodeError> {
    let mut stream = TcpStream::connect(peer).await?;
    stream.write_all(msg.encode()?.as_bytes()).await?;
    stream.shutdown().await?;

    let mut reply = String::new();
    stream.read_to_string(&mut reply).await?;
    Ok(reply)
}
