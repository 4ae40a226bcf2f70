use super::rover_messages;
use crate::warn;
use prost::Message;
use std::io::{Cursor, ErrorKind};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::net::tcp::{ReadHalf, WriteHalf};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    Connected,
    Disconnected,
    Message(rover_messages::UpstreamContent),
}

/// TCP endpoint speaking length-prefixed protobuf frames with operator consoles.
///
/// Every connected console receives every downstream frame.
pub(crate) struct ConsoleEndpoint {
    downstream_sender: broadcast::Sender<Option<Vec<u8>>>,
    upstream_event_sender: broadcast::Sender<ConsoleEvent>,
    local_addr: SocketAddr,
}

impl ConsoleEndpoint {
    const CHANNEL_SIZE: usize = 32;
    /// Upper bound for a single upstream frame, a mission of roughly 100k points.
    const MAX_FRAME_LEN: u32 = 4 * 1024 * 1024;

    async fn handle_connection_rx(
        socket: &mut ReadHalf<'_>,
        upstream_event_sender: &broadcast::Sender<ConsoleEvent>,
    ) -> Result<(), std::io::Error> {
        loop {
            let length = socket.read_u32().await?;
            if length > Self::MAX_FRAME_LEN {
                return Err(std::io::Error::new(
                    ErrorKind::InvalidData,
                    format!("frame of {length} bytes"),
                ));
            }

            let mut buffer = vec![0u8; length as usize];
            socket.read_exact(&mut buffer).await?;

            match rover_messages::Upstream::decode(&mut Cursor::new(buffer)) {
                Ok(rover_messages::Upstream { content: Some(content) }) => {
                    let _ = upstream_event_sender.send(ConsoleEvent::Message(content));
                }
                Ok(_) => {}
                Err(e) => warn!("Dropping undecodable console frame: {e}"),
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn handle_connection_tx(
        socket: &mut WriteHalf<'_>,
        downstream_receiver: &mut broadcast::Receiver<Option<Vec<u8>>>,
    ) -> Result<(), std::io::Error> {
        loop {
            let message_buffer = match downstream_receiver.recv().await {
                Ok(Some(buffer)) => buffer,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Ok(None) | Err(broadcast::error::RecvError::Closed) => break,
            };
            socket.write_u32(message_buffer.len() as u32).await?;
            socket.write_all(&message_buffer).await?;
        }

        Ok(())
    }

    /// Binds `addr` and accepts consoles until `shutdown` fires.
    pub(crate) async fn bind(addr: &str, shutdown: CancellationToken) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let downstream_sender = broadcast::Sender::new(Self::CHANNEL_SIZE);
        let upstream_event_sender = broadcast::Sender::new(Self::CHANNEL_SIZE);
        let inst = Self {
            downstream_sender: downstream_sender.clone(),
            upstream_event_sender: upstream_event_sender.clone(),
            local_addr,
        };

        tokio::spawn(async move {
            loop {
                let accept = tokio::select! {
                    accept = listener.accept() => accept,
                    () = shutdown.cancelled() => break
                };

                let mut socket = match accept {
                    Ok((socket, _)) => socket,
                    Err(e) => {
                        warn!("Failed to accept console connection: {e}");
                        continue;
                    }
                };
                let _ = upstream_event_sender.send(ConsoleEvent::Connected);
                let upstream_event_sender_local = upstream_event_sender.clone();
                let mut downstream_receiver = downstream_sender.subscribe();
                let shutdown_local = shutdown.clone();

                tokio::spawn(async move {
                    let (mut rx_socket, mut tx_socket) = socket.split();

                    let result = tokio::select! {
                        res = ConsoleEndpoint::handle_connection_tx(&mut tx_socket, &mut downstream_receiver) => res,
                        res = ConsoleEndpoint::handle_connection_rx(&mut rx_socket, &upstream_event_sender_local) => res,
                        () = shutdown_local.cancelled() => Ok(()),
                    };

                    let _ = upstream_event_sender_local.send(ConsoleEvent::Disconnected);
                    match result {
                        Err(e)
                            if e.kind() == ErrorKind::UnexpectedEof
                                || e.kind() == ErrorKind::ConnectionReset
                                || e.kind() == ErrorKind::ConnectionAborted =>
                        {
                            return;
                        }
                        Err(e) => {
                            warn!("Closing connection to console due to {e:?}");
                        }
                        Ok(()) => {}
                    }
                    let _ = socket.shutdown().await;
                });
            }
        });
        Ok(inst)
    }

    pub(crate) fn send_downstream(&self, msg: rover_messages::DownstreamContent) {
        let _ = self.downstream_sender.send(Some(
            rover_messages::Downstream { content: Some(msg) }.encode_to_vec(),
        ));
    }

    pub(crate) fn is_console_connected(&self) -> bool {
        self.downstream_sender.receiver_count() > 0
    }

    pub(crate) fn upstream_event_receiver(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.upstream_event_sender.subscribe()
    }

    pub(crate) fn local_addr(&self) -> SocketAddr { self.local_addr }
}

impl Drop for ConsoleEndpoint {
    fn drop(&mut self) { let _ = self.downstream_sender.send(None); }
}
