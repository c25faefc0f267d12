//! UDP listener that decodes OutGauge datagrams in a background task.
//!
//! One tokio task per listener owns the socket. Each datagram of exactly
//! [`PACKET_SIZE`] bytes is decoded and offered to a bounded queue with
//! `try_send`, so a slow consumer loses new records instead of stalling the
//! socket. Closing the listener (or dropping it) resolves a shutdown signal that
//! the task races against `recv`, so a pending receive is abandoned at once.
//! A failed socket read is fatal: the task logs it and stops, and consumers
//! see the same end-of-stream as after `close`.

use crate::config::ListenerConfig;
use crate::error::ListenerError;
use crate::layout::PACKET_SIZE;
use crate::packet::{TelemetryRecord, decode};
use crate::stats::{ListenerCounters, ListenerStats};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, Instrument, debug, error, info, info_span, trace, warn};

/// Larger than a packet so oversized datagrams show up with their real size.
const RECV_BUFFER_SIZE: usize = 256;

/// Consuming side of the listener's queue.
pub type TelemetryReceiver = mpsc::Receiver<TelemetryRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Running,
    /// Closed by the caller, or the receive task stopped on its own.
    Closed,
}

/// Where the receive task reads datagrams from.
trait DatagramSource {
    fn recv(&self, buf: &mut [u8]) -> impl Future<Output = io::Result<usize>> + Send;
}

impl DatagramSource for UdpSocket {
    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        UdpSocket::recv(self, buf).await
    }
}

/// Why the receive task stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    Shutdown,
    ConsumerGone,
    ReadFailed,
}

/// Live OutGauge receiver.
///
/// ```rust,no_run
/// use outgauge_listener::OutGaugeListener;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), outgauge_listener::ListenerError> {
/// let mut listener = OutGaugeListener::start(([0, 0, 0, 0], 4444).into()).await?;
/// while let Some(record) = listener.recv().await {
///     println!("gear {} at {:.1} m/s", record.gear_label(), record.speed);
/// }
/// listener.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OutGaugeListener {
    local_addr: SocketAddr,
    receiver: Option<TelemetryReceiver>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<LoopExit>>,
    counters: Arc<ListenerCounters>,
    dispatch: Dispatch,
}

impl OutGaugeListener {
    /// Binds `bind_addr` with default settings and starts receiving.
    ///
    /// # Errors
    ///
    /// [`ListenerError::Bind`] if the socket cannot be bound. No task is
    /// started in that case.
    pub async fn start(bind_addr: SocketAddr) -> Result<Self, ListenerError> {
        Self::start_with_config(ListenerConfig::new(bind_addr)).await
    }

    /// # Errors
    ///
    /// [`ListenerError::InvalidConfig`] for an unusable configuration,
    /// [`ListenerError::Bind`] if the socket cannot be bound.
    pub async fn start_with_config(config: ListenerConfig) -> Result<Self, ListenerError> {
        config.validate()?;
        let dispatch = config
            .dispatch
            .unwrap_or_else(|| tracing::dispatcher::get_default(Dispatch::clone));
        let bind_addr = config.bind_addr;

        let socket = match UdpSocket::bind(bind_addr).await {
            Ok(socket) => socket,
            Err(source) => {
                tracing::dispatcher::with_default(&dispatch, || {
                    warn!(addr = %bind_addr, error = %source, "Failed to bind OutGauge UDP socket");
                });
                return Err(ListenerError::Bind {
                    addr: bind_addr,
                    source,
                });
            }
        };
        let local_addr = socket.local_addr().map_err(|source| ListenerError::Bind {
            addr: bind_addr,
            source,
        })?;

        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let counters = Arc::new(ListenerCounters::default());

        let span = tracing::dispatcher::with_default(&dispatch, || {
            info!(
                addr = %local_addr,
                capacity = config.queue_capacity,
                "OutGauge listener started"
            );
            info_span!("outgauge_listener", addr = %local_addr)
        });
        let task = tokio::spawn(
            receive_loop(socket, tx, shutdown_rx, Arc::clone(&counters))
                .instrument(span)
                .with_subscriber(dispatch.clone()),
        );

        Ok(Self {
            local_addr,
            receiver: Some(rx),
            shutdown: Some(shutdown_tx),
            task: Some(task),
            counters,
            dispatch,
        })
    }

    /// Address the socket is bound to, with any port 0 resolved.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The queue records are delivered on, unless it was taken with
    /// [`take_channel`](Self::take_channel).
    pub fn channel(&mut self) -> Option<&mut TelemetryReceiver> {
        self.receiver.as_mut()
    }

    /// Moves the queue out of the listener, e.g. into a consumer task.
    pub fn take_channel(&mut self) -> Option<TelemetryReceiver> {
        self.receiver.take()
    }

    /// Waits for the next record. `None` once the listener has stopped and
    /// the queue is drained, or if the queue was taken.
    ///
    /// A socket read error stops the listener the same way `close` does, so
    /// it also surfaces here as `None`; the error itself is only logged.
    pub async fn recv(&mut self) -> Option<TelemetryRecord> {
        match self.receiver.as_mut() {
            Some(receiver) => receiver.recv().await,
            None => None,
        }
    }

    pub fn stats(&self) -> ListenerStats {
        self.counters.snapshot()
    }

    pub fn state(&self) -> ListenerState {
        match &self.task {
            Some(task) if !task.is_finished() => ListenerState::Running,
            _ => ListenerState::Closed,
        }
    }

    /// Stops the receive task and releases the socket.
    ///
    /// Records already queued stay readable; after them the queue reports
    /// end-of-stream. Calling `close` again is a no-op.
    ///
    /// # Errors
    ///
    /// [`ListenerError::TaskFailed`] if the receive task panicked.
    pub async fn close(&mut self) -> Result<(), ListenerError> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        if let Some(shutdown) = self.shutdown.take()
            && shutdown.send(()).is_err()
        {
            self.log(|| debug!("OutGauge receive task already stopped"));
        }

        let exit = task.await?;
        self.log(|| debug!(?exit, "OutGauge listener closed"));
        Ok(())
    }

    fn log(&self, event: impl FnOnce()) {
        tracing::dispatcher::with_default(&self.dispatch, event);
    }
}

async fn receive_loop<S: DatagramSource>(
    socket: S,
    tx: mpsc::Sender<TelemetryRecord>,
    mut shutdown: oneshot::Receiver<()>,
    counters: Arc<ListenerCounters>,
) -> LoopExit {
    let mut buf = [0u8; RECV_BUFFER_SIZE];

    let exit = loop {
        let received = tokio::select! {
            biased;
            _ = &mut shutdown => {
                debug!("Shutdown requested, stopping OutGauge listener");
                break LoopExit::Shutdown;
            }
            received = socket.recv(&mut buf) => received,
        };

        let len = match received {
            Ok(len) => len,
            Err(source) => {
                let error = ListenerError::Read(source);
                error!(%error, "OutGauge receive loop terminated");
                break LoopExit::ReadFailed;
            }
        };
        counters.inc_received();

        let datagram = match buf.get(..len) {
            Some(datagram) if len == PACKET_SIZE => datagram,
            _ => {
                counters.inc_discarded();
                trace!(len, "Ignoring datagram that is not one OutGauge packet");
                continue;
            }
        };

        let record = match decode(datagram) {
            Ok(record) => record,
            Err(error) => {
                counters.inc_decode_failure();
                warn!(%error, "Failed to decode OutGauge packet");
                continue;
            }
        };

        match tx.try_send(record) {
            Ok(()) => counters.inc_delivered(),
            Err(TrySendError::Full(_)) => {
                counters.inc_dropped();
                warn!("Telemetry queue full, dropping OutGauge record");
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Telemetry receiver dropped, stopping OutGauge listener");
                break LoopExit::ConsumerGone;
            }
        }
    };

    drop(socket);
    info!(?exit, "Stopped OutGauge listener");
    exit
}
