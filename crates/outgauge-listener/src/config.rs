//! Listener configuration.

use crate::error::ListenerError;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use tracing::Dispatch;

/// Community default port for OutGauge senders (BeamNG.drive, Race-Element).
pub const DEFAULT_PORT: u16 = 4444;
/// Records buffered for a slow consumer before new ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Settings for [`OutGaugeListener::start_with_config`](crate::OutGaugeListener::start_with_config).
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub bind_addr: SocketAddr,
    pub queue_capacity: usize,
    /// Where the listener's log events go. `None` captures the dispatcher
    /// that is current when the listener starts.
    pub dispatch: Option<Dispatch>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            dispatch: None,
        }
    }
}

impl ListenerConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// # Errors
    ///
    /// Returns [`ListenerError::InvalidConfig`] for a zero queue capacity.
    pub fn validate(&self) -> Result<(), ListenerError> {
        if self.queue_capacity == 0 {
            return Err(ListenerError::InvalidConfig {
                reason: "queue capacity must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_all_interfaces() {
        let config = ListenerConfig::default();
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert!(config.bind_addr.ip().is_unspecified());
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert!(config.dispatch.is_none());
    }

    #[test]
    fn builder_overrides() {
        let addr = SocketAddr::from(([127, 0, 0, 1], 30000));
        let config = ListenerConfig::new(addr).with_queue_capacity(8);
        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.queue_capacity, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = ListenerConfig::default().with_queue_capacity(0);
        assert!(matches!(
            config.validate(),
            Err(ListenerError::InvalidConfig { .. })
        ));
    }
}
