use thiserror::Error;
use tracing::Span;

use crate::actor::broadcast::DockSignal;
use crate::actor::reactor::scheduler::ScheduledTask;
use crate::common::config::ConfigError;
use crate::model::monitor::RegistryError;

#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("Signal delivery failed: {0}")]
    SignalDeliveryFailed(#[from] tokio::sync::mpsc::error::SendError<(Span, DockSignal)>),
    #[error("Timer communication failed: {0}")]
    TimerCommunicationFailed(#[from] tokio::sync::mpsc::error::SendError<(Span, ScheduledTask)>),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
