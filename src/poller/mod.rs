mod error;
mod poller;
mod service;
mod types;

pub use error::PollerError;
pub use poller::{poll_once, Poller, PollerConfig, TaskHandle, DEFAULT_INTERVAL, POSITIONS_TOPIC};
pub use service::PositionService;
pub use types::{RequestParameters, TaskState, TaskStatus};
