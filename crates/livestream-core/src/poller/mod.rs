pub mod board;
pub mod engine;
pub mod event;
pub mod reconcile;
pub mod sink;
pub mod state;

pub use board::{Element, ElementNaming, StatusBoard};
pub use engine::{Poller, LOG_TARGET};
pub use event::{EventKind, EventRing, StatusEvent};
pub use reconcile::{reconcile, ChannelUpdate, CycleOutcome, DropReason};
pub use sink::{RecordingSink, VisibilitySink};
pub use state::{PollerState, PollerStats, Visibility};
