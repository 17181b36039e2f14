#![forbid(unsafe_code)]

pub mod config;
pub mod loader;
pub mod poller;
pub mod status;

pub use config::{FailurePolicy, PollerConfig, StatusCodeFilter, DEFAULT_CHANNELS, DEFAULT_ENDPOINT};
pub use loader::{HttpLoader, LoadError, StatusLoader};
pub use poller::{
    reconcile, ChannelUpdate, CycleOutcome, DropReason, Element, ElementNaming, EventKind, EventRing, Poller,
    PollerState, PollerStats, RecordingSink, StatusBoard, StatusEvent, Visibility, VisibilitySink,
    LOG_TARGET,
};
pub use status::{
    ChannelEntry, ChannelStatus, EmbeddedStatus, ItemId, LiveStatusResponse, SearchItem, SearchResult,
};
