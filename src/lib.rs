//! Long-polls server-rendered page fragments into named display regions.

pub mod config;
pub mod poller;
pub mod regions;
pub mod transport;
pub mod types;

pub use config::{Config, PollConfig};
pub use poller::{FragmentPoller, PollHandle, PollOutcome, PollPhase};
pub use regions::{LogRegions, MemoryRegions, RegionSink};
pub use transport::{FragmentResponse, FragmentTransport, ReqwestTransport};
pub use types::PollerError;
