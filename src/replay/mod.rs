//! Replay engine: ordered matching and reproduction of recorded traffic

mod coordinator;
mod matcher;
mod responder;
mod store;

pub use coordinator::ReplayCoordinator;
pub use matcher::{RequestSignature, SignatureMatcher};
pub use responder::ResponseReplayer;
pub use store::{RecordedEntry, RecordedTraffic};
