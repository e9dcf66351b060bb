pub mod connection;
pub mod loopback;
pub mod protocol;
pub mod signal;

pub use connection::{BoardManager, ChatManager, Connection, OfferManager, Outbound};
pub use loopback::{ChannelOutbound, OutboundAction};
pub use protocol::{BoardUpdate, Offer, OfferKind, OfferParam, PrivateMessage};
pub use signal::{HandlerId, Signal, SignalSlot};
