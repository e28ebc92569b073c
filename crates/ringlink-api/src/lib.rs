// ringlink-api: Async Rust client for the Ring Alarm hub socket protocol

pub mod codec;
pub mod connection;
pub mod error;
pub mod exchange;
pub mod listener;
pub mod models;
pub mod resolver;
pub mod transport;

pub use codec::{CommandFrame, QueryFrame, RawFrame, decode_frame, encode_command, encode_query};
pub use connection::{
    ConnectionDescriptor, Connector, SocketConnection, SocketScheme, WsConnector, connection_url,
};
pub use error::{Error, ErrorKind};
pub use exchange::{
    CommandReceipt, CoordinatorConfig, Exchange, ExchangeCoordinator, ExchangeOutcome,
    ExchangeSettings, ExchangeState,
};
pub use listener::{ResponseListener, ResultSlot, WaitOutcome, WaitPolicy};
pub use models::{DeviceEntry, DeviceSnapshot};
pub use resolver::{
    ConnectionResolver, DEFAULT_CONNECTIONS_URL, HttpConnectionResolver, StaticResolver,
};
pub use transport::TransportConfig;
