pub mod connector;
pub mod http;
pub mod memory;

pub use connector::{ConnectorBackend, ConnectorRegistry};
pub use http::{HttpConnector, HttpConnectorOptions};
pub use memory::MemoryConnector;
