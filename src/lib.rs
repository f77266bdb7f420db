//! node-api
//!
//! Value marshalling for Node-API bindings. Host values are modelled as a
//! [`Variant`] and converted to and from native Rust types through strict,
//! typed conversions; asynchronous results travel back to the host through
//! single-resolution [`Completion`] handles whose continuations run on the
//! host's own thread.
//!
//! This crate is platform-agnostic. The `node-api-node` addon in `node/`
//! wires it into Node.js through napi-rs.

pub mod completion;
pub mod config;
pub mod convert;
mod error;
pub mod executor;
pub mod host;
pub mod ops;
pub mod registry;
pub mod value;

pub use completion::{Completion, Resolver};
pub use config::{BindingConfig, LoggingConfig, WorkerConfig};
pub use convert::{to_host_number, FromArgs, FromVariant, IntoVariant};
pub use error::{Error, ErrorKind, Result};
pub use host::{HostHandle, HostLoop};
pub use registry::{CallContext, Exports, Handler};
pub use value::{ValueType, Variant};

