//! Proxy Module
//!
//! The forwarding core: buffered transport, request-target splitting, the
//! per-connection pipeline and the accept loop that feeds it.
//!
//! # Pipeline
//! Each connection walks one transaction: await the request line, classify
//! the method, try the cache, resolve the target, connect upstream, forward
//! the rewritten headers, relay the response while capturing a cacheable
//! copy, close.

pub mod channel;
pub mod forward;
pub mod server;
pub mod uri;

pub use channel::BufferedChannel;
pub use forward::handle_connection;
pub use server::run;
pub use uri::{parse_target, Target};
