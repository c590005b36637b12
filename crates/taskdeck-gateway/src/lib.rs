//! TaskDeck Gateway
//!
//! MCP protocol gateway that exposes the TaskDeck tool catalog over:
//! - A stateless JSON-RPC exchange (`POST <base>`)
//! - A stateful SSE stream with a message side channel
//!   (`GET <base>/sse` + `POST <base>/message?sessionId=...`)
//!
//! Tool dispatch, schemas, and the upstream adapter live in
//! `taskdeck-core`; this crate owns the wire protocol, transports, session
//! bookkeeping, and the HTTP server.

pub mod logging;
pub mod protocol;
pub mod server;
pub mod session;
pub mod tools;
pub mod transport;

pub use protocol::{ProtocolServer, RpcError, RpcRequest, RpcResponse};
pub use server::{GatewayConfig, GatewayServer};
pub use session::{Session, SessionStore};
pub use tools::build_registry;
