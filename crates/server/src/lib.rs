//! docgate server: API-key gated HTTP access to a document store
//!
//! Every data route sits behind an `X-API-Key` check against an immutable
//! credential set loaded at startup. List queries are translated from the
//! query string by [`docgate::translate`] and run against a
//! [`store::DocumentStore`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Endpoints
//!
//! Public:
//!
//! - `GET /`, `GET /health`, `GET /ready`, `GET /metrics`
//!
//! API key required:
//!
//! - `GET /documents/{collection}` - filtered listing
//! - `POST /documents/{collection}` - create, optional `?doc_id=`
//! - `POST /documents/{collection}/{id}` - create with explicit id
//! - `GET | PUT | DELETE /documents/{collection}/{id}`
//! - `GET /collections/{collection}/subcollections/{subcollection}`

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::{CredentialError, CredentialSet, SecretSource};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
