//! Server-driven DOM scripting over stateless HTTP.
//!
//! A defining script describes DOM changes and binds events to server-side
//! handlers. Each request re-runs the script from scratch; events fired in
//! the browser come back as [`EventRequest`]s, and handlers registered by
//! other handlers are reached by replaying their ancestors (the chain the
//! browser submits alongside the event).
//!
//! ```no_run
//! use tether_core::{EngineConfig, Page};
//!
//! let mut page = Page::new(EngineConfig::default());
//! page.mount(|engine| {
//!     engine.jq("#message").html("Hello")?.click(
//!         |engine, _data| {
//!             engine.jq("#message").text("clicked")?;
//!             Ok(())
//!         },
//!         "{}",
//!     )?;
//!     Ok(())
//! })?;
//! # Ok::<(), tether_core::EngineError>(())
//! ```

pub mod buffer;
pub mod config;
pub mod dom;
pub mod encode;
pub mod engine;
pub mod error;
pub mod page;
pub mod protocol;
pub mod registry;
pub mod trigger;

pub use buffer::{ChainId, CodeBufferStack};
pub use config::EngineConfig;
pub use engine::{BufferScope, Engine};
pub use error::{ConfigurationError, EncodingError, EngineError, EngineResult, ProtocolError};
pub use page::{InstanceCounter, Page, Script};
pub use protocol::{EventRequest, EventResponse, WireId};
pub use registry::{CallbackId, CallbackRegistry, Handler, ParentChainEntry};
pub use trigger::EventData;
