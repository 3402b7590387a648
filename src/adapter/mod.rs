//! Request adaptation subsystem.
//!
//! # Data Flow
//! ```text
//! InboundRequest (network layer)
//!     → uri.rs (absolute URI, encoded fallback)
//!     → container.rs (ContainerRequest built)
//!     → predicate.rs (read the body?)
//!     → body.rs (bounded accumulation until end-of-stream)
//!     → chain.rs (processors, strictly sequential)
//!     → delegate.rs (ApplicationDelegate::handle, once)
//! ```
//!
//! # Design Decisions
//! - The adapter is a protocol shim: no routing, no resource dispatch
//! - Each ContainerRequest has exactly one owner at any time
//! - Configuration is read once at construction

pub mod body;
pub mod chain;
pub mod container;
pub mod delegate;
pub mod handler;
pub mod predicate;
pub mod uri;

pub use chain::{Completion, ProcessorChain, RequestProcessor};
pub use container::ContainerRequest;
pub use delegate::{ApplicationDelegate, EchoDelegate};
pub use handler::RequestAdapter;
pub use predicate::should_read_data;
