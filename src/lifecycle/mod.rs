//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     CoreConfig → Telemetry → alert monitor + span janitor + HTTP server
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → tasks exit their loops → drain with deadline
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
pub use startup::{launch, SHUTDOWN_GRACE};
