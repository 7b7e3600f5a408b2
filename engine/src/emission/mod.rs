//! Emission loops and their supervisor
//!
//! ```text
//! Supervisor ──spawn──► EmissionLoop (entity 1) ──► Submitter ──► Sink
//!     │                 EmissionLoop (entity 2) ──┘
//!     └── watch<bool> ──► every loop
//! ```
//!
//! Loops never talk to each other. The only shared mutable state is the
//! cancellation flag, set once by [`SupervisorHandle::stop_and_wait`].

mod supervisor;
mod task;

pub use supervisor::{StopReport, Supervisor, SupervisorHandle};
pub use task::EmissionLoop;
