//! Media triage engine: queue, history, loading, thumbnail window and viewport.
//!
//! All engine state lives on one logical thread. Collaborator calls are the
//! only suspension points; navigation is synchronous and applies at once.

pub mod backend;
pub mod error;
pub mod history;
pub mod loader;
pub mod queue;
pub mod viewport;
pub mod window;

pub use backend::{Interaction, MediaBackend, MediaMetadata, OpStatus, Preview};
pub use error::EngineResult;
pub use loader::{Displayed, PreviewState};
pub use queue::{DeleteOutcome, QueueController};
