//! In-memory organizational hierarchy engine.
//!
//! Maintains a mutable tree of named, typed nodes and exposes structural
//! operations over it: insert, delete, duplicate (recursively), reparent
//! (drag-and-drop), rename, and dynamic leaf-to-container conversion, plus
//! substring search with ancestor-match propagation.
//!
//! The [`TreeStore`] is the single owner of all nodes; every mutation goes
//! through the [`MutationEngine`], which validates before it writes and
//! reports the affected ids after each commit. The rendering/interaction
//! layer is an external collaborator: it calls the operation surface and
//! observes [`ChangeSet`]s, nothing more.

pub mod display;
pub mod engine;
pub mod errors;
pub mod ident;
pub mod node;
pub mod notify;
pub mod search;
pub mod snapshot;
pub mod store;
pub mod util;

pub use display::TreeDisplay;
pub use engine::{Capability, MutationEngine, NodeKind, Position, COPY_MARKER};
pub use errors::{TreeError, TreeResult};
pub use ident::{IdProvider, SerialProvider, UuidProvider};
pub use node::{Category, Node, NodeId};
pub use notify::{ChangeListener, ChangeSet};
pub use search::SearchIndex;
pub use snapshot::TreeSnapshot;
pub use store::TreeStore;
