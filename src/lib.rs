//! Identity-stable layout node tracking.
//!
//! A declarative layout is re-evaluated every frame. Each evaluation (a *pass*) asks for the
//! node backing every renderable it visits; [`NodeCollection`] hands back the same node for the
//! same renderable instance across passes, builds nodes for renderables it has not seen, and
//! lets nodes whose renderable disappeared play an exit transition before they are destroyed.
//!
//! A pass looks like:
//!
//! - [`NodeCollection::begin`] with the pass sequence and id table, returning an
//!   [`AccessContext`]
//! - the layout pulls nodes through [`AccessContext::next`], [`AccessContext::by_id`],
//!   [`AccessContext::by_array_element`] and [`AccessContext::set`]
//! - [`NodeCollection::mark_remaining`] starts exit transitions for untouched nodes
//! - [`NodeCollection::finalize_and_purge`] collects specs and destroys finished nodes
#![forbid(unsafe_code)]

mod foundation;

pub mod collection;
pub mod context;
pub mod ease;
pub mod fade;
pub mod ids;
pub mod node;
pub mod replay;
pub mod sequence;

pub use collection::{Iter, NodeCollection, NodeCollectionOpts, NodeEntry, PassStats};
pub use context::{AccessContext, Lookup, SetTarget};
pub use ease::Ease;
pub use fade::{ExitTransition, FadeFactory, FadeNode, FadeProps, NodeSpec};
pub use foundation::error::{LayoutError, LayoutResult};
pub use ids::{IdEntry, IdTable};
pub use node::{LayoutNode, NodeFactory};
pub use replay::{IdValue, PassReport, PassScript, ReplayScript, ScriptTarget, SetOp, replay};
pub use sequence::{ListSequence, Renderable, Sequence};
