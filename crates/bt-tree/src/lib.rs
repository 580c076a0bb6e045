//! Declarative behavior tree assembly and execution built on `bt-core`.
//!
//! A tree is described as data ([`NodeDeclaration`], usually loaded from JSON), assembled into a
//! slug-indexed [`TreeRegistry`], and evaluated one pass per [`BehaviorTree::tick`]. Leaves and
//! `Selector` nodes call back into a [`HandlerRegistry`] populated by the embedding application.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod assemble;
pub mod catalog;
mod composite;
pub mod config;
pub mod declaration;
mod decorator;
pub mod error;
pub mod handlers;
mod leaf;
pub mod registry;
pub mod ticker;
pub mod tree;

pub use assemble::{assemble, ROOT_SLUG};
pub use catalog::{
    CompositeKind, DecoratorKind, DecoratorState, LeafKind, NodeCategory, NodeKind, RuntimeNode,
};
pub use composite::weighted_choice;
pub use config::TreeConfig;
pub use declaration::NodeDeclaration;
pub use error::{TreeError, TreeResult};
pub use handlers::{
    ActionHandler, ConditionHandler, HandlerKind, HandlerRegistry, SelectorHandler,
};
pub use registry::{DeclaredNode, TreeEntry, TreeRegistry};
pub use ticker::{SharedTree, Ticker, TickerExit, TickerHandle, TickerReport};
pub use tree::{BehaviorTree, ExecutionState, TickOutcome};
