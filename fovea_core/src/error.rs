// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Two families of failure are surfaced synchronously to the caller of a
//! registry or scheduling API:
//!
//! - [`ConfigError`] — the registry was asked about something it was never
//!   told about (an undeclared item class or focus set), or told about
//!   something twice.
//! - [`StateError`] — the request is well-formed but the current state cannot
//!   satisfy it (a stale handle, an item with no entity, an animation without
//!   a duration).
//!
//! Failures of individual [`Action`](crate::action::Action)s are different:
//! they are caught inside a pipeline batch and reported as
//! [`ActionFailure`](crate::action::ActionFailure) without aborting sibling
//! actions.

use crate::graph::{EdgeId, Entity, NodeId};
use crate::item::{ItemClass, ItemId, ItemKind};

/// Mis-configuration of the registry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The item class was never declared with
    /// [`Registry::add_item_class`](crate::registry::Registry::add_item_class).
    #[error("unknown item class `{0}`")]
    UnknownItemClass(ItemClass),
    /// The item class was declared twice.
    #[error("item class `{0}` is already declared")]
    DuplicateItemClass(ItemClass),
    /// The operation needs a class of a different kind.
    #[error("item class `{class}` holds {actual:?} items, expected {expected:?}")]
    KindMismatch {
        /// Class the operation was aimed at.
        class: ItemClass,
        /// Kind the operation requires.
        expected: ItemKind,
        /// Kind the class was declared with.
        actual: ItemKind,
    },
    /// No focus set with this name exists.
    #[error("unknown focus set `{0}`")]
    UnknownFocusSet(String),
    /// A focus set with this name already exists.
    #[error("focus set `{0}` already exists")]
    DuplicateFocusSet(String),
}

/// An operation that cannot be satisfied in the current state.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum StateError {
    /// The handle refers to an item that has been released.
    #[error("stale item handle {0:?}")]
    StaleItem(ItemId),
    /// The item has no backing entity attached.
    #[error("item {0:?} has no backing entity")]
    NoEntity(ItemId),
    /// The entity is not part of the backing graph.
    #[error("entity {0:?} is not in the graph")]
    MissingEntity(Entity),
    /// An edge item was requested before both endpoint node items exist.
    #[error("edge {0:?} has an endpoint without a registered node item")]
    MissingEndpoint(EdgeId),
    /// The node is already the tree child of another node.
    #[error("node {0:?} already has a tree parent")]
    AlreadyParented(NodeId),
    /// The tree link would make a node its own ancestor.
    #[error("linking {child:?} under {parent:?} would close a tree cycle")]
    TreeCycle {
        /// Intended parent.
        parent: NodeId,
        /// Intended child, equal to or an ancestor of `parent`.
        child: NodeId,
    },
    /// An animation was requested without a configured duration.
    #[error("pipeline `{0}` has no animation duration configured")]
    NoDuration(String),
    /// An animation was requested with a frame rate that is not a positive
    /// finite number.
    #[error("invalid frame rate {0}")]
    InvalidFrameRate(f64),
    /// The scheduler thread for this pipeline is no longer running.
    #[error("scheduler thread for pipeline `{0}` has stopped")]
    SchedulerStopped(String),
}

/// Either kind of synchronous failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// See [`StateError`].
    #[error(transparent)]
    State(#[from] StateError),
    /// The operating system refused to start a scheduler thread.
    #[error("failed to spawn scheduler thread")]
    Spawn(#[source] std::io::Error),
}

/// Result alias for registry and scheduling operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert_into_error() {
        let err: Error = ConfigError::UnknownItemClass(ItemClass::NODE).into();
        assert!(matches!(
            err,
            Error::Config(ConfigError::UnknownItemClass(ItemClass::NODE))
        ));
        assert_eq!(err.to_string(), "unknown item class `node`");
    }

    #[test]
    fn state_error_messages_name_the_pipeline() {
        let err: Error = StateError::NoDuration("zoom".into()).into();
        assert_eq!(
            err.to_string(),
            "pipeline `zoom` has no animation duration configured"
        );
    }
}
