// Copyright 2026 the Panestack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Errors fall into two groups:
//!
//! - **Precondition violations** (invalid index, duplicate content, removing a
//!   mandatory root, replacing the container view mid-transition). These are
//!   programmer errors. They are detected before any mutation, so the stack is
//!   left exactly as it was.
//! - **External failures** reported by collaborators: a [`ContentError`] from
//!   a content's view provider, or a [`TransitionError`] from the transition
//!   executor. The core never retries them.
//!
//! Redundant lifecycle forwarding is *not* an error; see
//! [`LifecyclePhase::accepts`](crate::lifecycle::LifecyclePhase::accepts).

use crate::content::ContentId;
use crate::transition::TransitionId;

/// Failure reported by a content's view provider.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    /// The view representation could not be created.
    #[error("view of {0:?} could not be loaded")]
    LoadFailed(ContentId),
}

/// Failure reported by the transition executor.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The executor could not build an animation for the requested plan.
    #[error("transition {0:?} could not be built")]
    BuildFailed(TransitionId),
    /// The animation failed to run.
    #[error("transition {0:?} failed to run")]
    RunFailed(TransitionId),
}

/// Errors returned by [`ContainerStack`](crate::stack::ContainerStack) and
/// [`StackController`](crate::controller::StackController) operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StackError {
    /// An index was outside the valid range for the operation.
    #[error("index {index} out of bounds for stack of {count} entries")]
    IndexOutOfBounds {
        /// The rejected index.
        index: usize,
        /// Number of entries at the time of the call.
        count: usize,
    },
    /// The content is already managed by this stack (or queued for insertion).
    #[error("{0:?} is already in the stack")]
    DuplicateContent(ContentId),
    /// The content is not managed by this stack.
    #[error("{0:?} is not in the stack")]
    UnknownContent(ContentId),
    /// The operation would remove the root of a stack whose root is mandatory.
    #[error("the root entry is mandatory and cannot be removed")]
    RootMandatory,
    /// Inserting at index 0 would displace a mandatory root.
    #[error("cannot insert below a mandatory root")]
    InvalidRootInsertion,
    /// The stack controller root cannot be popped.
    #[error("the root content cannot be popped")]
    RootNotPoppable,
    /// The operation needs at least one entry.
    #[error("the stack is empty")]
    EmptyStack,
    /// The container view cannot be replaced while a transition is running.
    #[error("a transition is in flight")]
    TransitionInFlight,
    /// A completion was reported for a transition that is not in flight.
    #[error("{0:?} is not the transition in flight")]
    UnknownTransition(TransitionId),
    /// A view provider failed.
    #[error(transparent)]
    Content(#[from] ContentError),
    /// The transition executor failed.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}
