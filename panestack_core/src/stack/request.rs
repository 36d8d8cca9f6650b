// Copyright 2026 the Panestack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Client requests and their queueing while a transition is in flight.

use core::fmt;

use crate::content::ContentId;
use crate::transition::{TransitionDescriptor, TransitionId};

/// Where to insert a new content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InsertPosition {
    /// At this index; existing entries from it upwards shift up.
    Index(usize),
    /// On top of the stack (a push).
    Top,
    /// Right below the given content.
    Below(ContentId),
    /// Right above the given content.
    Above(ContentId),
}

/// What to pop back to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PopTarget {
    /// Pop every entry above this index.
    Index(usize),
    /// Pop every entry above this content.
    Content(ContentId),
    /// Pop everything.
    All,
}

/// Entry addressed by a removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Slot {
    /// Whatever is on top when the request is applied.
    Top,
    Index(usize),
    Content(ContentId),
}

/// What a mutation did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    /// The change was applied and has settled.
    Applied,
    /// An animated transition started; the change settles when the host
    /// reports completion of this transition.
    Started(TransitionId),
    /// A transition is in flight; the request will be applied after it
    /// (and any earlier queued request) settles.
    Queued,
}

/// Lifecycle of the stack's transition machinery.
///
/// Validation, view loading, the "will" notifications and starting the
/// animation all happen within the call that issued the request, so a stack
/// is only ever seen idle or with an animation running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StackState {
    /// No transition in flight; requests apply immediately.
    #[default]
    Idle,
    /// An animation is running; requests are queued until the host reports
    /// its end.
    TransitionRunning,
}

pub(crate) enum Request<C> {
    Insert {
        content: C,
        position: InsertPosition,
        descriptor: TransitionDescriptor,
        animated: bool,
    },
    Remove {
        slot: Slot,
        animated: bool,
    },
    PopTo {
        target: PopTarget,
        animated: bool,
    },
}

impl<C> fmt::Debug for Request<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert {
                position, animated, ..
            } => f
                .debug_struct("Insert")
                .field("position", position)
                .field("animated", animated)
                .finish_non_exhaustive(),
            Self::Remove { slot, animated } => f
                .debug_struct("Remove")
                .field("slot", slot)
                .field("animated", animated)
                .finish(),
            Self::PopTo { target, animated } => f
                .debug_struct("PopTo")
                .field("target", target)
                .field("animated", animated)
                .finish(),
        }
    }
}
