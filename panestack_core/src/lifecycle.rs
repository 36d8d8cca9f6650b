// Copyright 2026 the Panestack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View lifecycle phases and the coherence rules for forwarding events.
//!
//! Phases follow a fixed cycle:
//!
//! ```text
//!   Unloaded ──► Loaded ──► WillAppear ──► Appeared ──► WillDisappear ──► Disappeared
//!      ▲                        ▲                                             │
//!      └────────────────────────┼─────────────────────────────────────────────┘
//!                               └─────────────────────────────────────────────┘
//! ```
//!
//! Two *cancelling* edges let an interrupted appearance or disappearance
//! terminate with a "did" event: `WillAppear ──didDisappear──► Disappeared`
//! and `WillDisappear ──didAppear──► Appeared`.
//!
//! A forwarded event that does not match an outgoing edge of the current
//! phase is ignored. Hosts may call their hooks redundantly; that is never an
//! error.

/// The last lifecycle event delivered to a content (or to the container).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LifecyclePhase {
    /// No view representation exists.
    #[default]
    Unloaded,
    /// The view exists but has never been shown.
    Loaded,
    /// The view is being shown.
    WillAppear,
    /// The view is shown.
    Appeared,
    /// The view is being hidden.
    WillDisappear,
    /// The view is hidden.
    Disappeared,
}

/// An appearance event forwarded to a content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// `will_appear`.
    WillAppear,
    /// `did_appear`.
    DidAppear,
    /// `will_disappear`.
    WillDisappear,
    /// `did_disappear`.
    DidDisappear,
}

impl LifecyclePhase {
    /// Returns the phase reached by delivering `event`, or `None` if the
    /// event is incoherent with the current phase.
    #[must_use]
    pub const fn after(self, event: LifecycleEvent) -> Option<Self> {
        match (self, event) {
            (Self::Loaded | Self::Disappeared, LifecycleEvent::WillAppear) => Some(Self::WillAppear),
            (Self::WillAppear | Self::WillDisappear, LifecycleEvent::DidAppear) => {
                Some(Self::Appeared)
            }
            (Self::Appeared, LifecycleEvent::WillDisappear) => Some(Self::WillDisappear),
            (Self::WillDisappear | Self::WillAppear, LifecycleEvent::DidDisappear) => {
                Some(Self::Disappeared)
            }
            _ => None,
        }
    }

    /// Returns whether `event` may be forwarded in this phase.
    #[must_use]
    pub const fn accepts(self, event: LifecycleEvent) -> bool {
        self.after(event).is_some()
    }

    /// Returns whether the view is on screen or transitioning on or off it.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::WillAppear | Self::Appeared | Self::WillDisappear)
    }

    /// Events that bring this phase to a hidden resting state.
    #[must_use]
    pub const fn path_to_hidden(self) -> &'static [LifecycleEvent] {
        match self {
            Self::WillAppear | Self::WillDisappear => &[LifecycleEvent::DidDisappear],
            Self::Appeared => &[LifecycleEvent::WillDisappear, LifecycleEvent::DidDisappear],
            Self::Unloaded | Self::Loaded | Self::Disappeared => &[],
        }
    }

    /// Events that bring this phase to the shown resting state.
    #[must_use]
    pub const fn path_to_shown(self) -> &'static [LifecycleEvent] {
        match self {
            Self::Loaded | Self::Disappeared => &[LifecycleEvent::WillAppear, LifecycleEvent::DidAppear],
            Self::WillAppear | Self::WillDisappear => &[LifecycleEvent::DidAppear],
            Self::Unloaded | Self::Appeared => &[],
        }
    }
}
