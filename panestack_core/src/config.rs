// Copyright 2026 the Panestack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capacity configuration.
//!
//! A stack's capacity bounds how many *view representations* may be loaded at
//! the same time, not how many contents are retained. The topmost `capacity`
//! entries form the *capacity window*; entries below it have their views
//! released, or are removed altogether when [`StackConfig::removing`] is set.
//!
//! During an animated insertion the previously topmost entry keeps its view
//! until the transition settles, so up to `capacity + 1` views may be loaded
//! transiently.

use core::num::NonZeroUsize;

/// Maximum number of concurrently loaded views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Capacity {
    /// At most this many views are loaded once transitions settle.
    Limited(NonZeroUsize),
    /// Views are never released for capacity reasons.
    Unlimited,
}

impl Capacity {
    /// Only the top view is loaded.
    pub const MINIMAL: Self = Self::Limited(NonZeroUsize::MIN);
    /// The top view and the one right below it are loaded.
    pub const DEFAULT: Self = Self::Limited(NonZeroUsize::MIN.saturating_add(1));
    /// No limit.
    pub const UNLIMITED: Self = Self::Unlimited;

    /// Creates a limited capacity, or `None` if `n` is zero.
    #[must_use]
    pub const fn limited(n: usize) -> Option<Self> {
        match NonZeroUsize::new(n) {
            Some(n) => Some(Self::Limited(n)),
            None => None,
        }
    }

    /// Returns the index of the lowest entry inside the capacity window of a
    /// stack holding `count` entries.
    #[must_use]
    pub const fn window_start(self, count: usize) -> usize {
        match self {
            Self::Limited(n) => count.saturating_sub(n.get()),
            Self::Unlimited => 0,
        }
    }

    /// Returns whether `index` lies inside the capacity window of a stack
    /// holding `count` entries.
    #[must_use]
    pub const fn contains(self, index: usize, count: usize) -> bool {
        index < count && index >= self.window_start(count)
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Construction-time parameters of a [`ContainerStack`](crate::stack::ContainerStack).
///
/// These are fixed for the lifetime of a stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackConfig {
    /// View loading capacity.
    pub capacity: Capacity,
    /// Whether entries falling below the capacity window are removed instead
    /// of merely having their views released.
    pub removing: bool,
    /// Whether the root entry may ever be removed.
    pub root_mandatory: bool,
}

impl StackConfig {
    /// A navigation-style stack: entries are kept, the root is mandatory.
    #[must_use]
    pub const fn new(capacity: Capacity) -> Self {
        Self {
            capacity,
            removing: false,
            root_mandatory: true,
        }
    }

    /// A placeholder-style stack showing a single content at a time.
    ///
    /// Inserting a new content removes the previous one once the transition
    /// settles; the stack may become empty.
    #[must_use]
    pub const fn single_content() -> Self {
        Self {
            capacity: Capacity::MINIMAL,
            removing: true,
            root_mandatory: false,
        }
    }

    /// Sets [`removing`](Self::removing).
    #[must_use]
    pub const fn removing(mut self, removing: bool) -> Self {
        self.removing = removing;
        self
    }

    /// Sets [`root_mandatory`](Self::root_mandatory).
    #[must_use]
    pub const fn root_mandatory(mut self, root_mandatory: bool) -> Self {
        self.root_mandatory = root_mandatory;
        self
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self::new(Capacity::DEFAULT)
    }
}
