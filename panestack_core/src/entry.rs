// Copyright 2026 the Panestack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-content bookkeeping.

use core::fmt;

use kurbo::Rect;

use crate::content::{Content, ContentId};
use crate::error::ContentError;
use crate::lifecycle::{LifecycleEvent, LifecyclePhase};
use crate::transition::TransitionDescriptor;

/// A stack's record of one managed content.
///
/// The entry exclusively owns its content; dropping the entry releases it.
pub struct ContentEntry<C> {
    content: C,
    id: ContentId,
    view_loaded: bool,
    phase: LifecyclePhase,
    added_animated: bool,
    transition: TransitionDescriptor,
}

impl<C: Content> fmt::Debug for ContentEntry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentEntry")
            .field("id", &self.id)
            .field("view_loaded", &self.view_loaded)
            .field("phase", &self.phase)
            .field("added_animated", &self.added_animated)
            .field("transition", &self.transition)
            .finish_non_exhaustive()
    }
}

impl<C: Content> ContentEntry<C> {
    pub(crate) fn new(content: C, transition: TransitionDescriptor, animated: bool) -> Self {
        Self {
            id: content.id(),
            content,
            view_loaded: false,
            phase: LifecyclePhase::Unloaded,
            added_animated: animated,
            transition,
        }
    }

    /// Identity of the content.
    #[must_use]
    pub fn id(&self) -> ContentId {
        self.id
    }

    /// The managed content.
    #[must_use]
    pub fn content(&self) -> &C {
        &self.content
    }

    pub(crate) fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    /// Whether the content's view currently exists.
    #[must_use]
    pub fn is_view_loaded(&self) -> bool {
        self.view_loaded
    }

    /// The last lifecycle event forwarded to the content.
    #[must_use]
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Whether the entry was inserted with animation.
    ///
    /// Handed to the executor in the reverse plan built when the entry is
    /// popped.
    #[must_use]
    pub fn added_animated(&self) -> bool {
        self.added_animated
    }

    /// The descriptor used to bring this entry in.
    #[must_use]
    pub fn transition(&self) -> TransitionDescriptor {
        self.transition
    }

    /// Loads the view if needed and sizes it to `bounds`.
    ///
    /// An entry whose view was released for capacity reasons keeps its last
    /// disappear phase, so it can appear again without passing through
    /// `Loaded`.
    pub(crate) fn load_view(&mut self, bounds: Rect) -> Result<(), ContentError> {
        if self.view_loaded {
            return Ok(());
        }
        self.content.load_view()?;
        self.content.size_to_bounds(bounds);
        self.view_loaded = true;
        if self.phase == LifecyclePhase::Unloaded {
            self.phase = LifecyclePhase::Loaded;
        }
        log::trace!("{:?}: view loaded", self.id);
        Ok(())
    }

    pub(crate) fn size_to_bounds(&mut self, bounds: Rect) {
        if self.view_loaded {
            self.content.size_to_bounds(bounds);
        }
    }

    /// Forwards `event` if it is coherent with the current phase.
    ///
    /// Returns whether the event was delivered.
    pub(crate) fn forward(&mut self, event: LifecycleEvent, animated: bool) -> bool {
        if !self.view_loaded {
            log::trace!("{:?}: {event:?} ignored, view not loaded", self.id);
            return false;
        }
        let Some(next) = self.phase.after(event) else {
            log::trace!("{:?}: {event:?} ignored in {:?}", self.id, self.phase);
            return false;
        };
        match event {
            LifecycleEvent::WillAppear => self.content.will_appear(animated),
            LifecycleEvent::DidAppear => self.content.did_appear(animated),
            LifecycleEvent::WillDisappear => self.content.will_disappear(animated),
            LifecycleEvent::DidDisappear => self.content.did_disappear(animated),
        }
        self.phase = next;
        true
    }

    /// Delivers whatever events are missing to reach a hidden phase.
    pub(crate) fn settle_hidden(&mut self, animated: bool) {
        for &event in self.phase.path_to_hidden() {
            self.forward(event, animated);
        }
    }

    /// Delivers whatever events are missing to reach the shown phase.
    pub(crate) fn settle_shown(&mut self, animated: bool) {
        for &event in self.phase.path_to_shown() {
            self.forward(event, animated);
        }
    }

    /// Releases the view for capacity reasons.
    ///
    /// The phase stays at its last disappear value.
    pub(crate) fn release_view(&mut self) {
        if !self.view_loaded {
            return;
        }
        self.settle_hidden(false);
        self.content.unload_view();
        self.view_loaded = false;
        self.content.did_unload();
        log::trace!("{:?}: view released", self.id);
    }

    /// Releases the view and forces the phase back to `Unloaded`.
    pub(crate) fn unload(&mut self) {
        self.release_view();
        self.phase = LifecyclePhase::Unloaded;
    }

    /// Consumes the entry, notifying the content if its view was loaded.
    pub(crate) fn destroy(mut self) -> C {
        self.release_view();
        self.content
    }
}
