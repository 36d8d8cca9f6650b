// Copyright 2026 the Panestack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observer notifications emitted by a container stack.
//!
//! [`StackObserver`] has one method per notification. Every method has a
//! default no-op body, so implementing only the hooks you care about is fine.
//! Observers are never required for correctness.
//!
//! For each visible change the stack emits, in order:
//!
//! ```text
//!   push:  will_push  will_show(new)      will_hide(old)?   <transition>
//!          did_hide(old)?  did_show(new)  did_push
//!   pop:   will_pop   will_show(revealed)? will_hide(popped) <transition>
//!          did_hide(popped) did_show(revealed)? did_pop
//! ```
//!
//! Once a change settles and the top content differs from the one last
//! reported, [`StackObserver::top_changed`] follows, carrying the properties
//! the new top forwards to its container (see [`Content::title`]).
//!
//! Show/hide notifications are only emitted while the container is visible.
//! The "did" hooks carry an [`Outcome`]: when an executor failure aborts a
//! transition, every "will" already emitted is still matched by its "did",
//! with [`Outcome::Cancelled`].
//!
//! A request queued behind a running transition that fails once it is
//! applied is reported through [`StackObserver::request_rejected`].
//!
//! A stack holds its observer through a [`Weak`] reference
//! ([`ObserverSlot`]); dropping the observer detaches it automatically.
//!
//! [`Content::title`]: crate::content::Content::title

use alloc::rc::Weak;
use core::cell::RefCell;
use core::fmt;

use crate::content::ContentId;
use crate::error::StackError;

/// Payload of the push notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PushEvent {
    /// Content being pushed.
    pub pushed: ContentId,
    /// Content that was on top before the push, if any.
    pub covered: Option<ContentId>,
    /// Whether the push is animated.
    pub animated: bool,
}

/// Payload of the pop notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PopEvent {
    /// Content being popped (the top content before the pop).
    pub popped: ContentId,
    /// Content that will be on top afterwards, if any.
    pub revealed: Option<ContentId>,
    /// Whether the pop is animated.
    pub animated: bool,
}

/// Payload of the show and hide notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AppearanceEvent {
    /// Content being shown or hidden.
    pub content: ContentId,
    /// Whether the change is animated.
    pub animated: bool,
}

/// Payload of [`StackObserver::top_changed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TopChangeEvent<'a> {
    /// Top content reported by the previous notification.
    pub previous: Option<ContentId>,
    /// Content now on top, if any.
    pub top: Option<ContentId>,
    /// Title forwarded by the new top content.
    pub title: Option<&'a str>,
}

/// How a transition ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The transition reached its end state.
    Completed,
    /// The transition was aborted and the stack kept its previous state.
    Cancelled,
}

/// Receives notifications from a container stack.
pub trait StackObserver {
    /// Called before `pushed` is added to the stack.
    fn will_push(&mut self, e: &PushEvent) {
        _ = e;
    }

    /// Called after a push settled.
    fn did_push(&mut self, e: &PushEvent, outcome: Outcome) {
        _ = (e, outcome);
    }

    /// Called before the top content is popped. `popped` is still in the
    /// stack.
    fn will_pop(&mut self, e: &PopEvent) {
        _ = e;
    }

    /// Called after `popped` has been removed from the stack.
    fn did_pop(&mut self, e: &PopEvent, outcome: Outcome) {
        _ = (e, outcome);
    }

    /// Called before a content is shown. The content is always in the stack,
    /// even when this results from a push.
    fn will_show(&mut self, e: &AppearanceEvent) {
        _ = e;
    }

    /// Called after a content has been shown.
    fn did_show(&mut self, e: &AppearanceEvent, outcome: Outcome) {
        _ = (e, outcome);
    }

    /// Called before a content is hidden.
    fn will_hide(&mut self, e: &AppearanceEvent) {
        _ = e;
    }

    /// Called after a content has been hidden. The content is still in the
    /// stack.
    fn did_hide(&mut self, e: &AppearanceEvent, outcome: Outcome) {
        _ = (e, outcome);
    }

    /// Called once a change has settled with a different content on top.
    fn top_changed(&mut self, e: &TopChangeEvent<'_>) {
        _ = e;
    }

    /// Called when a queued request fails as it is applied. The request has
    /// been dropped and the stack is unchanged by it.
    fn request_rejected(&mut self, error: &StackError) {
        _ = error;
    }
}

/// A [`StackObserver`] that discards all notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl StackObserver for NoopObserver {}

/// Non-owning observer registration held by a stack.
///
/// Dispatch upgrades the weak reference and borrows the observer for the
/// duration of one call. A dropped observer is skipped silently; an observer
/// that is already borrowed (re-entrant dispatch) is skipped with a warning.
#[derive(Default)]
pub struct ObserverSlot {
    observer: Option<Weak<RefCell<dyn StackObserver>>>,
}

impl fmt::Debug for ObserverSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSlot")
            .field("attached", &self.is_attached())
            .finish_non_exhaustive()
    }
}

impl ObserverSlot {
    /// Creates an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { observer: None }
    }

    /// Registers `observer`, replacing any previous registration.
    pub fn attach(&mut self, observer: Weak<RefCell<dyn StackObserver>>) {
        self.observer = Some(observer);
    }

    /// Removes the registration.
    pub fn detach(&mut self) {
        self.observer = None;
    }

    /// Returns whether a live observer is registered.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.observer
            .as_ref()
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    fn dispatch(&self, f: impl FnOnce(&mut dyn StackObserver)) {
        let Some(strong) = self.observer.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        match strong.try_borrow_mut() {
            Ok(mut observer) => f(&mut *observer),
            Err(_) => log::warn!("observer already borrowed; notification skipped"),
        };
    }

    pub(crate) fn will_push(&self, e: &PushEvent) {
        self.dispatch(|o| o.will_push(e));
    }

    pub(crate) fn did_push(&self, e: &PushEvent, outcome: Outcome) {
        self.dispatch(|o| o.did_push(e, outcome));
    }

    pub(crate) fn will_pop(&self, e: &PopEvent) {
        self.dispatch(|o| o.will_pop(e));
    }

    pub(crate) fn did_pop(&self, e: &PopEvent, outcome: Outcome) {
        self.dispatch(|o| o.did_pop(e, outcome));
    }

    pub(crate) fn will_show(&self, e: &AppearanceEvent) {
        self.dispatch(|o| o.will_show(e));
    }

    pub(crate) fn did_show(&self, e: &AppearanceEvent, outcome: Outcome) {
        self.dispatch(|o| o.did_show(e, outcome));
    }

    pub(crate) fn will_hide(&self, e: &AppearanceEvent) {
        self.dispatch(|o| o.will_hide(e));
    }

    pub(crate) fn did_hide(&self, e: &AppearanceEvent, outcome: Outcome) {
        self.dispatch(|o| o.did_hide(e, outcome));
    }

    pub(crate) fn top_changed(&self, e: &TopChangeEvent<'_>) {
        self.dispatch(|o| o.top_changed(e));
    }

    pub(crate) fn request_rejected(&self, error: &StackError) {
        self.dispatch(|o| o.request_rejected(error));
    }
}
