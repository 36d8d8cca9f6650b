// Copyright 2026 the Panestack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Navigation-style facade over a [`ContainerStack`].
//!
//! A [`StackController`] always has a root content, never evicts entries for
//! capacity reasons, and refuses to pop its root. It adds no state-machine
//! logic of its own: every call is a thin validation in front of the
//! underlying stack, and stack notifications are re-emitted to a
//! [`StackControllerObserver`].

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::RefCell;
use core::fmt;
use core::time::Duration;

use crate::config::{Capacity, StackConfig};
use crate::content::{ContainerView, Content, ContentId, Orientation};
use crate::error::StackError;
use crate::observer::{
    AppearanceEvent, Outcome, PopEvent, PushEvent, StackObserver, TopChangeEvent,
};
use crate::stack::{ContainerStack, RequestStatus};
use crate::transition::{TransitionDescriptor, TransitionExecutor, TransitionId};

/// Descriptor used by [`StackController::push`]: no visual effect, for the
/// push and for the pop that later reverses it.
pub const DEFAULT_PUSH: TransitionDescriptor = TransitionDescriptor::NONE;

/// Receives notifications from a [`StackController`].
///
/// Same hooks and ordering as [`StackObserver`]; every method defaults to a
/// no-op.
pub trait StackControllerObserver {
    /// A content is about to be pushed.
    fn will_push(&mut self, e: &PushEvent) {
        _ = e;
    }

    /// A push settled.
    fn did_push(&mut self, e: &PushEvent, outcome: Outcome) {
        _ = (e, outcome);
    }

    /// The top content is about to be popped.
    fn will_pop(&mut self, e: &PopEvent) {
        _ = e;
    }

    /// A pop settled.
    fn did_pop(&mut self, e: &PopEvent, outcome: Outcome) {
        _ = (e, outcome);
    }

    /// A content is about to be shown.
    fn will_show(&mut self, e: &AppearanceEvent) {
        _ = e;
    }

    /// A content has been shown.
    fn did_show(&mut self, e: &AppearanceEvent, outcome: Outcome) {
        _ = (e, outcome);
    }

    /// A content is about to be hidden.
    fn will_hide(&mut self, e: &AppearanceEvent) {
        _ = e;
    }

    /// A content has been hidden.
    fn did_hide(&mut self, e: &AppearanceEvent, outcome: Outcome) {
        _ = (e, outcome);
    }

    /// A different content is now on top.
    fn top_changed(&mut self, e: &TopChangeEvent<'_>) {
        _ = e;
    }

    /// A queued request failed when it was applied.
    fn request_rejected(&mut self, error: &StackError) {
        _ = error;
    }
}

/// Stack observer re-emitting to the controller's own observer.
#[derive(Default)]
struct Forwarder {
    target: Option<Weak<RefCell<dyn StackControllerObserver>>>,
}

impl Forwarder {
    fn dispatch(&self, f: impl FnOnce(&mut dyn StackControllerObserver)) {
        let Some(strong) = self.target.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        match strong.try_borrow_mut() {
            Ok(mut observer) => f(&mut *observer),
            Err(_) => log::warn!("controller observer already borrowed; notification skipped"),
        };
    }
}

impl StackObserver for Forwarder {
    fn will_push(&mut self, e: &PushEvent) {
        self.dispatch(|o| o.will_push(e));
    }

    fn did_push(&mut self, e: &PushEvent, outcome: Outcome) {
        self.dispatch(|o| o.did_push(e, outcome));
    }

    fn will_pop(&mut self, e: &PopEvent) {
        self.dispatch(|o| o.will_pop(e));
    }

    fn did_pop(&mut self, e: &PopEvent, outcome: Outcome) {
        self.dispatch(|o| o.did_pop(e, outcome));
    }

    fn will_show(&mut self, e: &AppearanceEvent) {
        self.dispatch(|o| o.will_show(e));
    }

    fn did_show(&mut self, e: &AppearanceEvent, outcome: Outcome) {
        self.dispatch(|o| o.did_show(e, outcome));
    }

    fn will_hide(&mut self, e: &AppearanceEvent) {
        self.dispatch(|o| o.will_hide(e));
    }

    fn did_hide(&mut self, e: &AppearanceEvent, outcome: Outcome) {
        self.dispatch(|o| o.did_hide(e, outcome));
    }

    fn top_changed(&mut self, e: &TopChangeEvent<'_>) {
        self.dispatch(|o| o.top_changed(e));
    }

    fn request_rejected(&mut self, error: &StackError) {
        self.dispatch(|o| o.request_rejected(error));
    }
}

/// A stack of contents with a mandatory root.
pub struct StackController<C> {
    stack: ContainerStack<C>,
    forwarder: Rc<RefCell<Forwarder>>,
}

impl<C: Content> fmt::Debug for StackController<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let observed = self
            .forwarder
            .try_borrow()
            .is_ok_and(|fw| fw.target.as_ref().is_some_and(|w| w.strong_count() > 0));
        f.debug_struct("StackController")
            .field("stack", &self.stack)
            .field("observed", &observed)
            .finish_non_exhaustive()
    }
}

impl<C: Content> StackController<C> {
    /// Creates a controller showing `root`, with the default capacity.
    #[must_use]
    pub fn new(root: C, executor: Box<dyn TransitionExecutor>) -> Self {
        Self::with_capacity(root, Capacity::DEFAULT, executor)
    }

    /// Creates a controller showing `root`.
    #[must_use]
    pub fn with_capacity(root: C, capacity: Capacity, executor: Box<dyn TransitionExecutor>) -> Self {
        let mut stack = ContainerStack::new(StackConfig::new(capacity), executor);
        let forwarder = Rc::new(RefCell::new(Forwarder::default()));
        let observer: Rc<RefCell<dyn StackObserver>> = forwarder.clone();
        stack.set_observer(Rc::downgrade(&observer));
        // Without a container view nothing is loaded or animated yet.
        let installed = stack.push(root, TransitionDescriptor::NONE, false);
        debug_assert!(installed.is_ok(), "root installation failed: {installed:?}");
        Self { stack, forwarder }
    }

    /// Returns the underlying stack.
    #[must_use]
    pub fn stack(&self) -> &ContainerStack<C> {
        &self.stack
    }

    /// Returns the root content.
    #[must_use]
    pub fn root(&self) -> Option<ContentId> {
        self.stack.root()
    }

    /// Returns the top content.
    #[must_use]
    pub fn top(&self) -> Option<ContentId> {
        self.stack.top()
    }

    /// Returns the contents from bottom to top.
    pub fn contents(&self) -> impl ExactSizeIterator<Item = ContentId> + '_ {
        self.stack.contents()
    }

    /// Returns the number of contents, root included.
    #[must_use]
    pub fn count(&self) -> usize {
        self.stack.count()
    }

    /// Returns the content with the given identity.
    #[must_use]
    pub fn content(&self, id: ContentId) -> Option<&C> {
        self.stack.content(id)
    }

    /// Returns the title forwarded by the top content.
    #[must_use]
    pub fn forwarded_title(&self) -> Option<&str> {
        self.stack.forwarded_title()
    }

    /// Returns the content with the given identity, mutably.
    pub fn content_mut(&mut self, id: ContentId) -> Option<&mut C> {
        self.stack.content_mut(id)
    }

    /// Registers the observer. The controller does not keep it alive.
    pub fn set_observer(&mut self, observer: Weak<RefCell<dyn StackControllerObserver>>) {
        self.forwarder.borrow_mut().target = Some(observer);
    }

    /// Removes the observer registration.
    pub fn detach_observer(&mut self) {
        self.forwarder.borrow_mut().target = None;
    }

    /// Pushes `content` without a visual transition ([`DEFAULT_PUSH`]).
    ///
    /// `animated` still decides whether the change runs through the
    /// executor's animated path; use [`push_with`](Self::push_with) for a
    /// styled push.
    ///
    /// # Errors
    ///
    /// See [`ContainerStack::push`].
    pub fn push(&mut self, content: C, animated: bool) -> Result<RequestStatus, StackError> {
        self.push_with(content, DEFAULT_PUSH, animated)
    }

    /// Pushes `content` with `descriptor`.
    ///
    /// # Errors
    ///
    /// See [`ContainerStack::push`].
    pub fn push_with(
        &mut self,
        content: C,
        descriptor: TransitionDescriptor,
        animated: bool,
    ) -> Result<RequestStatus, StackError> {
        self.stack.push(content, descriptor, animated)
    }

    /// Pops the top content.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::RootNotPoppable`] if only the root is left, and
    /// otherwise the errors of [`ContainerStack::pop`].
    pub fn pop(&mut self, animated: bool) -> Result<RequestStatus, StackError> {
        if self.stack.count() <= 1 {
            return Err(StackError::RootNotPoppable);
        }
        self.stack.pop(animated)
    }

    /// Pops everything above the root.
    ///
    /// # Errors
    ///
    /// See [`ContainerStack::pop_to_root`].
    pub fn pop_to_root(&mut self, animated: bool) -> Result<RequestStatus, StackError> {
        self.stack.pop_to_root(animated)
    }

    /// Pops everything above `id`.
    ///
    /// `None`, or an id the controller does not manage, leaves the stack as
    /// it is.
    ///
    /// # Errors
    ///
    /// See [`ContainerStack::pop_to_content`].
    pub fn pop_to_content(
        &mut self,
        id: Option<ContentId>,
        animated: bool,
    ) -> Result<RequestStatus, StackError> {
        match id {
            Some(id) if self.stack.index_of(id).is_some() => {
                self.stack.pop_to_content(Some(id), animated)
            }
            _ => {
                log::debug!("pop to {id:?} ignored");
                Ok(RequestStatus::Applied)
            }
        }
    }

    /// Reports the end of an animated transition.
    ///
    /// # Errors
    ///
    /// See [`ContainerStack::finish_transition`].
    pub fn finish_transition(&mut self, id: TransitionId) -> Result<(), StackError> {
        self.stack.finish_transition(id)
    }

    /// Jumps the in-flight transition to its end state.
    pub fn interrupt_transition(&mut self) -> bool {
        self.stack.interrupt_transition()
    }

    /// Attaches the container view.
    ///
    /// # Errors
    ///
    /// See [`ContainerStack::set_container_view`].
    pub fn set_container_view(&mut self, view: ContainerView) -> Result<(), StackError> {
        self.stack.set_container_view(view)
    }

    /// Releases every loaded view.
    pub fn release_views(&mut self) {
        self.stack.release_views();
    }

    /// Forwards the container's `will_appear`.
    ///
    /// # Errors
    ///
    /// See [`ContainerStack::view_will_appear`].
    pub fn view_will_appear(&mut self, animated: bool) -> Result<(), StackError> {
        self.stack.view_will_appear(animated)
    }

    /// Forwards the container's `did_appear`.
    pub fn view_did_appear(&mut self, animated: bool) {
        self.stack.view_did_appear(animated);
    }

    /// Forwards the container's `will_disappear`.
    pub fn view_will_disappear(&mut self, animated: bool) {
        self.stack.view_will_disappear(animated);
    }

    /// Forwards the container's `did_disappear`.
    pub fn view_did_disappear(&mut self, animated: bool) {
        self.stack.view_did_disappear(animated);
    }

    /// Returns whether every loaded content supports `orientation`.
    #[must_use]
    pub fn should_autorotate(&self, orientation: Orientation) -> bool {
        self.stack.should_autorotate(orientation)
    }

    /// Forwards the start of a rotation.
    pub fn will_rotate(&mut self, to: Orientation, duration: Duration) {
        self.stack.will_rotate(to, duration);
    }

    /// Forwards the rotation animation setup.
    pub fn will_animate_rotation(&mut self, to: Orientation, duration: Duration) {
        self.stack.will_animate_rotation(to, duration);
    }

    /// Forwards the end of a rotation.
    pub fn did_rotate(&mut self, from: Orientation) {
        self.stack.did_rotate(from);
    }
}
