// Copyright 2026 the Panestack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The container stack state machine.
//!
//! A [`ContainerStack`] owns an ordered sequence of [`ContentEntry`] values
//! (index 0 is the root, the last one is on top) and keeps three things
//! consistent while entries are inserted and removed:
//!
//! - **Lifecycle**: appearance events reach each content exactly once and in
//!   a coherent order, even when a transition is interrupted or aborted.
//! - **Capacity**: only the topmost entries inside the capacity window keep
//!   their view loaded, and loaded entries always form a contiguous suffix of
//!   the stack.
//! - **Transitions**: at most one transition is in flight. Requests issued
//!   while it runs are queued and applied in FIFO order once it settles.
//!
//! # Transition flow
//!
//! ```text
//!   request ──► validate ──► load views ──► build animation
//!                                               │
//!       ┌───────────────────────────────────────┘
//!       ▼
//!   "will" notifications ──► run_instantaneous ─────────────► settle
//!                       └──► run_animated ──► (running) ──► finish_transition ──► settle
//! ```
//!
//! Everything that can fail (view loading, building the animation) happens
//! before the first notification. If the executor fails while *running* the
//! animation, the change is rolled back and every "will" already delivered is
//! matched by a cancelling "did".
//!
//! Only the top entry receives appearance events; it is the one the stack
//! considers shown, even when entries below remain visible through
//! transparency. Its properties (see [`Content::title`]) are the ones
//! forwarded to the container.
//!
//! # Queued requests
//!
//! A request issued while a transition runs is checked against everything
//! that is already known: the current entries and the insertions queued
//! before it. Violations found then are returned right away. The rest
//! (indices, contents removed by an earlier queued request, collaborator
//! failures) can only be decided when the request is applied; such failures
//! are reported through [`StackObserver::request_rejected`].
//!
//! # Threading
//!
//! A stack is meant to be driven from a single UI thread. It is neither
//! `Send` nor `Sync` when its observer or executor are not, and it never
//! blocks: an animated transition returns [`RequestStatus::Started`] and the
//! host reports completion later.

mod request;
#[cfg(test)]
mod tests;

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Weak;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::time::Duration;

use kurbo::Rect;

pub use request::{InsertPosition, PopTarget, RequestStatus, StackState};
use request::{Request, Slot};

use crate::config::StackConfig;
use crate::content::{ContainerView, Content, ContentId, Orientation};
use crate::entry::ContentEntry;
use crate::error::{ContentError, StackError};
use crate::lifecycle::{LifecycleEvent, LifecyclePhase};
use crate::observer::{
    AppearanceEvent, ObserverSlot, Outcome, PopEvent, PushEvent, StackObserver, TopChangeEvent,
};
use crate::transition::{
    Animation, AnimationStatus, Direction, TransitionDescriptor, TransitionExecutor, TransitionId,
    TransitionPlan,
};

/// A stack of contents displayed in one container view.
pub struct ContainerStack<C> {
    entries: Vec<ContentEntry<C>>,
    config: StackConfig,
    container_view: Option<ContainerView>,
    container_phase: LifecyclePhase,
    executor: Box<dyn TransitionExecutor>,
    observer: ObserverSlot,
    state: StackState,
    in_flight: Option<InFlight>,
    queue: VecDeque<Request<C>>,
    next_transition: u64,
    /// Top content as last reported through `top_changed`.
    reported_top: Option<ContentId>,
}

/// The transition currently running, and what settling it will do.
struct InFlight {
    id: TransitionId,
    animation: Option<Box<dyn Animation>>,
    change: Change,
    animated: bool,
    visible: bool,
}

#[derive(Clone, Copy, Debug)]
enum Change {
    Push(PushEvent),
    /// Entries from `keep` upwards are removed when the pop settles.
    Pop { event: PopEvent, keep: usize },
}

impl<C: Content> fmt::Debug for ContainerStack<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerStack")
            .field("entries", &self.entries)
            .field("config", &self.config)
            .field("container_view", &self.container_view)
            .field("container_phase", &self.container_phase)
            .field("observer", &self.observer)
            .field("state", &self.state)
            .field("in_flight", &self.in_flight.as_ref().map(|f| f.id))
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl<C: Content> ContainerStack<C> {
    /// Creates an empty stack.
    ///
    /// Contents can be pushed right away; their views are only loaded once a
    /// container view is attached with
    /// [`set_container_view`](Self::set_container_view).
    #[must_use]
    pub fn new(config: StackConfig, executor: Box<dyn TransitionExecutor>) -> Self {
        Self {
            entries: Vec::new(),
            config,
            container_view: None,
            container_phase: LifecyclePhase::Unloaded,
            executor,
            observer: ObserverSlot::new(),
            state: StackState::Idle,
            in_flight: None,
            queue: VecDeque::new(),
            next_transition: 0,
            reported_top: None,
        }
    }

    // -- Queries --

    /// Returns the construction-time configuration.
    #[must_use]
    pub fn config(&self) -> StackConfig {
        self.config
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the stack has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the bottommost content.
    #[must_use]
    pub fn root(&self) -> Option<ContentId> {
        self.entries.first().map(ContentEntry::id)
    }

    /// Returns the topmost content.
    #[must_use]
    pub fn top(&self) -> Option<ContentId> {
        self.entries.last().map(ContentEntry::id)
    }

    /// Returns the contents from bottom to top.
    pub fn contents(&self) -> impl ExactSizeIterator<Item = ContentId> + '_ {
        self.entries.iter().map(ContentEntry::id)
    }

    /// Returns the entries from bottom to top.
    #[must_use]
    pub fn entries(&self) -> &[ContentEntry<C>] {
        &self.entries
    }

    /// Returns the entry at `index`.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&ContentEntry<C>> {
        self.entries.get(index)
    }

    /// Returns the index of `id`.
    #[must_use]
    pub fn index_of(&self, id: ContentId) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    /// Returns the content with the given identity.
    #[must_use]
    pub fn content(&self, id: ContentId) -> Option<&C> {
        self.entries
            .iter()
            .find(|e| e.id() == id)
            .map(ContentEntry::content)
    }

    /// Returns the content with the given identity, mutably.
    pub fn content_mut(&mut self, id: ContentId) -> Option<&mut C> {
        self.entries
            .iter_mut()
            .find(|e| e.id() == id)
            .map(ContentEntry::content_mut)
    }

    /// Returns how many entries currently have their view loaded.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_view_loaded()).count()
    }

    /// Returns the transition machinery state.
    #[must_use]
    pub fn state(&self) -> StackState {
        self.state
    }

    /// Returns the transition in flight, if any.
    #[must_use]
    pub fn transition_in_flight(&self) -> Option<TransitionId> {
        self.in_flight.as_ref().map(|f| f.id)
    }

    /// Returns the title forwarded by the top content.
    #[must_use]
    pub fn forwarded_title(&self) -> Option<&str> {
        self.entries.last().and_then(|e| e.content().title())
    }

    /// Returns the number of requests waiting for the in-flight transition.
    #[must_use]
    pub fn queued_requests(&self) -> usize {
        self.queue.len()
    }

    /// Returns the attached container view.
    #[must_use]
    pub fn container_view(&self) -> Option<ContainerView> {
        self.container_view
    }

    /// Returns the last lifecycle event forwarded to the container itself.
    #[must_use]
    pub fn container_phase(&self) -> LifecyclePhase {
        self.container_phase
    }

    /// Returns whether the container is appearing or appeared.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.container_view.is_some()
            && matches!(
                self.container_phase,
                LifecyclePhase::WillAppear | LifecyclePhase::Appeared
            )
    }

    fn can_animate(&self) -> bool {
        self.container_view.is_some() && self.container_phase == LifecyclePhase::Appeared
    }

    fn bounds(&self) -> Rect {
        self.container_view.map_or(Rect::ZERO, |v| v.bounds)
    }

    // -- Observer --

    /// Registers the observer. The stack does not keep it alive.
    pub fn set_observer(&mut self, observer: Weak<RefCell<dyn StackObserver>>) {
        self.observer.attach(observer);
    }

    /// Removes the observer registration.
    pub fn detach_observer(&mut self) {
        self.observer.detach();
    }

    // -- Container view --

    /// Attaches (or replaces) the container view.
    ///
    /// Loaded views are resized to the new bounds and the capacity window is
    /// loaded.
    ///
    /// # Errors
    ///
    /// - [`StackError::TransitionInFlight`] while a transition runs; nothing
    ///   changes.
    /// - [`StackError::Content`] if a window view fails to load. The view
    ///   stays attached.
    pub fn set_container_view(&mut self, view: ContainerView) -> Result<(), StackError> {
        if self.in_flight.is_some() {
            return Err(StackError::TransitionInFlight);
        }
        self.container_view = Some(view);
        if self.container_phase == LifecyclePhase::Unloaded {
            self.container_phase = LifecyclePhase::Loaded;
        }
        for entry in &mut self.entries {
            entry.size_to_bounds(view.bounds);
        }
        self.refill_window()?;
        Ok(())
    }

    /// Releases every loaded view and detaches the container view.
    ///
    /// A transition in flight is first brought to its end state. Each loaded
    /// content receives whatever disappear events it is missing, then
    /// `did_unload`.
    pub fn release_views(&mut self) {
        self.finish_in_flight();
        for entry in &mut self.entries {
            if entry.is_view_loaded() {
                entry.unload();
            }
        }
        self.container_view = None;
        self.container_phase = LifecyclePhase::Unloaded;
        self.drain();
    }

    // -- Mutations --

    /// Pushes `content` on top of the stack.
    ///
    /// # Errors
    ///
    /// See [`insert`](Self::insert).
    pub fn push(
        &mut self,
        content: C,
        descriptor: TransitionDescriptor,
        animated: bool,
    ) -> Result<RequestStatus, StackError> {
        self.insert(content, InsertPosition::Top, descriptor, animated)
    }

    /// Inserts `content` at `position`.
    ///
    /// Inserting on top is a push: it runs `descriptor` forward and notifies
    /// observers. Inserting lower in the stack runs no transition and emits
    /// no notification.
    ///
    /// # Errors
    ///
    /// - [`StackError::IndexOutOfBounds`] / [`StackError::UnknownContent`] if
    ///   the position does not exist.
    /// - [`StackError::DuplicateContent`] if the content is already managed.
    /// - [`StackError::InvalidRootInsertion`] if it would displace a mandatory
    ///   root.
    /// - [`StackError::Content`] / [`StackError::Transition`] on collaborator
    ///   failure.
    ///
    /// While a transition runs, a duplicate, an unknown sibling, or a
    /// position displacing a mandatory root is still rejected here; other
    /// failures surface when the queued request is applied.
    pub fn insert(
        &mut self,
        content: C,
        position: InsertPosition,
        descriptor: TransitionDescriptor,
        animated: bool,
    ) -> Result<RequestStatus, StackError> {
        self.submit(Request::Insert {
            content,
            position,
            descriptor,
            animated,
        })
    }

    /// Inserts `content` at `index`.
    ///
    /// # Errors
    ///
    /// See [`insert`](Self::insert).
    pub fn insert_at(
        &mut self,
        content: C,
        index: usize,
        descriptor: TransitionDescriptor,
        animated: bool,
    ) -> Result<RequestStatus, StackError> {
        self.insert(content, InsertPosition::Index(index), descriptor, animated)
    }

    /// Inserts `content` right below `sibling`.
    ///
    /// # Errors
    ///
    /// See [`insert`](Self::insert).
    pub fn insert_below(
        &mut self,
        content: C,
        sibling: ContentId,
        descriptor: TransitionDescriptor,
        animated: bool,
    ) -> Result<RequestStatus, StackError> {
        self.insert(content, InsertPosition::Below(sibling), descriptor, animated)
    }

    /// Inserts `content` right above `sibling`.
    ///
    /// # Errors
    ///
    /// See [`insert`](Self::insert).
    pub fn insert_above(
        &mut self,
        content: C,
        sibling: ContentId,
        descriptor: TransitionDescriptor,
        animated: bool,
    ) -> Result<RequestStatus, StackError> {
        self.insert(content, InsertPosition::Above(sibling), descriptor, animated)
    }

    /// Removes the entry at `index`.
    ///
    /// Removing the top entry is a pop. Removing a lower entry destroys it
    /// silently.
    ///
    /// # Errors
    ///
    /// - [`StackError::IndexOutOfBounds`] for an invalid index.
    /// - [`StackError::RootMandatory`] when removing a mandatory root.
    /// - [`StackError::Content`] / [`StackError::Transition`] on collaborator
    ///   failure.
    pub fn remove_at(&mut self, index: usize, animated: bool) -> Result<RequestStatus, StackError> {
        self.submit(Request::Remove {
            slot: Slot::Index(index),
            animated,
        })
    }

    /// Removes `id` from the stack.
    ///
    /// # Errors
    ///
    /// See [`remove_at`](Self::remove_at); [`StackError::UnknownContent`] if
    /// `id` is not managed.
    pub fn remove_content(
        &mut self,
        id: ContentId,
        animated: bool,
    ) -> Result<RequestStatus, StackError> {
        self.submit(Request::Remove {
            slot: Slot::Content(id),
            animated,
        })
    }

    /// Pops the top entry, replaying its descriptor in reverse.
    ///
    /// # Errors
    ///
    /// - [`StackError::EmptyStack`] if there is nothing to pop.
    /// - [`StackError::RootMandatory`] if only a mandatory root is left.
    /// - [`StackError::Content`] / [`StackError::Transition`] on collaborator
    ///   failure.
    pub fn pop(&mut self, animated: bool) -> Result<RequestStatus, StackError> {
        self.submit(Request::Remove {
            slot: Slot::Top,
            animated,
        })
    }

    /// Pops every entry above `target` in a single transition.
    ///
    /// The top entry's descriptor is replayed in reverse straight to the
    /// target. Intermediate entries are destroyed without appearance events.
    ///
    /// # Errors
    ///
    /// - [`StackError::IndexOutOfBounds`] / [`StackError::UnknownContent`] if
    ///   the target does not exist.
    /// - [`StackError::RootMandatory`] for [`PopTarget::All`] on a stack with a
    ///   mandatory root.
    /// - [`StackError::Content`] / [`StackError::Transition`] on collaborator
    ///   failure.
    pub fn pop_to(&mut self, target: PopTarget, animated: bool) -> Result<RequestStatus, StackError> {
        self.submit(Request::PopTo { target, animated })
    }

    /// Pops every entry above `index`.
    ///
    /// # Errors
    ///
    /// See [`pop_to`](Self::pop_to).
    pub fn pop_to_index(
        &mut self,
        index: usize,
        animated: bool,
    ) -> Result<RequestStatus, StackError> {
        self.pop_to(PopTarget::Index(index), animated)
    }

    /// Pops every entry above `id`; `None` pops everything.
    ///
    /// # Errors
    ///
    /// See [`pop_to`](Self::pop_to).
    pub fn pop_to_content(
        &mut self,
        id: Option<ContentId>,
        animated: bool,
    ) -> Result<RequestStatus, StackError> {
        let target = id.map_or(PopTarget::All, PopTarget::Content);
        self.pop_to(target, animated)
    }

    /// Pops every entry above the root.
    ///
    /// # Errors
    ///
    /// See [`pop_to`](Self::pop_to).
    pub fn pop_to_root(&mut self, animated: bool) -> Result<RequestStatus, StackError> {
        if self.entries.is_empty() {
            return Err(StackError::EmptyStack);
        }
        self.pop_to(PopTarget::Index(0), animated)
    }

    /// Pops every entry.
    ///
    /// # Errors
    ///
    /// See [`pop_to`](Self::pop_to).
    pub fn pop_all(&mut self, animated: bool) -> Result<RequestStatus, StackError> {
        self.pop_to(PopTarget::All, animated)
    }

    // -- Transition completion --

    /// Reports that the animation of transition `id` has finished.
    ///
    /// Delivers the "did" events, enforces capacity, then applies queued
    /// requests until one starts a new animation.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::UnknownTransition`] if `id` is not in flight.
    pub fn finish_transition(&mut self, id: TransitionId) -> Result<(), StackError> {
        match &self.in_flight {
            Some(flight) if flight.id == id => {}
            _ => return Err(StackError::UnknownTransition(id)),
        }
        if let Some(flight) = self.in_flight.take() {
            self.complete(flight, Outcome::Completed);
        }
        self.drain();
        Ok(())
    }

    /// Jumps the in-flight transition to its end state, then applies queued
    /// requests.
    ///
    /// Returns whether a transition was interrupted.
    pub fn interrupt_transition(&mut self) -> bool {
        let interrupted = self.finish_in_flight();
        self.drain();
        interrupted
    }

    // -- Lifecycle forwarding --

    /// The container is about to appear.
    ///
    /// Loads the capacity window and forwards `will_appear` to the top
    /// content. Ignored unless the container view is attached and the call is
    /// coherent with the container's phase.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Content`] if a window view fails to load; the
    /// container phase is left unchanged.
    pub fn view_will_appear(&mut self, animated: bool) -> Result<(), StackError> {
        if !self.container_accepts(LifecycleEvent::WillAppear) {
            return Ok(());
        }
        self.refill_window()?;
        self.container_phase = LifecyclePhase::WillAppear;
        if let Some(top) = self.entries.last_mut() {
            top.forward(LifecycleEvent::WillAppear, animated);
        }
        Ok(())
    }

    /// The container has appeared.
    pub fn view_did_appear(&mut self, animated: bool) {
        if !self.container_accepts(LifecycleEvent::DidAppear) {
            return;
        }
        self.container_phase = LifecyclePhase::Appeared;
        if let Some(top) = self.entries.last_mut() {
            top.forward(LifecycleEvent::DidAppear, animated);
        }
    }

    /// The container is about to disappear.
    ///
    /// A transition in flight is first brought to its end state.
    pub fn view_will_disappear(&mut self, animated: bool) {
        if !self.container_accepts(LifecycleEvent::WillDisappear) {
            return;
        }
        self.finish_in_flight();
        self.container_phase = LifecyclePhase::WillDisappear;
        if let Some(top) = self.entries.last_mut() {
            top.forward(LifecycleEvent::WillDisappear, animated);
        }
        self.drain();
    }

    /// The container has disappeared.
    pub fn view_did_disappear(&mut self, animated: bool) {
        if !self.container_accepts(LifecycleEvent::DidDisappear) {
            return;
        }
        self.finish_in_flight();
        self.container_phase = LifecyclePhase::Disappeared;
        if let Some(top) = self.entries.last_mut() {
            top.forward(LifecycleEvent::DidDisappear, animated);
        }
        self.drain();
    }

    fn container_accepts(&self, event: LifecycleEvent) -> bool {
        let accepts = self.container_view.is_some() && self.container_phase.accepts(event);
        if !accepts {
            log::trace!("container {event:?} ignored in {:?}", self.container_phase);
        }
        accepts
    }

    // -- Rotation forwarding --

    /// Returns whether every loaded content supports `orientation`.
    #[must_use]
    pub fn should_autorotate(&self, orientation: Orientation) -> bool {
        self.entries
            .iter()
            .filter(|e| e.is_view_loaded())
            .all(|e| e.content().should_autorotate(orientation))
    }

    /// Forwards the start of a rotation to every loaded content.
    pub fn will_rotate(&mut self, to: Orientation, duration: Duration) {
        for entry in self.loaded_mut() {
            entry.content_mut().will_rotate(to, duration);
        }
    }

    /// Forwards the rotation animation setup to every loaded content.
    pub fn will_animate_rotation(&mut self, to: Orientation, duration: Duration) {
        for entry in self.loaded_mut() {
            entry.content_mut().will_animate_rotation(to, duration);
        }
    }

    /// Forwards the end of a rotation to every loaded content.
    pub fn did_rotate(&mut self, from: Orientation) {
        for entry in self.loaded_mut() {
            entry.content_mut().did_rotate(from);
        }
    }

    fn loaded_mut(&mut self) -> impl Iterator<Item = &mut ContentEntry<C>> {
        self.entries.iter_mut().filter(|e| e.is_view_loaded())
    }

    // -- Request handling --

    fn submit(&mut self, request: Request<C>) -> Result<RequestStatus, StackError> {
        if self.in_flight.is_some() {
            self.check_queueable(&request)?;
            log::debug!("transition in flight, queueing {request:?}");
            self.queue.push_back(request);
            return Ok(RequestStatus::Queued);
        }
        self.apply(request)
    }

    fn check_queueable(&self, request: &Request<C>) -> Result<(), StackError> {
        let root = self.root().filter(|_| self.config.root_mandatory);
        match request {
            Request::Insert {
                content, position, ..
            } => {
                let id = content.id();
                if self.is_known(id) {
                    return Err(StackError::DuplicateContent(id));
                }
                match *position {
                    InsertPosition::Index(0) if root.is_some() => {
                        return Err(StackError::InvalidRootInsertion);
                    }
                    InsertPosition::Below(sibling) if root == Some(sibling) => {
                        return Err(StackError::InvalidRootInsertion);
                    }
                    InsertPosition::Below(sibling) | InsertPosition::Above(sibling) => {
                        self.check_known(sibling)?;
                    }
                    InsertPosition::Index(_) | InsertPosition::Top => {}
                }
            }
            Request::Remove {
                slot: Slot::Content(id),
                ..
            } => {
                if root == Some(*id) {
                    return Err(StackError::RootMandatory);
                }
                self.check_known(*id)?;
            }
            Request::Remove {
                slot: Slot::Index(0),
                ..
            }
            | Request::PopTo {
                target: PopTarget::All,
                ..
            } if root.is_some() => return Err(StackError::RootMandatory),
            Request::PopTo {
                target: PopTarget::Content(id),
                ..
            } => self.check_known(*id)?,
            Request::Remove { .. } | Request::PopTo { .. } => {}
        }
        Ok(())
    }

    /// Whether `id` is in the stack or waiting in a queued insertion.
    fn is_known(&self, id: ContentId) -> bool {
        self.index_of(id).is_some()
            || self
                .queue
                .iter()
                .any(|r| matches!(r, Request::Insert { content, .. } if content.id() == id))
    }

    fn check_known(&self, id: ContentId) -> Result<(), StackError> {
        if self.is_known(id) {
            Ok(())
        } else {
            Err(StackError::UnknownContent(id))
        }
    }

    /// Applies queued requests until one starts an animation.
    fn drain(&mut self) {
        while self.in_flight.is_none() {
            let Some(request) = self.queue.pop_front() else {
                break;
            };
            if let Err(err) = self.apply(request) {
                log::warn!("queued request rejected: {err}");
                self.observer.request_rejected(&err);
            }
        }
    }

    fn apply(&mut self, request: Request<C>) -> Result<RequestStatus, StackError> {
        match request {
            Request::Insert {
                content,
                position,
                descriptor,
                animated,
            } => {
                let index = self.resolve_insert(position)?;
                let id = content.id();
                if self.index_of(id).is_some() {
                    return Err(StackError::DuplicateContent(id));
                }
                if index == 0 && !self.entries.is_empty() && self.config.root_mandatory {
                    return Err(StackError::InvalidRootInsertion);
                }
                if index == self.entries.len() {
                    self.push_top(content, descriptor, animated)
                } else {
                    self.insert_below_top(content, index, descriptor)
                }
            }
            Request::Remove { slot, animated } => {
                let index = self.resolve_slot(slot)?;
                if index == 0 && self.config.root_mandatory {
                    return Err(StackError::RootMandatory);
                }
                if index + 1 == self.entries.len() {
                    self.pop_top(index.checked_sub(1), animated)
                } else {
                    self.remove_below_top(index)
                }
            }
            Request::PopTo { target, animated } => {
                let count = self.entries.len();
                let target = match target {
                    PopTarget::Index(index) if index < count => Some(index),
                    PopTarget::Index(index) => {
                        return Err(StackError::IndexOutOfBounds { index, count });
                    }
                    PopTarget::Content(id) => {
                        Some(self.index_of(id).ok_or(StackError::UnknownContent(id))?)
                    }
                    PopTarget::All if self.config.root_mandatory && count > 0 => {
                        return Err(StackError::RootMandatory);
                    }
                    PopTarget::All => None,
                };
                if count == 0 || target == Some(count - 1) {
                    return Ok(RequestStatus::Applied);
                }
                self.pop_top(target, animated)
            }
        }
    }

    fn resolve_insert(&self, position: InsertPosition) -> Result<usize, StackError> {
        let count = self.entries.len();
        match position {
            InsertPosition::Top => Ok(count),
            InsertPosition::Index(index) if index <= count => Ok(index),
            InsertPosition::Index(index) => Err(StackError::IndexOutOfBounds { index, count }),
            InsertPosition::Below(id) => self.index_of(id).ok_or(StackError::UnknownContent(id)),
            InsertPosition::Above(id) => self
                .index_of(id)
                .map(|i| i + 1)
                .ok_or(StackError::UnknownContent(id)),
        }
    }

    fn resolve_slot(&self, slot: Slot) -> Result<usize, StackError> {
        let count = self.entries.len();
        match slot {
            Slot::Top => count.checked_sub(1).ok_or(StackError::EmptyStack),
            Slot::Index(index) if index < count => Ok(index),
            Slot::Index(index) => Err(StackError::IndexOutOfBounds { index, count }),
            Slot::Content(id) => self.index_of(id).ok_or(StackError::UnknownContent(id)),
        }
    }

    fn next_transition_id(&mut self) -> TransitionId {
        let id = TransitionId(self.next_transition);
        self.next_transition += 1;
        id
    }

    // -- Insertion and removal --

    fn push_top(
        &mut self,
        content: C,
        descriptor: TransitionDescriptor,
        animated: bool,
    ) -> Result<RequestStatus, StackError> {
        let visible = self.is_visible();
        let animated = animated && self.can_animate();
        let covered = self.top();
        let bounds = self.bounds();
        let mut entry = ContentEntry::new(content, descriptor, animated);
        let pushed = entry.id();

        if self.container_view.is_some() {
            entry.load_view(bounds)?;
        }
        let id = self.next_transition_id();
        let animation = if visible {
            let plan = TransitionPlan {
                id,
                descriptor,
                direction: Direction::Forward,
                disappearing: covered,
                appearing: Some(pushed),
                added_animated: animated,
                bounds,
            };
            match self.executor.build(&plan) {
                Ok(animation) => Some(animation),
                Err(err) => {
                    entry.destroy();
                    return Err(err.into());
                }
            }
        } else {
            None
        };

        log::debug!("push {pushed:?} over {covered:?} (animated: {animated})");
        let event = PushEvent {
            pushed,
            covered,
            animated,
        };
        self.observer.will_push(&event);
        self.entries.push(entry);
        let top = self.entries.len() - 1;
        if visible {
            if let Some(below) = top.checked_sub(1) {
                self.entries[below].forward(LifecycleEvent::WillDisappear, animated);
            }
            self.entries[top].forward(LifecycleEvent::WillAppear, animated);
            self.observer.will_show(&AppearanceEvent {
                content: pushed,
                animated,
            });
            if let Some(covered) = covered {
                self.observer.will_hide(&AppearanceEvent {
                    content: covered,
                    animated,
                });
            }
        }

        self.run(InFlight {
            id,
            animation,
            change: Change::Push(event),
            animated,
            visible,
        })
    }

    /// Pops the top entry and every entry above `target` (`None`: all).
    fn pop_top(
        &mut self,
        target: Option<usize>,
        animated: bool,
    ) -> Result<RequestStatus, StackError> {
        let Some(top) = self.entries.len().checked_sub(1) else {
            return Ok(RequestStatus::Applied);
        };
        let visible = self.is_visible();
        let animated = animated && self.can_animate();
        let bounds = self.bounds();
        let popped = self.entries[top].id();
        let revealed = target.map(|t| self.entries[t].id());
        let keep = target.map_or(0, |t| t + 1);

        // Lazy reload of an entry unloaded for capacity reasons.
        let mut reloaded = None;
        if let Some(t) = target
            && self.container_view.is_some()
            && !self.entries[t].is_view_loaded()
        {
            self.entries[t].load_view(bounds)?;
            reloaded = Some(t);
        }
        let id = self.next_transition_id();
        let animation = if visible {
            let plan = TransitionPlan {
                id,
                descriptor: self.entries[top].transition(),
                direction: Direction::Reverse,
                disappearing: Some(popped),
                appearing: revealed,
                added_animated: self.entries[top].added_animated(),
                bounds,
            };
            match self.executor.build(&plan) {
                Ok(animation) => Some(animation),
                Err(err) => {
                    if let Some(t) = reloaded {
                        self.entries[t].release_view();
                    }
                    return Err(err.into());
                }
            }
        } else {
            None
        };

        log::debug!("pop {popped:?} to {revealed:?} (animated: {animated})");
        let event = PopEvent {
            popped,
            revealed,
            animated,
        };
        self.observer.will_pop(&event);
        // Intermediate entries never take part in the animation.
        for entry in &mut self.entries[keep..top] {
            entry.release_view();
        }
        if visible {
            if let Some(t) = target {
                self.entries[t].forward(LifecycleEvent::WillAppear, animated);
            }
            self.entries[top].forward(LifecycleEvent::WillDisappear, animated);
            if let Some(revealed) = revealed {
                self.observer.will_show(&AppearanceEvent {
                    content: revealed,
                    animated,
                });
            }
            self.observer.will_hide(&AppearanceEvent {
                content: popped,
                animated,
            });
        }

        self.run(InFlight {
            id,
            animation,
            change: Change::Pop { event, keep },
            animated,
            visible,
        })
    }

    fn insert_below_top(
        &mut self,
        content: C,
        index: usize,
        descriptor: TransitionDescriptor,
    ) -> Result<RequestStatus, StackError> {
        let mut entry = ContentEntry::new(content, descriptor, false);
        let count = self.entries.len() + 1;
        if self.container_view.is_some() && self.config.capacity.contains(index, count) {
            entry.load_view(self.bounds())?;
        }
        log::debug!("insert {:?} at {index}", entry.id());
        self.entries.insert(index, entry);
        self.settle();
        Ok(RequestStatus::Applied)
    }

    fn remove_below_top(&mut self, index: usize) -> Result<RequestStatus, StackError> {
        let entry = self.entries.remove(index);
        log::debug!("remove {:?} at {index}", entry.id());
        entry.destroy();
        self.settle();
        Ok(RequestStatus::Applied)
    }

    // -- Transition execution --

    fn run(&mut self, mut flight: InFlight) -> Result<RequestStatus, StackError> {
        let Some(mut animation) = flight.animation.take() else {
            self.complete(flight, Outcome::Completed);
            return Ok(RequestStatus::Applied);
        };
        let started = if flight.animated {
            animation.run_animated()
        } else {
            animation
                .run_instantaneous()
                .map(|()| AnimationStatus::Finished)
        };
        match started {
            Ok(AnimationStatus::Running) => {
                let id = flight.id;
                log::debug!("{id:?} running");
                flight.animation = Some(animation);
                self.state = StackState::TransitionRunning;
                self.in_flight = Some(flight);
                Ok(RequestStatus::Started(id))
            }
            Ok(AnimationStatus::Finished) => {
                self.complete(flight, Outcome::Completed);
                Ok(RequestStatus::Applied)
            }
            Err(err) => {
                log::warn!("{:?} aborted: {err}", flight.id);
                self.complete(flight, Outcome::Cancelled);
                Err(err.into())
            }
        }
    }

    /// Brings the in-flight transition to its end state without draining the
    /// queue.
    fn finish_in_flight(&mut self) -> bool {
        let Some(mut flight) = self.in_flight.take() else {
            return false;
        };
        log::debug!("interrupting {:?}", flight.id);
        if let Some(animation) = flight.animation.as_mut() {
            animation.cancel();
        }
        self.complete(flight, Outcome::Completed);
        true
    }

    fn complete(&mut self, flight: InFlight, outcome: Outcome) {
        let InFlight {
            change,
            animated,
            visible,
            ..
        } = flight;
        match change {
            Change::Push(event) => self.complete_push(&event, animated, visible, outcome),
            Change::Pop { event, keep } => {
                self.complete_pop(&event, keep, animated, visible, outcome);
            }
        }
        self.state = StackState::Idle;
        self.settle();
        self.report_top();
    }

    /// Notifies the observer if the top content changed since the last
    /// report.
    fn report_top(&mut self) {
        let top = self.top();
        if top == self.reported_top {
            return;
        }
        let previous = core::mem::replace(&mut self.reported_top, top);
        log::debug!("top {previous:?} -> {top:?}");
        self.observer.top_changed(&TopChangeEvent {
            previous,
            top,
            title: self.forwarded_title(),
        });
    }

    fn complete_push(&mut self, event: &PushEvent, animated: bool, visible: bool, outcome: Outcome) {
        let pushed = self.index_of(event.pushed);
        let covered = event.covered.and_then(|id| self.index_of(id));
        if visible {
            match outcome {
                Outcome::Completed => {
                    if let Some(i) = covered {
                        self.entries[i].settle_hidden(animated);
                    }
                    if let Some(i) = pushed {
                        self.finish_appearance(i, animated);
                    }
                }
                Outcome::Cancelled => {
                    if let Some(i) = covered {
                        self.cancel_disappearance(i, animated);
                    }
                    if let Some(i) = pushed {
                        self.entries[i].forward(LifecycleEvent::DidDisappear, animated);
                    }
                }
            }
            if let Some(covered) = event.covered {
                self.observer.did_hide(
                    &AppearanceEvent {
                        content: covered,
                        animated,
                    },
                    outcome,
                );
            }
            self.observer.did_show(
                &AppearanceEvent {
                    content: event.pushed,
                    animated,
                },
                outcome,
            );
        }
        if outcome == Outcome::Cancelled
            && let Some(i) = pushed
        {
            self.entries.remove(i).destroy();
        }
        self.observer.did_push(event, outcome);
    }

    fn complete_pop(
        &mut self,
        event: &PopEvent,
        keep: usize,
        animated: bool,
        visible: bool,
        outcome: Outcome,
    ) {
        let popped = self.index_of(event.popped);
        let revealed = event.revealed.and_then(|id| self.index_of(id));
        let hide = AppearanceEvent {
            content: event.popped,
            animated,
        };
        let show = event.revealed.map(|content| AppearanceEvent { content, animated });
        match outcome {
            Outcome::Completed => {
                if visible {
                    if let Some(i) = popped {
                        self.entries[i].settle_hidden(animated);
                    }
                    self.observer.did_hide(&hide, outcome);
                }
                // Popped entry first, then the intermediates below it.
                for entry in self.entries.drain(keep..).rev() {
                    entry.destroy();
                }
                if visible {
                    if let Some(i) = revealed {
                        self.finish_appearance(i, animated);
                    }
                    if let Some(show) = show {
                        self.observer.did_show(&show, outcome);
                    }
                }
            }
            Outcome::Cancelled => {
                if visible {
                    if let Some(i) = popped {
                        self.cancel_disappearance(i, animated);
                    }
                    if let Some(i) = revealed {
                        self.entries[i].forward(LifecycleEvent::DidDisappear, animated);
                    }
                    self.observer.did_hide(&hide, outcome);
                    if let Some(show) = show {
                        self.observer.did_show(&show, outcome);
                    }
                }
            }
        }
        self.observer.did_pop(event, outcome);
    }

    /// Completes the appearance of a newly shown entry, unless the container
    /// itself is still appearing (its own `did_appear` will finish the job).
    fn finish_appearance(&mut self, index: usize, animated: bool) {
        if self.container_phase == LifecyclePhase::Appeared {
            self.entries[index].settle_shown(animated);
        }
    }

    /// Returns an entry whose disappearance was aborted to the shown state.
    fn cancel_disappearance(&mut self, index: usize, animated: bool) {
        if self.entries[index].phase() == LifecyclePhase::WillDisappear {
            self.entries[index].forward(LifecycleEvent::DidAppear, animated);
        }
    }

    // -- Capacity --

    /// Restores the resting invariants once no transition is in flight.
    ///
    /// Only the top entry may be shown; entries below the capacity window
    /// are evicted or have their views released; the window is loaded if the
    /// container has a view.
    fn settle(&mut self) {
        if let Some(below) = self.entries.len().checked_sub(1) {
            for entry in &mut self.entries[..below] {
                if entry.phase().is_visible() {
                    entry.settle_hidden(false);
                }
            }
        }

        let capacity = self.config.capacity;
        if self.config.removing {
            let start = capacity.window_start(self.entries.len());
            let first = usize::from(self.config.root_mandatory).min(start);
            for entry in self.entries.drain(first..start) {
                log::debug!("evicting {:?}", entry.id());
                entry.destroy();
            }
        }
        let start = capacity.window_start(self.entries.len());
        for entry in &mut self.entries[..start] {
            entry.release_view();
        }

        if let Err(err) = self.refill_window() {
            log::warn!("capacity window not fully loaded: {err}");
        }
    }

    /// Loads the views of the capacity window, top first.
    fn refill_window(&mut self) -> Result<(), ContentError> {
        let Some(view) = self.container_view else {
            return Ok(());
        };
        let start = self.config.capacity.window_start(self.entries.len());
        for entry in self.entries[start..].iter_mut().rev() {
            entry.load_view(view.bounds)?;
        }
        Ok(())
    }
}
