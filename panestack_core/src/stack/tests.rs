// Copyright 2026 the Panestack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::time::Duration;

use kurbo::Rect;

use super::*;
use crate::config::Capacity;
use crate::content::SurfaceId;
use crate::error::TransitionError;
use crate::transition::TransitionStyle;

const BOUNDS: Rect = Rect::new(0.0, 0.0, 320.0, 480.0);
const VIEW: ContainerView = ContainerView::new(SurfaceId(1), BOUNDS);
const SLIDE: TransitionDescriptor = TransitionDescriptor::new(TransitionStyle::PushFromRight);

/// Everything observable from outside the stack, in delivery order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ev {
    Load(u64),
    WillAppear(u64),
    DidAppear(u64),
    WillDisappear(u64),
    DidDisappear(u64),
    Unload(u64),
    Rotate(u64),
    WillPush(u64),
    DidPush(u64, Outcome),
    WillPop(u64),
    DidPop(u64, Outcome),
    WillShow(u64),
    DidShow(u64, Outcome),
    WillHide(u64),
    DidHide(u64, Outcome),
    Cancel,
}

use Ev::*;
use Outcome::{Cancelled, Completed};

type Log = Rc<RefCell<Vec<Ev>>>;

struct Pane {
    id: u64,
    log: Log,
    fail_load: bool,
    portrait_only: bool,
    title: Option<&'static str>,
}

impl Content for Pane {
    fn id(&self) -> ContentId {
        ContentId(self.id)
    }

    fn load_view(&mut self) -> Result<(), ContentError> {
        if self.fail_load {
            return Err(ContentError::LoadFailed(ContentId(self.id)));
        }
        self.log.borrow_mut().push(Load(self.id));
        Ok(())
    }

    fn will_appear(&mut self, _animated: bool) {
        self.log.borrow_mut().push(WillAppear(self.id));
    }

    fn did_appear(&mut self, _animated: bool) {
        self.log.borrow_mut().push(DidAppear(self.id));
    }

    fn will_disappear(&mut self, _animated: bool) {
        self.log.borrow_mut().push(WillDisappear(self.id));
    }

    fn did_disappear(&mut self, _animated: bool) {
        self.log.borrow_mut().push(DidDisappear(self.id));
    }

    fn did_unload(&mut self) {
        self.log.borrow_mut().push(Unload(self.id));
    }

    fn title(&self) -> Option<&str> {
        self.title
    }

    fn should_autorotate(&self, orientation: Orientation) -> bool {
        !self.portrait_only || orientation == Orientation::Portrait
    }

    fn will_rotate(&mut self, _to: Orientation, _duration: Duration) {
        self.log.borrow_mut().push(Rotate(self.id));
    }
}

/// Reports that do not fit the event log.
#[derive(Default)]
struct Reports {
    rejected: Vec<StackError>,
    tops: Vec<(Option<u64>, Option<u64>, Option<String>)>,
}

struct Recorder {
    log: Log,
    reports: Rc<RefCell<Reports>>,
}

impl StackObserver for Recorder {
    fn will_push(&mut self, e: &PushEvent) {
        self.log.borrow_mut().push(WillPush(e.pushed.0));
    }

    fn did_push(&mut self, e: &PushEvent, outcome: Outcome) {
        self.log.borrow_mut().push(DidPush(e.pushed.0, outcome));
    }

    fn will_pop(&mut self, e: &PopEvent) {
        self.log.borrow_mut().push(WillPop(e.popped.0));
    }

    fn did_pop(&mut self, e: &PopEvent, outcome: Outcome) {
        self.log.borrow_mut().push(DidPop(e.popped.0, outcome));
    }

    fn will_show(&mut self, e: &AppearanceEvent) {
        self.log.borrow_mut().push(WillShow(e.content.0));
    }

    fn did_show(&mut self, e: &AppearanceEvent, outcome: Outcome) {
        self.log.borrow_mut().push(DidShow(e.content.0, outcome));
    }

    fn will_hide(&mut self, e: &AppearanceEvent) {
        self.log.borrow_mut().push(WillHide(e.content.0));
    }

    fn did_hide(&mut self, e: &AppearanceEvent, outcome: Outcome) {
        self.log.borrow_mut().push(DidHide(e.content.0, outcome));
    }

    fn top_changed(&mut self, e: &TopChangeEvent<'_>) {
        self.reports.borrow_mut().tops.push((
            e.previous.map(|c| c.0),
            e.top.map(|c| c.0),
            e.title.map(ToString::to_string),
        ));
    }

    fn request_rejected(&mut self, error: &StackError) {
        self.reports.borrow_mut().rejected.push(error.clone());
    }
}

/// How the scripted executor behaves for the next transitions it builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Finish,
    Run,
    FailBuild,
    FailRun,
}

struct Scripted {
    mode: Rc<Cell<Mode>>,
    plans: Rc<RefCell<Vec<TransitionPlan>>>,
    log: Log,
}

struct Scene {
    id: TransitionId,
    mode: Mode,
    log: Log,
}

impl TransitionExecutor for Scripted {
    fn build(&mut self, plan: &TransitionPlan) -> Result<Box<dyn Animation>, TransitionError> {
        let mode = self.mode.get();
        if mode == Mode::FailBuild {
            return Err(TransitionError::BuildFailed(plan.id));
        }
        self.plans.borrow_mut().push(*plan);
        Ok(Box::new(Scene {
            id: plan.id,
            mode,
            log: self.log.clone(),
        }))
    }
}

impl Animation for Scene {
    fn run_animated(&mut self) -> Result<AnimationStatus, TransitionError> {
        match self.mode {
            Mode::Run => Ok(AnimationStatus::Running),
            Mode::FailRun => Err(TransitionError::RunFailed(self.id)),
            Mode::Finish | Mode::FailBuild => Ok(AnimationStatus::Finished),
        }
    }

    fn run_instantaneous(&mut self) -> Result<(), TransitionError> {
        match self.mode {
            Mode::FailRun => Err(TransitionError::RunFailed(self.id)),
            _ => Ok(()),
        }
    }

    fn cancel(&mut self) {
        self.log.borrow_mut().push(Cancel);
    }
}

struct Harness {
    stack: ContainerStack<Pane>,
    log: Log,
    mode: Rc<Cell<Mode>>,
    plans: Rc<RefCell<Vec<TransitionPlan>>>,
    reports: Rc<RefCell<Reports>>,
    _observer: Rc<RefCell<dyn StackObserver>>,
}

impl Harness {
    fn new(config: StackConfig) -> Self {
        let log: Log = Rc::default();
        let mode = Rc::new(Cell::new(Mode::Finish));
        let plans: Rc<RefCell<Vec<TransitionPlan>>> = Rc::default();
        let executor = Scripted {
            mode: mode.clone(),
            plans: plans.clone(),
            log: log.clone(),
        };
        let mut stack = ContainerStack::new(config, Box::new(executor));
        let reports: Rc<RefCell<Reports>> = Rc::default();
        let observer: Rc<RefCell<dyn StackObserver>> = Rc::new(RefCell::new(Recorder {
            log: log.clone(),
            reports: reports.clone(),
        }));
        stack.set_observer(Rc::downgrade(&observer));
        Self {
            stack,
            log,
            mode,
            plans,
            reports,
            _observer: observer,
        }
    }

    /// A stack whose container view is attached and on screen.
    fn shown(config: StackConfig) -> Self {
        let mut h = Self::new(config);
        h.stack.set_container_view(VIEW).unwrap();
        h.stack.view_will_appear(false).unwrap();
        h.stack.view_did_appear(false);
        h
    }

    fn pane(&self, id: u64) -> Pane {
        Pane {
            id,
            log: self.log.clone(),
            fail_load: false,
            portrait_only: false,
            title: None,
        }
    }

    fn push(&mut self, id: u64, animated: bool) -> Result<RequestStatus, StackError> {
        let pane = self.pane(id);
        self.stack.push(pane, SLIDE, animated)
    }

    fn push_all(&mut self, ids: &[u64]) {
        for &id in ids {
            self.push(id, true).unwrap();
        }
    }

    fn set_mode(&self, mode: Mode) {
        self.mode.set(mode);
    }

    fn take(&self) -> Vec<Ev> {
        self.log.take()
    }

    fn ids(&self) -> Vec<u64> {
        self.stack.contents().map(|id| id.0).collect()
    }

    fn loaded(&self) -> Vec<u64> {
        self.stack
            .entries()
            .iter()
            .filter(|e| e.is_view_loaded())
            .map(|e| e.id().0)
            .collect()
    }
}

fn started(status: RequestStatus) -> TransitionId {
    match status {
        RequestStatus::Started(id) => id,
        other => panic!("expected a running transition, got {other:?}"),
    }
}

// -- Push and pop --

#[test]
fn push_notification_order() {
    let mut h = Harness::shown(StackConfig::default());
    h.push(1, false).unwrap();
    h.take();

    assert_eq!(h.push(2, true), Ok(RequestStatus::Applied));
    assert_eq!(
        h.take(),
        [
            Load(2),
            WillPush(2),
            WillDisappear(1),
            WillAppear(2),
            WillShow(2),
            WillHide(1),
            DidDisappear(1),
            DidAppear(2),
            DidHide(1, Completed),
            DidShow(2, Completed),
            DidPush(2, Completed),
        ]
    );
    let plan = h.plans.borrow().last().copied().unwrap();
    assert_eq!(plan.direction, Direction::Forward);
    assert_eq!(plan.disappearing, Some(ContentId(1)));
    assert_eq!(plan.appearing, Some(ContentId(2)));
    assert_eq!(plan.bounds, BOUNDS);
    assert!(h.stack.entry(1).unwrap().added_animated());
}

#[test]
fn pop_replays_top_descriptor_in_reverse() {
    let mut h = Harness::shown(StackConfig::default());
    h.push_all(&[1, 2]);
    h.take();

    assert_eq!(h.stack.pop(true), Ok(RequestStatus::Applied));
    assert_eq!(
        h.take(),
        [
            WillPop(2),
            WillAppear(1),
            WillDisappear(2),
            WillShow(1),
            WillHide(2),
            DidDisappear(2),
            DidHide(2, Completed),
            Unload(2),
            DidAppear(1),
            DidShow(1, Completed),
            DidPop(2, Completed),
        ]
    );
    let plan = h.plans.borrow().last().copied().unwrap();
    assert_eq!(plan.direction, Direction::Reverse);
    assert_eq!(plan.descriptor, SLIDE);
    assert_eq!(plan.disappearing, Some(ContentId(2)));
    assert_eq!(plan.appearing, Some(ContentId(1)));
    assert!(plan.added_animated);
    assert_eq!(h.ids(), [1]);
}

#[test]
fn capacity_window_releases_views() {
    let mut h = Harness::shown(StackConfig::new(Capacity::DEFAULT));
    h.push_all(&[1, 2, 3]);

    assert_eq!(h.ids(), [1, 2, 3]);
    assert_eq!(h.loaded(), [2, 3]);
    let root = h.stack.entry(0).unwrap();
    assert_eq!(root.phase(), LifecyclePhase::Disappeared);
    assert_eq!(h.stack.entry(2).unwrap().phase(), LifecyclePhase::Appeared);
}

#[test]
fn pop_to_root_destroys_intermediates_silently() {
    let mut h = Harness::shown(StackConfig::new(Capacity::DEFAULT));
    h.push_all(&[1, 2, 3, 4]);
    h.take();

    assert_eq!(h.stack.pop_to_root(true), Ok(RequestStatus::Applied));
    assert_eq!(
        h.take(),
        [
            // The root's view was released for capacity reasons.
            Load(1),
            WillPop(4),
            Unload(3),
            WillAppear(1),
            WillDisappear(4),
            WillShow(1),
            WillHide(4),
            DidDisappear(4),
            DidHide(4, Completed),
            Unload(4),
            DidAppear(1),
            DidShow(1, Completed),
            DidPop(4, Completed),
        ]
    );
    let plan = h.plans.borrow().last().copied().unwrap();
    assert_eq!(plan.disappearing, Some(ContentId(4)));
    assert_eq!(plan.appearing, Some(ContentId(1)));
    assert_eq!(h.ids(), [1]);
}

#[test]
fn pop_to_content_and_index() {
    let mut h = Harness::shown(StackConfig::new(Capacity::UNLIMITED));
    h.push_all(&[1, 2, 3, 4, 5]);

    h.stack.pop_to_content(Some(ContentId(3)), false).unwrap();
    assert_eq!(h.ids(), [1, 2, 3]);

    // Popping to the current top is a no-op.
    h.take();
    assert_eq!(h.stack.pop_to_index(2, true), Ok(RequestStatus::Applied));
    assert!(h.take().is_empty());

    assert_eq!(
        h.stack.pop_to_index(7, true),
        Err(StackError::IndexOutOfBounds { index: 7, count: 3 })
    );
    assert_eq!(
        h.stack.pop_to_content(Some(ContentId(9)), true),
        Err(StackError::UnknownContent(ContentId(9)))
    );
    h.stack.pop_to_index(1, true).unwrap();
    assert_eq!(h.ids(), [1, 2]);
}

#[test]
fn remove_top_content_is_a_pop() {
    let mut h = Harness::shown(StackConfig::default());
    h.push_all(&[1, 2]);
    h.take();

    h.stack.remove_content(ContentId(2), true).unwrap();
    let log = h.take();
    assert_eq!(log.first(), Some(&WillPop(2)));
    assert_eq!(log.last(), Some(&DidPop(2, Completed)));
    assert_eq!(h.ids(), [1]);
}

// -- Preconditions --

#[test]
fn mandatory_root_cannot_be_removed() {
    let mut h = Harness::shown(StackConfig::default());
    h.push(1, false).unwrap();
    h.take();

    assert_eq!(h.stack.remove_at(0, true), Err(StackError::RootMandatory));
    assert_eq!(
        h.stack.remove_content(ContentId(1), true),
        Err(StackError::RootMandatory)
    );
    assert_eq!(h.stack.pop(true), Err(StackError::RootMandatory));
    assert_eq!(h.stack.pop_all(true), Err(StackError::RootMandatory));
    let pane = h.pane(2);
    assert_eq!(
        h.stack.insert_at(pane, 0, SLIDE, true),
        Err(StackError::InvalidRootInsertion)
    );

    assert_eq!(h.ids(), [1]);
    assert!(h.take().is_empty(), "rejected requests must not notify");
}

#[test]
fn duplicate_content_is_rejected() {
    let mut h = Harness::shown(StackConfig::default());
    h.push_all(&[1, 2]);
    h.take();

    assert_eq!(h.push(1, true), Err(StackError::DuplicateContent(ContentId(1))));
    assert_eq!(h.ids(), [1, 2]);
    assert!(h.take().is_empty());
}

#[test]
fn empty_stack_errors() {
    let mut h = Harness::shown(StackConfig::default());
    assert_eq!(h.stack.pop(true), Err(StackError::EmptyStack));
    assert_eq!(h.stack.pop_to_root(true), Err(StackError::EmptyStack));
    assert_eq!(h.stack.root(), None);
    assert_eq!(h.stack.top(), None);
    assert!(h.stack.is_empty());
}

#[test]
fn load_failure_aborts_before_notifying() {
    let mut h = Harness::shown(StackConfig::default());
    h.push(1, false).unwrap();
    h.take();

    let mut pane = h.pane(2);
    pane.fail_load = true;
    assert_eq!(
        h.stack.push(pane, SLIDE, true),
        Err(StackError::Content(ContentError::LoadFailed(ContentId(2))))
    );
    assert!(h.take().is_empty());
    assert_eq!(h.ids(), [1]);
}

#[test]
fn build_failure_leaves_stack_untouched() {
    let mut h = Harness::shown(StackConfig::default());
    h.push(1, false).unwrap();
    h.take();

    h.set_mode(Mode::FailBuild);
    let err = h.push(2, true).unwrap_err();
    assert!(
        matches!(err, StackError::Transition(TransitionError::BuildFailed(_))),
        "unexpected error: {err:?}"
    );
    // The view loaded for the push is released again; nothing else happens.
    assert_eq!(h.take(), [Load(2), Unload(2)]);
    assert_eq!(h.ids(), [1]);
    assert_eq!(h.stack.state(), StackState::Idle);
}

// -- Aborted transitions --

#[test]
fn run_failure_cancels_push() {
    let mut h = Harness::shown(StackConfig::default());
    h.push(1, false).unwrap();
    h.take();

    h.set_mode(Mode::FailRun);
    let err = h.push(2, true).unwrap_err();
    assert!(
        matches!(err, StackError::Transition(TransitionError::RunFailed(_))),
        "unexpected error: {err:?}"
    );
    assert_eq!(
        h.take(),
        [
            Load(2),
            WillPush(2),
            WillDisappear(1),
            WillAppear(2),
            WillShow(2),
            WillHide(1),
            DidAppear(1),
            DidDisappear(2),
            DidHide(1, Cancelled),
            DidShow(2, Cancelled),
            Unload(2),
            DidPush(2, Cancelled),
        ]
    );
    assert_eq!(h.ids(), [1]);
    assert_eq!(h.stack.entry(0).unwrap().phase(), LifecyclePhase::Appeared);
    assert_eq!(h.stack.state(), StackState::Idle);
}

#[test]
fn run_failure_cancels_pop() {
    let mut h = Harness::shown(StackConfig::new(Capacity::DEFAULT));
    h.push_all(&[1, 2, 3]);
    h.take();

    h.set_mode(Mode::FailRun);
    assert!(h.stack.pop_to_root(true).is_err());
    assert_eq!(
        h.take(),
        [
            Load(1),
            WillPop(3),
            Unload(2),
            WillAppear(1),
            WillDisappear(3),
            WillShow(1),
            WillHide(3),
            DidAppear(3),
            DidDisappear(1),
            DidHide(3, Cancelled),
            DidShow(1, Cancelled),
            DidPop(3, Cancelled),
            // Back to the resting capacity window.
            Unload(1),
            Load(2),
        ]
    );
    assert_eq!(h.ids(), [1, 2, 3]);
    assert_eq!(h.loaded(), [2, 3]);
    assert_eq!(h.stack.entry(2).unwrap().phase(), LifecyclePhase::Appeared);
}

// -- Running transitions and queueing --

#[test]
fn running_transition_waits_for_finish() {
    let mut h = Harness::shown(StackConfig::default());
    h.push(1, false).unwrap();
    h.set_mode(Mode::Run);

    let id = started(h.push(2, true).unwrap());
    assert_eq!(h.stack.state(), StackState::TransitionRunning);
    assert_eq!(h.stack.transition_in_flight(), Some(id));
    assert!(!h.take().contains(&DidPush(2, Completed)));

    let wrong = TransitionId(id.0 + 100);
    assert_eq!(
        h.stack.finish_transition(wrong),
        Err(StackError::UnknownTransition(wrong))
    );
    h.stack.finish_transition(id).unwrap();
    assert_eq!(h.take().last(), Some(&DidPush(2, Completed)));
    assert_eq!(h.stack.state(), StackState::Idle);
    assert_eq!(
        h.stack.finish_transition(id),
        Err(StackError::UnknownTransition(id))
    );
}

#[test]
fn requests_queue_in_fifo_order() {
    let mut h = Harness::shown(StackConfig::new(Capacity::UNLIMITED));
    h.push(1, false).unwrap();
    h.set_mode(Mode::Run);

    let first = started(h.push(2, true).unwrap());
    assert_eq!(h.push(3, true), Ok(RequestStatus::Queued));
    assert_eq!(h.push(4, true), Ok(RequestStatus::Queued));
    assert_eq!(h.push(3, true), Err(StackError::DuplicateContent(ContentId(3))));
    assert_eq!(h.stack.queued_requests(), 2);
    assert_eq!(h.ids(), [1, 2]);

    h.stack.finish_transition(first).unwrap();
    let second = h.stack.transition_in_flight().unwrap();
    assert_ne!(first, second);
    assert_eq!(h.ids(), [1, 2, 3]);
    assert_eq!(h.stack.queued_requests(), 1);

    h.set_mode(Mode::Finish);
    h.stack.finish_transition(second).unwrap();
    assert_eq!(h.ids(), [1, 2, 3, 4]);
    assert_eq!(h.stack.queued_requests(), 0);
    assert_eq!(h.stack.state(), StackState::Idle);
}

#[test]
fn queued_requests_fail_fast_on_known_violations() {
    let mut h = Harness::shown(StackConfig::default());
    h.push(1, false).unwrap();
    h.set_mode(Mode::Run);
    let id = started(h.push(2, true).unwrap());

    let pane = h.pane(7);
    assert_eq!(
        h.stack.insert_at(pane, 0, SLIDE, true),
        Err(StackError::InvalidRootInsertion)
    );
    let pane = h.pane(7);
    assert_eq!(
        h.stack.insert_below(pane, ContentId(1), SLIDE, true),
        Err(StackError::InvalidRootInsertion)
    );
    let pane = h.pane(7);
    assert_eq!(
        h.stack.insert_above(pane, ContentId(9), SLIDE, true),
        Err(StackError::UnknownContent(ContentId(9)))
    );
    assert_eq!(
        h.stack.remove_content(ContentId(9), true),
        Err(StackError::UnknownContent(ContentId(9)))
    );
    assert_eq!(
        h.stack.pop_to_content(Some(ContentId(9)), true),
        Err(StackError::UnknownContent(ContentId(9)))
    );
    assert_eq!(h.stack.remove_at(0, true), Err(StackError::RootMandatory));
    assert_eq!(
        h.stack.remove_content(ContentId(1), true),
        Err(StackError::RootMandatory)
    );
    assert_eq!(h.stack.pop_all(true), Err(StackError::RootMandatory));
    assert_eq!(h.stack.queued_requests(), 0);

    // A content only known through a queued insertion is a valid target.
    assert_eq!(h.push(3, true), Ok(RequestStatus::Queued));
    let pane = h.pane(4);
    assert_eq!(
        h.stack.insert_below(pane, ContentId(3), SLIDE, true),
        Ok(RequestStatus::Queued)
    );
    assert_eq!(
        h.stack.pop_to_content(Some(ContentId(3)), true),
        Ok(RequestStatus::Queued)
    );
    assert_eq!(h.stack.queued_requests(), 3);

    h.set_mode(Mode::Finish);
    h.stack.finish_transition(id).unwrap();
    assert_eq!(h.ids(), [1, 2, 4, 3]);
    assert!(h.reports.borrow().rejected.is_empty());
}

#[test]
fn queued_request_failing_on_apply_is_reported() {
    let mut h = Harness::shown(StackConfig::new(Capacity::UNLIMITED));
    h.push(1, false).unwrap();
    h.set_mode(Mode::Run);
    let id = started(h.push(2, true).unwrap());

    // Both are valid when issued; the removal queued first makes the
    // insertion stale, and the index is out of range once 2 is gone.
    assert_eq!(
        h.stack.remove_content(ContentId(2), false),
        Ok(RequestStatus::Queued)
    );
    let pane = h.pane(3);
    assert_eq!(
        h.stack.insert_above(pane, ContentId(2), SLIDE, false),
        Ok(RequestStatus::Queued)
    );
    assert_eq!(h.stack.pop_to_index(5, false), Ok(RequestStatus::Queued));

    h.set_mode(Mode::Finish);
    h.stack.finish_transition(id).unwrap();
    assert_eq!(h.ids(), [1]);
    assert_eq!(h.stack.queued_requests(), 0);
    assert_eq!(
        h.reports.borrow().rejected,
        [
            StackError::UnknownContent(ContentId(2)),
            StackError::IndexOutOfBounds { index: 5, count: 1 },
        ]
    );
}

#[test]
fn capacity_plus_one_during_animated_push() {
    let mut h = Harness::shown(StackConfig::new(Capacity::DEFAULT));
    h.push_all(&[1, 2]);
    h.set_mode(Mode::Run);

    let id = started(h.push(3, true).unwrap());
    assert_eq!(h.stack.loaded_count(), 3);

    h.stack.finish_transition(id).unwrap();
    assert_eq!(h.loaded(), [2, 3]);
}

#[test]
fn release_views_interrupts_and_unloads() {
    let mut h = Harness::shown(StackConfig::default());
    h.push(1, false).unwrap();
    h.set_mode(Mode::Run);
    started(h.push(2, true).unwrap());
    assert_eq!(h.push(3, true), Ok(RequestStatus::Queued));
    h.take();

    h.stack.release_views();
    assert_eq!(
        h.take(),
        [
            Cancel,
            DidDisappear(1),
            DidAppear(2),
            DidHide(1, Completed),
            DidShow(2, Completed),
            DidPush(2, Completed),
            Unload(1),
            WillDisappear(2),
            DidDisappear(2),
            Unload(2),
            // The queued push applies without a view.
            WillPush(3),
            DidPush(3, Completed),
        ]
    );
    assert_eq!(h.ids(), [1, 2, 3]);
    assert_eq!(h.stack.loaded_count(), 0);
    assert_eq!(h.stack.container_view(), None);
    assert_eq!(h.stack.container_phase(), LifecyclePhase::Unloaded);
    assert!(
        h.stack
            .entries()
            .iter()
            .all(|e| e.phase() == LifecyclePhase::Unloaded)
    );
}

#[test]
fn container_disappearance_interrupts() {
    let mut h = Harness::shown(StackConfig::default());
    h.push(1, false).unwrap();
    h.set_mode(Mode::Run);
    started(h.push(2, true).unwrap());
    h.take();

    h.stack.view_will_disappear(true);
    assert_eq!(
        h.take(),
        [
            Cancel,
            DidDisappear(1),
            DidAppear(2),
            DidHide(1, Completed),
            DidShow(2, Completed),
            DidPush(2, Completed),
            WillDisappear(2),
        ]
    );
    assert_eq!(h.stack.container_phase(), LifecyclePhase::WillDisappear);
    h.stack.view_did_disappear(true);
    assert_eq!(h.take(), [DidDisappear(2)]);
}

#[test]
fn container_view_cannot_change_mid_transition() {
    let mut h = Harness::shown(StackConfig::default());
    h.push(1, false).unwrap();
    h.set_mode(Mode::Run);
    started(h.push(2, true).unwrap());

    let moved = ContainerView::new(SurfaceId(2), Rect::new(0.0, 0.0, 480.0, 320.0));
    assert_eq!(
        h.stack.set_container_view(moved),
        Err(StackError::TransitionInFlight)
    );
    assert_eq!(h.stack.container_view(), Some(VIEW));

    assert!(h.stack.interrupt_transition());
    assert!(!h.stack.interrupt_transition());
    h.stack.set_container_view(moved).unwrap();
    assert_eq!(h.stack.container_view(), Some(moved));
}

// -- Visibility --

#[test]
fn hidden_container_skips_appearance() {
    let mut h = Harness::new(StackConfig::default());
    h.stack.set_container_view(VIEW).unwrap();
    h.push_all(&[1, 2]);

    assert_eq!(
        h.take(),
        [
            Load(1),
            WillPush(1),
            DidPush(1, Completed),
            Load(2),
            WillPush(2),
            DidPush(2, Completed),
        ]
    );
    assert!(h.plans.borrow().is_empty(), "no animation while hidden");
    assert!(!h.stack.entry(1).unwrap().added_animated());

    h.stack.view_will_appear(true).unwrap();
    assert_eq!(h.take(), [WillAppear(2)]);
    assert_eq!(h.stack.entry(0).unwrap().phase(), LifecyclePhase::Loaded);

    // The pop replays a transition the entry never played forward.
    h.stack.view_did_appear(true);
    h.stack.pop(true).unwrap();
    let plan = h.plans.borrow().last().copied().unwrap();
    assert_eq!(plan.direction, Direction::Reverse);
    assert!(!plan.added_animated);
}

#[test]
fn appearance_forwarding_is_idempotent() {
    let mut h = Harness::new(StackConfig::default());
    h.stack.set_container_view(VIEW).unwrap();
    h.push(1, false).unwrap();
    h.take();

    h.stack.view_will_appear(false).unwrap();
    h.stack.view_will_appear(false).unwrap();
    h.stack.view_did_appear(false);
    h.stack.view_did_appear(false);
    assert_eq!(h.take(), [WillAppear(1), DidAppear(1)]);
    assert!(h.stack.is_visible());
}

#[test]
fn lifecycle_ignored_without_container_view() {
    let mut h = Harness::new(StackConfig::default());
    h.push(1, false).unwrap();
    h.take();

    h.stack.view_will_appear(false).unwrap();
    h.stack.view_did_appear(false);
    assert!(h.take().is_empty());
    assert_eq!(h.stack.container_phase(), LifecyclePhase::Unloaded);
}

#[test]
fn attaching_container_loads_window_top_first() {
    let mut h = Harness::new(StackConfig::new(Capacity::DEFAULT));
    h.push_all(&[1, 2, 3]);
    h.take();

    h.stack.set_container_view(VIEW).unwrap();
    assert_eq!(h.take(), [Load(3), Load(2)]);
    assert_eq!(h.stack.container_phase(), LifecyclePhase::Loaded);
}

// -- Capacity and removal policies --

#[test]
fn single_content_replaces_previous() {
    let mut h = Harness::shown(StackConfig::single_content());
    h.push_all(&[1, 2]);

    assert_eq!(h.ids(), [2]);
    assert!(h.take().contains(&Unload(1)));

    // The root is optional here.
    h.stack.pop_to_content(None, true).unwrap();
    assert!(h.stack.is_empty());
}

#[test]
fn removing_keeps_mandatory_root() {
    let mut h = Harness::shown(StackConfig::new(Capacity::DEFAULT).removing(true));
    h.push_all(&[1, 2, 3, 4]);
    assert_eq!(h.ids(), [1, 3, 4]);
    assert_eq!(h.loaded(), [3, 4]);

    // Inserted below the window: evicted right away.
    let pane = h.pane(5);
    h.stack.insert_at(pane, 1, SLIDE, false).unwrap();
    assert_eq!(h.ids(), [1, 3, 4]);
}

#[test]
fn mid_stack_insert_and_remove_are_silent() {
    let mut h = Harness::shown(StackConfig::new(Capacity::UNLIMITED));
    h.push_all(&[1, 3]);
    h.take();

    let pane = h.pane(2);
    assert_eq!(
        h.stack.insert_below(pane, ContentId(3), SLIDE, true),
        Ok(RequestStatus::Applied)
    );
    assert_eq!(h.ids(), [1, 2, 3]);
    assert_eq!(h.take(), [Load(2)]);

    let pane = h.pane(4);
    h.stack.insert_above(pane, ContentId(1), SLIDE, true).unwrap();
    assert_eq!(h.ids(), [1, 4, 2, 3]);

    h.stack.remove_content(ContentId(2), true).unwrap();
    h.stack.remove_at(1, true).unwrap();
    assert_eq!(h.ids(), [1, 3]);
    assert_eq!(h.take(), [Load(4), Unload(2), Unload(4)]);

    let pane = h.pane(5);
    assert_eq!(
        h.stack.insert_at(pane, 5, SLIDE, true),
        Err(StackError::IndexOutOfBounds { index: 5, count: 2 })
    );
    let pane = h.pane(5);
    assert_eq!(
        h.stack.insert_below(pane, ContentId(8), SLIDE, true),
        Err(StackError::UnknownContent(ContentId(8)))
    );
}

#[test]
fn insert_on_top_position_is_a_push() {
    let mut h = Harness::shown(StackConfig::default());
    h.push(1, false).unwrap();
    h.take();

    let pane = h.pane(2);
    h.stack.insert_at(pane, 1, SLIDE, true).unwrap();
    assert_eq!(h.take().first(), Some(&Load(2)));
    assert_eq!(h.stack.top(), Some(ContentId(2)));
    assert_eq!(h.plans.borrow().last().map(|p| p.direction), Some(Direction::Forward));
}

// -- Rotation --

#[test]
fn rotation_consults_loaded_contents() {
    let mut h = Harness::shown(StackConfig::new(Capacity::DEFAULT));
    let mut pane = h.pane(1);
    pane.portrait_only = true;
    h.stack.push(pane, SLIDE, false).unwrap();
    h.push(2, true).unwrap();

    assert!(h.stack.should_autorotate(Orientation::Portrait));
    assert!(!h.stack.should_autorotate(Orientation::LandscapeLeft));

    // Once its view is released, the portrait-only root has no say.
    h.push(3, true).unwrap();
    assert!(h.stack.should_autorotate(Orientation::LandscapeLeft));

    h.take();
    h.stack
        .will_rotate(Orientation::LandscapeLeft, Duration::from_millis(300));
    assert_eq!(h.take(), [Rotate(2), Rotate(3)]);
}

// -- Queries --

#[test]
fn queries_reflect_entries() {
    let mut h = Harness::shown(StackConfig::default());
    h.push_all(&[1, 2, 3]);

    assert_eq!(h.stack.count(), 3);
    assert_eq!(h.stack.root(), Some(ContentId(1)));
    assert_eq!(h.stack.top(), Some(ContentId(3)));
    assert_eq!(h.stack.index_of(ContentId(2)), Some(1));
    assert_eq!(h.stack.index_of(ContentId(7)), None);
    assert_eq!(h.stack.content(ContentId(2)).map(|p| p.id), Some(2));
    assert!(h.stack.content_mut(ContentId(7)).is_none());
    assert_eq!(h.stack.entry(2).unwrap().transition(), SLIDE);
    assert_eq!(h.stack.config(), StackConfig::default());
    assert_eq!(h.ids(), vec![1, 2, 3]);
}

#[test]
fn dropped_observer_is_not_notified() {
    let mut h = Harness::shown(StackConfig::default());
    let observer: Rc<RefCell<dyn StackObserver>> = Rc::new(RefCell::new(Recorder {
        log: h.log.clone(),
        reports: Rc::default(),
    }));
    h.stack.set_observer(Rc::downgrade(&observer));
    drop(observer);

    h.push(1, false).unwrap();
    assert_eq!(h.take(), [Load(1), WillAppear(1), DidAppear(1)]);
}

// -- Property forwarding --

#[test]
fn top_change_forwards_title() {
    let mut h = Harness::shown(StackConfig::default());
    let mut inbox = h.pane(1);
    inbox.title = Some("Inbox");
    h.stack.push(inbox, SLIDE, false).unwrap();
    assert_eq!(h.stack.forwarded_title(), Some("Inbox"));
    h.push(2, true).unwrap();
    assert_eq!(h.stack.forwarded_title(), None);

    h.set_mode(Mode::Run);
    let mut message = h.pane(3);
    message.title = Some("Message");
    let id = started(h.stack.push(message, SLIDE, true).unwrap());
    // Reported once the push settles.
    assert_eq!(h.reports.borrow().tops.len(), 2);
    h.stack.finish_transition(id).unwrap();

    // A cancelled push leaves the top as it was.
    h.set_mode(Mode::FailRun);
    assert!(h.push(4, true).is_err());
    h.set_mode(Mode::Finish);
    h.stack.pop_to_root(true).unwrap();

    let reports = h.reports.borrow();
    let tops: Vec<_> = reports
        .tops
        .iter()
        .map(|(previous, top, title)| (*previous, *top, title.as_deref()))
        .collect();
    assert_eq!(
        tops,
        [
            (None, Some(1), Some("Inbox")),
            (Some(1), Some(2), None),
            (Some(2), Some(3), Some("Message")),
            (Some(3), Some(1), Some("Inbox")),
        ]
    );
}

// -- Mixed sequences --

/// Deterministic pseudo-random source for operation sequences.
struct Lcg(u64);

impl Lcg {
    fn below(&mut self, n: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        usize::try_from(self.0 >> 33).unwrap() % n.max(1)
    }
}

fn assert_resting_invariants(h: &Harness, capacity: Capacity, seed: u64, step: usize) {
    let loaded: Vec<bool> = h.stack.entries().iter().map(|e| e.is_view_loaded()).collect();
    let loaded_count = loaded.iter().filter(|l| **l).count();
    assert_eq!(loaded_count, h.stack.loaded_count());
    let limit = match capacity {
        Capacity::Limited(n) => n.get(),
        Capacity::Unlimited => usize::MAX,
    };
    if h.stack.transition_in_flight().is_some() {
        assert!(
            loaded_count <= limit.saturating_add(1),
            "seed {seed} step {step}: {loaded_count} views loaded in flight"
        );
        return;
    }
    assert_eq!(h.stack.state(), StackState::Idle);
    assert!(
        loaded_count <= limit,
        "seed {seed} step {step}: {loaded_count} views loaded at rest"
    );
    let first = loaded.iter().position(|l| *l).unwrap_or(loaded.len());
    assert!(
        loaded[first..].iter().all(|l| *l),
        "seed {seed} step {step}: loaded views not contiguous: {loaded:?}"
    );

    let log = h.log.borrow();
    let count = |f: fn(&Ev) -> bool| log.iter().filter(|e| f(e)).count();
    let pairs: [(fn(&Ev) -> bool, fn(&Ev) -> bool); 4] = [
        (|e| matches!(e, WillPush(_)), |e| matches!(e, DidPush(..))),
        (|e| matches!(e, WillPop(_)), |e| matches!(e, DidPop(..))),
        (|e| matches!(e, WillShow(_)), |e| matches!(e, DidShow(..))),
        (|e| matches!(e, WillHide(_)), |e| matches!(e, DidHide(..))),
    ];
    for (will, did) in pairs {
        assert_eq!(
            count(will),
            count(did),
            "seed {seed} step {step}: unmatched will/did notifications"
        );
    }
}

fn run_sequence(seed: u64, config: StackConfig) {
    let mut rng = Lcg(seed);
    let mut h = Harness::shown(config);
    let mut next_id = 0;
    for step in 0..80 {
        h.set_mode(match rng.below(8) {
            0 => Mode::FailRun,
            1 => Mode::FailBuild,
            2..=4 => Mode::Run,
            _ => Mode::Finish,
        });
        let count = h.stack.count();
        let animated = rng.below(4) != 0;
        // Errors are expected; only the invariants matter here.
        let _ = match rng.below(10) {
            0 | 1 => {
                next_id += 1;
                h.push(next_id, animated).map(drop)
            }
            2 => {
                next_id += 1;
                let pane = h.pane(next_id);
                let index = rng.below(count + 1);
                h.stack.insert_at(pane, index, SLIDE, animated).map(drop)
            }
            3 => h.stack.remove_at(rng.below(count), animated).map(drop),
            4 => h.stack.pop(animated).map(drop),
            5 => h.stack.pop_to_index(rng.below(count), animated).map(drop),
            6 => match h.stack.transition_in_flight() {
                Some(id) => h.stack.finish_transition(id),
                None => Ok(()),
            },
            7 => {
                h.stack.interrupt_transition();
                Ok(())
            }
            8 => {
                h.stack.view_will_disappear(animated);
                h.stack.view_did_disappear(animated);
                h.stack
                    .view_will_appear(animated)
                    .map(|()| h.stack.view_did_appear(animated))
            }
            _ => {
                h.stack.release_views();
                h.stack
                    .set_container_view(VIEW)
                    .and_then(|()| h.stack.view_will_appear(false))
                    .map(|()| h.stack.view_did_appear(false))
            }
        };
        assert_resting_invariants(&h, config.capacity, seed, step);
    }

    h.set_mode(Mode::Finish);
    while let Some(id) = h.stack.transition_in_flight() {
        h.stack.finish_transition(id).unwrap();
    }
    assert_resting_invariants(&h, config.capacity, seed, 80);
}

#[test]
fn mixed_sequences_keep_capacity_and_pairing() {
    let configs = [
        StackConfig::new(Capacity::DEFAULT),
        StackConfig::new(Capacity::MINIMAL).removing(true),
        StackConfig::new(Capacity::limited(3).unwrap()).root_mandatory(false),
        StackConfig::single_content(),
    ];
    for seed in 0..64 {
        for config in configs {
            run_sequence(seed, config);
        }
    }
}
