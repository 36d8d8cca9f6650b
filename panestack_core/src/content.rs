// Copyright 2026 the Panestack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The content collaborator contract.
//!
//! A *content* is an opaque displayable unit (a page, a screen) managed by a
//! [`ContainerStack`](crate::stack::ContainerStack). The core never renders
//! anything itself: it asks the content to load, unload, and resize its view
//! representation, and it notifies the content of appearance and rotation
//! events.

use core::fmt;
use core::time::Duration;

use kurbo::Rect;

use crate::error::ContentError;

/// Identity of a content.
///
/// Contents report their identity through [`Content::id`]. The stack uses it
/// to reject duplicates and to name contents in observer notifications; the
/// value is never interpreted otherwise.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentId(pub u64);

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.0)
    }
}

/// An opaque handle to the host surface that stack contents are drawn into.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u32);

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({})", self.0)
    }
}

/// The drawing surface hosting the topmost loaded contents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerView {
    /// Host surface handle.
    pub surface: SurfaceId,
    /// Bounds every loaded content view is sized to.
    pub bounds: Rect,
}

impl ContainerView {
    /// Creates a container view handle.
    #[must_use]
    pub const fn new(surface: SurfaceId, bounds: Rect) -> Self {
        Self { surface, bounds }
    }
}

/// Interface orientation used by rotation forwarding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Upright portrait.
    Portrait,
    /// Upside-down portrait.
    PortraitUpsideDown,
    /// Landscape, home side on the left.
    LandscapeLeft,
    /// Landscape, home side on the right.
    LandscapeRight,
}

/// A displayable unit managed by a container stack.
///
/// Only [`id`](Self::id) and [`load_view`](Self::load_view) are required. All
/// notification hooks default to no-ops, so a content only overrides the
/// events it cares about.
///
/// The stack guarantees that appearance hooks are called in a coherent order
/// (see [`LifecyclePhase`](crate::lifecycle::LifecyclePhase)); a content never
/// receives the same event twice without the opposite event in between.
pub trait Content {
    /// Returns the identity of this content.
    fn id(&self) -> ContentId;

    /// Creates the view representation.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`] if the view cannot be created. The stack
    /// aborts the operation that needed the view.
    fn load_view(&mut self) -> Result<(), ContentError>;

    /// Releases the view representation.
    fn unload_view(&mut self) {}

    /// Resizes the view representation to the container bounds.
    fn size_to_bounds(&mut self, bounds: Rect) {
        _ = bounds;
    }

    /// The view is about to be shown.
    fn will_appear(&mut self, animated: bool) {
        _ = animated;
    }

    /// The view has been shown.
    fn did_appear(&mut self, animated: bool) {
        _ = animated;
    }

    /// The view is about to be hidden.
    fn will_disappear(&mut self, animated: bool) {
        _ = animated;
    }

    /// The view has been hidden.
    fn did_disappear(&mut self, animated: bool) {
        _ = animated;
    }

    /// The view representation has been released.
    fn did_unload(&mut self) {}

    /// Title the container shows while this content is on top.
    ///
    /// Read through
    /// [`ContainerStack::forwarded_title`](crate::stack::ContainerStack::forwarded_title).
    fn title(&self) -> Option<&str> {
        None
    }

    /// Returns whether the content supports the given orientation.
    fn should_autorotate(&self, orientation: Orientation) -> bool {
        _ = orientation;
        true
    }

    /// A rotation to `to` is about to begin.
    fn will_rotate(&mut self, to: Orientation, duration: Duration) {
        _ = (to, duration);
    }

    /// The rotation animation to `to` is being set up.
    fn will_animate_rotation(&mut self, to: Orientation, duration: Duration) {
        _ = (to, duration);
    }

    /// A rotation away from `from` has finished.
    fn did_rotate(&mut self, from: Orientation) {
        _ = from;
    }
}

impl<C: Content + ?Sized> Content for alloc::boxed::Box<C> {
    fn id(&self) -> ContentId {
        (**self).id()
    }

    fn load_view(&mut self) -> Result<(), ContentError> {
        (**self).load_view()
    }

    fn unload_view(&mut self) {
        (**self).unload_view();
    }

    fn size_to_bounds(&mut self, bounds: Rect) {
        (**self).size_to_bounds(bounds);
    }

    fn will_appear(&mut self, animated: bool) {
        (**self).will_appear(animated);
    }

    fn did_appear(&mut self, animated: bool) {
        (**self).did_appear(animated);
    }

    fn will_disappear(&mut self, animated: bool) {
        (**self).will_disappear(animated);
    }

    fn did_disappear(&mut self, animated: bool) {
        (**self).did_disappear(animated);
    }

    fn did_unload(&mut self) {
        (**self).did_unload();
    }

    fn title(&self) -> Option<&str> {
        (**self).title()
    }

    fn should_autorotate(&self, orientation: Orientation) -> bool {
        (**self).should_autorotate(orientation)
    }

    fn will_rotate(&mut self, to: Orientation, duration: Duration) {
        (**self).will_rotate(to, duration);
    }

    fn will_animate_rotation(&mut self, to: Orientation, duration: Duration) {
        (**self).will_animate_rotation(to, duration);
    }

    fn did_rotate(&mut self, from: Orientation) {
        (**self).did_rotate(from);
    }
}
