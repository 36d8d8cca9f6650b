// Copyright 2026 the Panestack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition descriptors and the executor contract.
//!
//! A [`TransitionDescriptor`] records *how* an entry was brought on screen.
//! The stack keeps it with the entry and replays it in reverse when the entry
//! is removed.
//!
//! The stack never animates anything itself. For every visible change it
//! builds a [`TransitionPlan`] and hands it to a [`TransitionExecutor`], which
//! returns an [`Animation`]. The stack then either runs the animation
//! instantaneously, or starts it and waits for the host to report completion
//! through [`ContainerStack::finish_transition`].
//!
//! [`ContainerStack::finish_transition`]: crate::stack::ContainerStack::finish_transition

use alloc::boxed::Box;
use core::fmt;
use core::time::Duration;

use kurbo::{Affine, Rect, Vec2};

use crate::content::ContentId;
use crate::error::TransitionError;

/// Identifies one transition run by a stack.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransitionId(pub u64);

impl fmt::Debug for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransitionId({})", self.0)
    }
}

/// Built-in visual styles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionStyle {
    /// The new view replaces the old one with no animation.
    #[default]
    None,
    /// The new view slides in from the bottom over the old one.
    CoverFromBottom,
    /// The new view slides in from the top over the old one.
    CoverFromTop,
    /// The new view slides in from the left over the old one.
    CoverFromLeft,
    /// The new view slides in from the right over the old one.
    CoverFromRight,
    /// Both views slide up; the new one enters from the bottom.
    PushFromBottom,
    /// Both views slide down; the new one enters from the top.
    PushFromTop,
    /// Both views slide right; the new one enters from the left.
    PushFromLeft,
    /// Both views slide left; the new one enters from the right.
    PushFromRight,
    /// The new view fades in over the old one.
    FadeIn,
    /// The new view fades in while the old one fades out.
    CrossDissolve,
    /// The new view grows from the center of the container.
    EmergeFromCenter,
}

impl TransitionStyle {
    /// Returns the duration used when a descriptor does not override it.
    #[must_use]
    pub const fn default_duration(self) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            _ => Duration::from_millis(400),
        }
    }

    /// Computes start and end frames for a forward transition within `bounds`.
    #[must_use]
    pub fn keyframes(self, bounds: Rect) -> TransitionKeyframes {
        let w = bounds.width();
        let h = bounds.height();
        let still = LayerFrame::IDENTITY;
        let (disappearing_end, appearing_start) = match self {
            Self::None => (still, still),
            Self::CoverFromBottom => (still, LayerFrame::offset(0.0, h)),
            Self::CoverFromTop => (still, LayerFrame::offset(0.0, -h)),
            Self::CoverFromLeft => (still, LayerFrame::offset(-w, 0.0)),
            Self::CoverFromRight => (still, LayerFrame::offset(w, 0.0)),
            Self::PushFromBottom => (LayerFrame::offset(0.0, -h), LayerFrame::offset(0.0, h)),
            Self::PushFromTop => (LayerFrame::offset(0.0, h), LayerFrame::offset(0.0, -h)),
            Self::PushFromLeft => (LayerFrame::offset(w, 0.0), LayerFrame::offset(-w, 0.0)),
            Self::PushFromRight => (LayerFrame::offset(-w, 0.0), LayerFrame::offset(w, 0.0)),
            Self::FadeIn => (still, still.with_opacity(0.0)),
            Self::CrossDissolve => (still.with_opacity(0.0), still.with_opacity(0.0)),
            Self::EmergeFromCenter => (
                still,
                LayerFrame {
                    scale: 0.01,
                    ..still
                },
            ),
        };
        TransitionKeyframes {
            disappearing: (still, disappearing_end),
            appearing: (appearing_start, still),
        }
    }
}

/// How an entry visually replaces the one below it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionDescriptor {
    /// Visual style.
    pub style: TransitionStyle,
    /// Duration override; `None` uses [`TransitionStyle::default_duration`].
    pub duration: Option<Duration>,
}

impl TransitionDescriptor {
    /// A descriptor with no visual effect.
    pub const NONE: Self = Self {
        style: TransitionStyle::None,
        duration: None,
    };

    /// Creates a descriptor using the style's default duration.
    #[must_use]
    pub const fn new(style: TransitionStyle) -> Self {
        Self {
            style,
            duration: None,
        }
    }

    /// Overrides the duration.
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Returns the duration that will actually be used.
    #[must_use]
    pub const fn effective_duration(&self) -> Duration {
        match self.duration {
            Some(duration) => duration,
            None => self.style.default_duration(),
        }
    }
}

/// Playback direction of a descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Bringing an entry in (push, insert on top).
    Forward,
    /// Taking an entry out (pop, remove from the top).
    Reverse,
}

/// Geometric and opacity state of one layer at one end of a transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerFrame {
    /// Translation relative to the container bounds.
    pub offset: Vec2,
    /// Uniform scale about the container center.
    pub scale: f64,
    /// Opacity in `0.0..=1.0`.
    pub opacity: f32,
}

impl LayerFrame {
    /// Untransformed and fully opaque.
    pub const IDENTITY: Self = Self {
        offset: Vec2::ZERO,
        scale: 1.0,
        opacity: 1.0,
    };

    const fn offset(x: f64, y: f64) -> Self {
        Self {
            offset: Vec2::new(x, y),
            scale: 1.0,
            opacity: 1.0,
        }
    }

    const fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Returns the affine transform placing a layer at this frame.
    #[must_use]
    pub fn transform(&self, bounds: Rect) -> Affine {
        Affine::translate(self.offset) * Affine::scale_about(self.scale, bounds.center())
    }
}

/// Start and end frames of both layers taking part in a transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionKeyframes {
    /// `(start, end)` of the layer leaving the screen.
    pub disappearing: (LayerFrame, LayerFrame),
    /// `(start, end)` of the layer entering the screen.
    pub appearing: (LayerFrame, LayerFrame),
}

impl TransitionKeyframes {
    /// Returns the keyframes played backwards.
    ///
    /// The layer that entered in the forward direction is the one leaving in
    /// reverse, so roles swap along with start and end.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            disappearing: (self.appearing.1, self.appearing.0),
            appearing: (self.disappearing.1, self.disappearing.0),
        }
    }
}

/// Everything an executor needs to build an animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionPlan {
    /// Identity reported back through `finish_transition`.
    pub id: TransitionId,
    /// Descriptor of the entry being brought in (forward) or taken out
    /// (reverse).
    pub descriptor: TransitionDescriptor,
    /// Playback direction.
    pub direction: Direction,
    /// Content leaving the screen, if any.
    pub disappearing: Option<ContentId>,
    /// Content entering the screen, if any.
    pub appearing: Option<ContentId>,
    /// Whether the entry owning `descriptor` was inserted with animation.
    ///
    /// In a reverse plan this tells the executor whether the entry ever
    /// played the forward animation; an entry pushed while the container was
    /// hidden never did.
    pub added_animated: bool,
    /// Container bounds at build time.
    pub bounds: Rect,
}

impl TransitionPlan {
    /// Returns the keyframes for this plan, already oriented for its
    /// direction.
    #[must_use]
    pub fn keyframes(&self) -> TransitionKeyframes {
        let forward = self.descriptor.style.keyframes(self.bounds);
        match self.direction {
            Direction::Forward => forward,
            Direction::Reverse => forward.reversed(),
        }
    }

    /// Returns the duration of this plan.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.descriptor.effective_duration()
    }
}

/// Result of starting an animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationStatus {
    /// The animation runs; the host reports its end later.
    Running,
    /// The animation already reached its end state.
    Finished,
}

/// A runnable animation produced by a [`TransitionExecutor`].
pub trait Animation {
    /// Starts the animation.
    ///
    /// When this returns [`AnimationStatus::Running`], the host must later
    /// call `finish_transition` with the plan's id.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] if the animation cannot be started.
    fn run_animated(&mut self) -> Result<AnimationStatus, TransitionError>;

    /// Applies the end state immediately, with no intermediate frames.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] if the end state cannot be applied.
    fn run_instantaneous(&mut self) -> Result<(), TransitionError>;

    /// Jumps a running animation to its end state.
    ///
    /// Called when the stack interrupts a transition.
    fn cancel(&mut self) {}
}

/// Builds animations for transition plans.
pub trait TransitionExecutor {
    /// Builds the animation for `plan`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] if no animation can be built. The stack
    /// rejects the operation before delivering any lifecycle event.
    fn build(&mut self, plan: &TransitionPlan) -> Result<Box<dyn Animation>, TransitionError>;
}

/// An executor whose animations complete as soon as they start.
///
/// Useful for hosts without animation support and for headless use.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstantExecutor;

#[derive(Debug)]
struct InstantAnimation;

impl Animation for InstantAnimation {
    fn run_animated(&mut self) -> Result<AnimationStatus, TransitionError> {
        Ok(AnimationStatus::Finished)
    }

    fn run_instantaneous(&mut self) -> Result<(), TransitionError> {
        Ok(())
    }
}

impl TransitionExecutor for InstantExecutor {
    fn build(&mut self, _plan: &TransitionPlan) -> Result<Box<dyn Animation>, TransitionError> {
        Ok(Box::new(InstantAnimation))
    }
}
