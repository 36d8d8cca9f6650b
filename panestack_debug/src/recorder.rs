// Copyright 2026 the Panestack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`StackObserver`] and encodes notifications
//! into a `Vec<u8>` as tagged little-endian records. [`decode`] reads them
//! back as an iterator of [`RecordedEvent`].
//!
//! Record layout (after the one-byte tag):
//!
//! ```text
//!   push / pop:   id:u64  other:(present:u8, id:u64)  animated:u8  [outcome:u8]
//!   show / hide:  id:u64  animated:u8  [outcome:u8]
//! ```
//!
//! The trailing outcome byte is only present for "did" records.
//!
//! Only the push, pop, show and hide notifications are recorded; top changes
//! and rejected queued requests are left to [`crate::pretty`].

use panestack_core::content::ContentId;
use panestack_core::observer::{AppearanceEvent, Outcome, PopEvent, PushEvent, StackObserver};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_WILL_PUSH: u8 = 1;
const TAG_DID_PUSH: u8 = 2;
const TAG_WILL_POP: u8 = 3;
const TAG_DID_POP: u8 = 4;
const TAG_WILL_SHOW: u8 = 5;
const TAG_DID_SHOW: u8 = 6;
const TAG_WILL_HIDE: u8 = 7;
const TAG_DID_HIDE: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`StackObserver`] that encodes notifications into a compact binary
/// buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_id(&mut self, id: ContentId) {
        self.write_u64(id.0);
    }

    fn write_option_id(&mut self, id: Option<ContentId>) {
        match id {
            Some(id) => {
                self.write_u8(1);
                self.write_id(id);
            }
            None => {
                self.write_u8(0);
                self.write_u64(0);
            }
        }
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_outcome(&mut self, o: Outcome) {
        self.write_u8(match o {
            Outcome::Completed => 0,
            Outcome::Cancelled => 1,
        });
    }

    fn write_push(&mut self, tag: u8, e: &PushEvent) {
        self.write_u8(tag);
        self.write_id(e.pushed);
        self.write_option_id(e.covered);
        self.write_bool(e.animated);
    }

    fn write_pop(&mut self, tag: u8, e: &PopEvent) {
        self.write_u8(tag);
        self.write_id(e.popped);
        self.write_option_id(e.revealed);
        self.write_bool(e.animated);
    }

    fn write_appearance(&mut self, tag: u8, e: &AppearanceEvent) {
        self.write_u8(tag);
        self.write_id(e.content);
        self.write_bool(e.animated);
    }
}

impl StackObserver for RecorderSink {
    fn will_push(&mut self, e: &PushEvent) {
        self.write_push(TAG_WILL_PUSH, e);
    }

    fn did_push(&mut self, e: &PushEvent, outcome: Outcome) {
        self.write_push(TAG_DID_PUSH, e);
        self.write_outcome(outcome);
    }

    fn will_pop(&mut self, e: &PopEvent) {
        self.write_pop(TAG_WILL_POP, e);
    }

    fn did_pop(&mut self, e: &PopEvent, outcome: Outcome) {
        self.write_pop(TAG_DID_POP, e);
        self.write_outcome(outcome);
    }

    fn will_show(&mut self, e: &AppearanceEvent) {
        self.write_appearance(TAG_WILL_SHOW, e);
    }

    fn did_show(&mut self, e: &AppearanceEvent, outcome: Outcome) {
        self.write_appearance(TAG_DID_SHOW, e);
        self.write_outcome(outcome);
    }

    fn will_hide(&mut self, e: &AppearanceEvent) {
        self.write_appearance(TAG_WILL_HIDE, e);
    }

    fn did_hide(&mut self, e: &AppearanceEvent, outcome: Outcome) {
        self.write_appearance(TAG_DID_HIDE, e);
        self.write_outcome(outcome);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded notification from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// [`StackObserver::will_push`].
    WillPush(PushEvent),
    /// [`StackObserver::did_push`].
    DidPush(PushEvent, Outcome),
    /// [`StackObserver::will_pop`].
    WillPop(PopEvent),
    /// [`StackObserver::did_pop`].
    DidPop(PopEvent, Outcome),
    /// [`StackObserver::will_show`].
    WillShow(AppearanceEvent),
    /// [`StackObserver::did_show`].
    DidShow(AppearanceEvent, Outcome),
    /// [`StackObserver::will_hide`].
    WillHide(AppearanceEvent),
    /// [`StackObserver::did_hide`].
    DidHide(AppearanceEvent, Outcome),
}

impl RecordedEvent {
    /// Returns the notification name, as used by the JSON exporter.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WillPush(_) => "will_push",
            Self::DidPush(..) => "did_push",
            Self::WillPop(_) => "will_pop",
            Self::DidPop(..) => "did_pop",
            Self::WillShow(_) => "will_show",
            Self::DidShow(..) => "did_show",
            Self::WillHide(_) => "will_hide",
            Self::DidHide(..) => "did_hide",
        }
    }

    /// Returns the outcome carried by "did" notifications.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::DidPush(_, o) | Self::DidPop(_, o) | Self::DidShow(_, o) | Self::DidHide(_, o) => {
                Some(*o)
            }
            Self::WillPush(_) | Self::WillPop(_) | Self::WillShow(_) | Self::WillHide(_) => None,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        let v = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_id(&mut self) -> Option<ContentId> {
        self.read_u64().map(ContentId)
    }

    fn read_option_id(&mut self) -> Option<Option<ContentId>> {
        let present = self.read_u8()?;
        let id = self.read_id()?;
        Some((present != 0).then_some(id))
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_outcome(&mut self) -> Option<Outcome> {
        Some(match self.read_u8()? {
            0 => Outcome::Completed,
            _ => Outcome::Cancelled,
        })
    }

    fn read_push(&mut self) -> Option<PushEvent> {
        Some(PushEvent {
            pushed: self.read_id()?,
            covered: self.read_option_id()?,
            animated: self.read_bool()?,
        })
    }

    fn read_pop(&mut self) -> Option<PopEvent> {
        Some(PopEvent {
            popped: self.read_id()?,
            revealed: self.read_option_id()?,
            animated: self.read_bool()?,
        })
    }

    fn read_appearance(&mut self) -> Option<AppearanceEvent> {
        Some(AppearanceEvent {
            content: self.read_id()?,
            animated: self.read_bool()?,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_WILL_PUSH => self.read_push().map(RecordedEvent::WillPush),
            TAG_DID_PUSH => Some(RecordedEvent::DidPush(self.read_push()?, self.read_outcome()?)),
            TAG_WILL_POP => self.read_pop().map(RecordedEvent::WillPop),
            TAG_DID_POP => Some(RecordedEvent::DidPop(self.read_pop()?, self.read_outcome()?)),
            TAG_WILL_SHOW => self.read_appearance().map(RecordedEvent::WillShow),
            TAG_DID_SHOW => Some(RecordedEvent::DidShow(
                self.read_appearance()?,
                self.read_outcome()?,
            )),
            TAG_WILL_HIDE => self.read_appearance().map(RecordedEvent::WillHide),
            TAG_DID_HIDE => Some(RecordedEvent::DidHide(
                self.read_appearance()?,
                self.read_outcome()?,
            )),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
