// Copyright 2026 the Panestack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable stack event output.
//!
//! [`PrettyPrintSink`] implements [`StackObserver`] and writes one line per
//! notification to a [`Write`](std::io::Write) destination (default:
//! stderr). Lines are numbered in delivery order.

use std::io::Write;

use panestack_core::content::ContentId;
use panestack_core::error::StackError;
use panestack_core::observer::{
    AppearanceEvent, Outcome, PopEvent, PushEvent, StackObserver, TopChangeEvent,
};

/// Writes human-readable notification lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    seq: u64,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer, seq: 0 }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn line(&mut self, tag: &str, body: std::fmt::Arguments<'_>) {
        let seq = self.seq;
        self.seq += 1;
        let _ = writeln!(self.writer, "#{seq:<4} [{tag}] {body}");
    }
}

fn id(content: Option<ContentId>) -> String {
    content.map_or_else(|| "-".to_owned(), |c| c.0.to_string())
}

fn anim(animated: bool) -> &'static str {
    if animated { "animated" } else { "instant" }
}

fn outcome(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Completed => "ok",
        Outcome::Cancelled => "CANCELLED",
    }
}

impl<W: Write> StackObserver for PrettyPrintSink<W> {
    fn will_push(&mut self, e: &PushEvent) {
        self.line(
            "will-push",
            format_args!(
                "{} over {} {}",
                e.pushed.0,
                id(e.covered),
                anim(e.animated)
            ),
        );
    }

    fn did_push(&mut self, e: &PushEvent, o: Outcome) {
        self.line(
            "did-push",
            format_args!(
                "{} over {} {} {}",
                e.pushed.0,
                id(e.covered),
                anim(e.animated),
                outcome(o)
            ),
        );
    }

    fn will_pop(&mut self, e: &PopEvent) {
        self.line(
            "will-pop",
            format_args!(
                "{} to {} {}",
                e.popped.0,
                id(e.revealed),
                anim(e.animated)
            ),
        );
    }

    fn did_pop(&mut self, e: &PopEvent, o: Outcome) {
        self.line(
            "did-pop",
            format_args!(
                "{} to {} {} {}",
                e.popped.0,
                id(e.revealed),
                anim(e.animated),
                outcome(o)
            ),
        );
    }

    fn will_show(&mut self, e: &AppearanceEvent) {
        self.line(
            "will-show",
            format_args!("{} {}", e.content.0, anim(e.animated)),
        );
    }

    fn did_show(&mut self, e: &AppearanceEvent, o: Outcome) {
        self.line(
            "did-show",
            format_args!("{} {} {}", e.content.0, anim(e.animated), outcome(o)),
        );
    }

    fn will_hide(&mut self, e: &AppearanceEvent) {
        self.line(
            "will-hide",
            format_args!("{} {}", e.content.0, anim(e.animated)),
        );
    }

    fn did_hide(&mut self, e: &AppearanceEvent, o: Outcome) {
        self.line(
            "did-hide",
            format_args!("{} {} {}", e.content.0, anim(e.animated), outcome(o)),
        );
    }

    fn top_changed(&mut self, e: &TopChangeEvent<'_>) {
        self.line(
            "top",
            format_args!(
                "{} -> {} {:?}",
                id(e.previous),
                id(e.top),
                e.title.unwrap_or_default()
            ),
        );
    }

    fn request_rejected(&mut self, error: &StackError) {
        self.line("rejected", format_args!("{error}"));
    }
}
