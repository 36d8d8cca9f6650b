// Copyright 2026 the Panestack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON exporter for recorded stack notifications.
//!
//! [`export`] reads recorded bytes from a
//! [`RecorderSink`](super::recorder::RecorderSink) and writes one JSON object
//! per notification:
//!
//! ```text
//!   { "seq": 0, "event": "will_push", "content": 2, "other": 1,
//!     "animated": true, "outcome": null }
//! ```
//!
//! `other` is the covered content of a push or the revealed content of a pop
//! (`null` when there is none, and for show/hide records).

use std::io::{self, Write};

use serde_json::{Value, json};

use panestack_core::content::ContentId;
use panestack_core::observer::Outcome;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded notifications as a pretty-printed JSON array.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes)
        .enumerate()
        .map(|(seq, recorded)| to_value(seq, &recorded))
        .collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn to_value(seq: usize, recorded: &RecordedEvent) -> Value {
    let (content, other, animated) = match *recorded {
        RecordedEvent::WillPush(e) | RecordedEvent::DidPush(e, _) => {
            (e.pushed, e.covered, e.animated)
        }
        RecordedEvent::WillPop(e) | RecordedEvent::DidPop(e, _) => {
            (e.popped, e.revealed, e.animated)
        }
        RecordedEvent::WillShow(e)
        | RecordedEvent::DidShow(e, _)
        | RecordedEvent::WillHide(e)
        | RecordedEvent::DidHide(e, _) => (e.content, None, e.animated),
    };
    json!({
        "seq": seq,
        "event": recorded.name(),
        "content": content.0,
        "other": other.map(|id: ContentId| id.0),
        "animated": animated,
        "outcome": recorded.outcome().map(outcome_name),
    })
}

fn outcome_name(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Completed => "completed",
        Outcome::Cancelled => "cancelled",
    }
}
