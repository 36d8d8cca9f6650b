// Copyright 2026 the Panestack Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Container stack engine for hierarchically displayed content panes.
//!
//! `panestack_core` manages an ordered stack of displayable contents inside a
//! single container view. It inserts and removes contents, runs the
//! transitions between stack states through a host-supplied executor, and
//! guarantees that every content receives its lifecycle events exactly once
//! and in a coherent order, including when operations are queued,
//! interrupted, or aborted. It is `no_std` compatible (with `alloc`) and does
//! no rendering of its own.
//!
//! # Architecture
//!
//! ```text
//!   StackController (facade, mandatory root)
//!       │
//!       ▼
//!   ContainerStack ──► TransitionPlan ──► TransitionExecutor::build() ──► Animation
//!       │                                                                     │
//!       │◄────────────────────── finish_transition(id) ◄──────────────────────┘
//!       │
//!       ├──► Content hooks (load / appear / disappear / unload / rotate)
//!       └──► StackObserver (will/did push, pop, show, hide; top changes;
//!                           rejected queued requests)
//! ```
//!
//! **[`stack`]**: The [`ContainerStack`](stack::ContainerStack) state
//! machine: insertion, removal, transition queueing, lifecycle and rotation
//! forwarding, and the capacity window.
//!
//! **[`controller`]**: [`StackController`](controller::StackController), a
//! navigation-style facade with a non-poppable root.
//!
//! **[`content`]**: The [`Content`](content::Content) collaborator trait and
//! identity types.
//!
//! **[`entry`]**: Per-content bookkeeping (view loaded flag, lifecycle
//! phase, transition descriptor).
//!
//! **[`lifecycle`]**: Lifecycle phases and the coherence rules that make
//! redundant forwarding harmless.
//!
//! **[`transition`]**: Transition styles, keyframes, and the
//! [`TransitionExecutor`](transition::TransitionExecutor) contract.
//!
//! **[`config`]**: Capacity and removal policy.
//!
//! **[`observer`]**: [`StackObserver`](observer::StackObserver) hooks with
//! default no-op bodies.
//!
//! **[`error`]**: Error types.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `serde` (disabled by default): Derives `Serialize`/`Deserialize` on the
//!   configuration and transition descriptor types.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod config;
pub mod content;
pub mod controller;
pub mod entry;
pub mod error;
pub mod lifecycle;
pub mod observer;
pub mod stack;
pub mod transition;
