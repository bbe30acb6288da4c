//-
// Copyright (c) 2026, The Pigeonhole Developers
//
// This file is part of Pigeonhole.
//
// Pigeonhole is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Pigeonhole is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or FITNESS
// FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License for  more
// details.
//
// You should have received a copy of the GNU General Public License along with
// Pigeonhole. If not, see <http://www.gnu.org/licenses/>.


//! The session engine: one `Session` per connected client, translating IMAP
//! mailbox commands into operations on a `MailboxStore` while keeping the
//! client's `SelectedView` consistent with what other sessions do to the
//! mailbox.
//!
//! Views are synchronised by pulling, not pushing. Every operation
//! re-resolves the mailbox it works on by name and, before returning, merges
//! the current state of the caller's selected mailbox into the caller's view
//! (see `sync.rs`). Nothing about a mailbox is cached across operations, so
//! renames and deletions by other sessions are tolerated: a view whose
//! mailbox can no longer be resolved is marked deleted, which is terminal.
//!
//! Operations which take the caller's view do so as `&mut SelectedView` (or
//! `Option<&mut SelectedView>` where the caller may have nothing selected)
//! and update it in place. If an operation fails, the view is left as it
//! was, apart from possibly having been marked deleted.
//!
//! After each command, the protocol layer calls `SelectedView::take_changes`
//! to learn which untagged responses to send.
//!
//! `\Recent` is handled as follows. A message arrives globally recent unless
//! some writable session already has its mailbox selected, in which case
//! that session claims it immediately. Selecting a mailbox read-write claims
//! every globally recent message into the new view and clears the flag on
//! the message. So a message is recent in at most one place.
//!
//! ## About the layout of this module
//!
//! This module is collectively a single abstraction, i.e., it should be
//! thought of as one large rust file. It is simply split apart because it's
//! unwieldy otherwise.

// Basic struct definitions
mod defs;
pub use defs::Session;

// Internal support
mod idle; // waiting for change notifications
mod sync; // view synchronisation and cross-mailbox view resolution

// IMAP commands
mod expunge; // EXPUNGE, UID EXPUNGE
mod fetch; // FETCH, UID FETCH
mod flags; // STORE, UID STORE
mod mailboxes; // LIST, LSUB, STATUS, CREATE, DELETE, RENAME, (UN)SUBSCRIBE
mod messages; // APPEND, COPY, UID COPY
mod search; // SEARCH, UID SEARCH
mod select; // SELECT, EXAMINE, CHECK, NOOP, during IDLE
