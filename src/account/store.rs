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


//! The interface between the session engine and mailbox storage.
//!
//! Storage is an external collaborator: the session engine only requires
//! the operations here, and treats each individual call as atomic. Mailbox
//! handles are obtained afresh for every session operation, so a storage
//! implementation must not rely on a handle outliving a rename or deletion
//! of its mailbox.

use std::sync::Arc;

use chrono::prelude::*;

use super::model::*;
use super::notify::ChangeSignal;
use super::selected::{SelectedView, SelectionRegistry};
use crate::support::error::Error;

/// A message as held by storage.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredMessage {
    pub uid: Uid,
    /// Flags visible to every session.
    pub permanent_flags: FlagSet,
    /// Whether no session has yet observed this message.
    pub recent: bool,
    pub internal_date: DateTime<Utc>,
    pub data: Arc<Vec<u8>>,
}

impl StoredMessage {
    /// `RFC822.SIZE`
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A message to be added to a mailbox.
#[derive(Clone, Debug)]
pub struct NewMessage {
    pub data: Arc<Vec<u8>>,
    pub permanent_flags: FlagSet,
    pub internal_date: DateTime<Utc>,
}

/// Resolves mailbox names and manages the mailbox hierarchy of one account.
pub trait MailboxStore: Send + Sync {
    type Mailbox: Mailbox;

    /// Return a handle on the mailbox called `name`.
    ///
    /// If the mailbox does not exist, it is created if `try_create` is true;
    /// otherwise this fails with `NxMailbox`.
    fn get_mailbox(
        &self,
        name: &str,
        try_create: bool,
    ) -> Result<Self::Mailbox, Error>;

    /// Create a new mailbox called `name`.
    fn add_mailbox(&self, name: &str) -> Result<Self::Mailbox, Error>;

    /// Delete the mailbox called `name`.
    fn remove_mailbox(&self, name: &str) -> Result<(), Error>;

    /// Rename `before` and all its children to `after`.
    fn rename_mailbox(&self, before: &str, after: &str) -> Result<(), Error>;

    /// Return the names of all mailboxes.
    fn list_mailboxes(&self) -> Result<Vec<String>, Error>;

    /// Return the names of all subscribed mailboxes, whether or not they
    /// exist.
    fn list_subscribed(&self) -> Result<Vec<String>, Error>;

    fn set_subscribed(&self, name: &str, subscribed: bool)
        -> Result<(), Error>;
}

/// A handle on a single mailbox.
pub trait Mailbox {
    fn name(&self) -> &str;

    fn read_only(&self) -> bool;

    fn uid_validity(&self) -> u32;

    /// The UID the next added message will probably receive.
    fn next_uid(&self) -> Uid;

    /// The flags which are stored durably on messages in this mailbox.
    fn permanent_flags(&self) -> FlagSet {
        default_permanent_flags()
    }

    /// The flags which only exist within a session's view.
    fn session_flags(&self) -> FlagSet {
        default_session_flags()
    }

    /// Fired whenever messages are added to or removed from the mailbox, or
    /// their flags are changed, or the mailbox is deleted.
    fn change_signal(&self) -> &ChangeSignal;

    /// The views which currently have this mailbox selected.
    fn selected_set(&self) -> &SelectionRegistry;

    /// Return every message in the mailbox, ordered by UID.
    ///
    /// Each call enumerates the state at the time of the call.
    fn messages<'a>(
        &'a self,
    ) -> Result<Box<dyn Iterator<Item = StoredMessage> + 'a>, Error>;

    /// Return the message with the given UID, if it exists.
    fn get(&self, uid: Uid) -> Result<Option<StoredMessage>, Error>;

    /// Add a message to the mailbox, returning the UID it was assigned.
    fn add(&self, message: NewMessage, recent: bool) -> Result<Uid, Error>;

    /// Remove the message with the given UID. Returns whether it existed.
    fn delete(&self, uid: Uid) -> Result<bool, Error>;

    /// Durably store the permanent flags and recency of each given message.
    ///
    /// Messages which no longer exist are ignored.
    fn save_flags(&self, messages: &[StoredMessage]) -> Result<(), Error>;

    /// Clear the recent flag on every message that has it, returning the
    /// UIDs of those messages in ascending order.
    ///
    /// Implementations should do this atomically so that two sessions
    /// selecting the mailbox at once cannot both claim the same message.
    fn claim_recent(&self) -> Result<Vec<Uid>, Error> {
        let claimed: Vec<StoredMessage> = self
            .messages()?
            .filter(|m| m.recent)
            .map(|mut m| {
                m.recent = false;
                m
            })
            .collect();
        self.save_flags(&claimed)?;
        Ok(claimed.into_iter().map(|m| m.uid).collect())
    }

    /// Perform housekeeping on the mailbox.
    fn cleanup(&self) -> Result<(), Error> {
        self.selected_set().prune();
        Ok(())
    }

    /// Return the messages matching `set` as resolved against `view`, with
    /// their sequence numbers in that view.
    ///
    /// Messages in the view which have since been removed from the mailbox
    /// are skipped.
    fn find(
        &self,
        set: &SequenceSet,
        view: &SelectedView,
    ) -> Result<Vec<(Seqnum, StoredMessage)>, Error> {
        let mut found = Vec::new();
        for (seqnum, uid) in view.iter_set(set) {
            if let Some(message) = self.get(uid)? {
                found.push((seqnum, message));
            }
        }
        Ok(found)
    }

    /// Produce a point-in-time summary of the mailbox.
    ///
    /// The recent count is the number of messages still globally recent.
    fn snapshot(&self) -> Result<MailboxSnapshot, Error> {
        let mut exists = 0;
        let mut recent = 0;
        let mut unseen = 0;
        let mut first_unseen = None;
        let mut max_uid = None;

        for (ix, message) in self.messages()?.enumerate() {
            exists += 1;
            if message.recent {
                recent += 1;
            }
            if !message.permanent_flags.contains(&Flag::Seen) {
                unseen += 1;
                if first_unseen.is_none() {
                    first_unseen = Some(Seqnum::from_index(ix));
                }
            }
            max_uid = Some(message.uid);
        }

        Ok(MailboxSnapshot {
            name: self.name().to_owned(),
            read_only: self.read_only(),
            uid_validity: self.uid_validity(),
            permanent_flags: self.permanent_flags(),
            session_flags: self.session_flags(),
            exists,
            recent,
            unseen,
            first_unseen,
            next_uid: self
                .next_uid()
                .max(max_uid.map_or(Uid::MIN, Uid::saturating_next)),
        })
    }
}
