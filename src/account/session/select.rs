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


use crossbeam::channel::Receiver;
use log::info;

use super::defs::*;
use crate::account::model::*;
use crate::account::notify::WakeReason;
use crate::account::selected::SelectedView;
use crate::account::store::{Mailbox, MailboxStore};
use crate::support::error::Error;

impl<S: MailboxStore> Session<S> {
    /// The `SELECT` and `EXAMINE` commands.
    ///
    /// The view is read-only if `read_only` is requested or the mailbox
    /// itself is read-only. A writable view claims the recency of every
    /// message no session has yet seen.
    ///
    /// The returned snapshot agrees with the returned view.
    pub fn select_mailbox(
        &self,
        name: &str,
        read_only: bool,
    ) -> Result<(MailboxSnapshot, SelectedView), Error> {
        let mailbox = self.store.get_mailbox(name, false)?;
        let read_only = read_only || mailbox.read_only();
        let mut view = SelectedView::new(
            mailbox.name().to_owned(),
            read_only,
            mailbox.uid_validity(),
            &self.log_prefix,
        );
        mailbox.selected_set().register(&view);

        if !read_only {
            let claimed = mailbox.claim_recent()?;
            if !claimed.is_empty() {
                info!(
                    "{} Claimed {} recent messages",
                    view.log_prefix(),
                    claimed.len()
                );
            }
            for uid in claimed {
                view.shared().add_recent(uid);
            }
        }

        let mut snapshot = mailbox.snapshot()?;
        self.load_updates(Some(&mut view), Some(&mailbox))?;

        snapshot.read_only = read_only;
        snapshot.exists = view.exists();
        if !read_only {
            snapshot.recent = view.recent_count();
        }
        snapshot.unseen = 0;
        snapshot.first_unseen = None;
        for (seqnum, uid) in view.iter_set(&SequenceSet::all(true)) {
            if !view.flags(uid).contains(&Flag::Seen) {
                snapshot.unseen += 1;
                snapshot.first_unseen = snapshot.first_unseen.or(Some(seqnum));
            }
        }
        if let Some(max_uid) = view.max_uid() {
            snapshot.next_uid =
                snapshot.next_uid.max(max_uid.saturating_next());
        }

        view.mark_reported();
        info!(
            "{} Selected {}, {} messages",
            view.log_prefix(),
            if read_only { "read-only" } else { "read-write" },
            snapshot.exists
        );
        Ok((snapshot, view))
    }

    /// The `CHECK` and `NOOP` commands, and the body of `IDLE`.
    ///
    /// If `housekeeping` is set, the mailbox's storage-level cleanup runs
    /// first. If `wait_on` is given, this then waits for updates as per
    /// `wait_for_updates` and returns why it woke.
    ///
    /// A mailbox that no longer exists marks the view deleted instead of
    /// failing.
    pub fn check_mailbox(
        &self,
        view: &mut SelectedView,
        housekeeping: bool,
        wait_on: Option<&Receiver<()>>,
    ) -> Result<Option<WakeReason>, Error> {
        let mailbox = match self.resolve_selected(view)? {
            Some(mailbox) => mailbox,
            None => return Ok(None),
        };

        if housekeeping {
            mailbox.cleanup()?;
        }

        let woke = wait_on.map(|w| self.wait_for_updates(&mailbox, w));
        // The mailbox may have been renamed or deleted while we waited
        let mailbox = if woke.is_some() { None } else { Some(&mailbox) };
        self.load_updates(Some(view), mailbox)?;
        Ok(woke)
    }
}
