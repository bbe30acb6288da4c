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


use super::defs::*;
use crate::account::model::*;
use crate::account::selected::SelectedView;
use crate::account::store::{Mailbox, MailboxStore};
use crate::support::error::Error;

impl<S: MailboxStore> Session<S> {
    /// The `STORE` and `UID STORE` commands.
    ///
    /// Flags in the mailbox's permanent vocabulary are applied to the stored
    /// messages; flags in its session vocabulary only to this view. Other
    /// flags are ignored, and `\Recent` is never changed.
    ///
    /// Returns the sequence number and UID of every message the operation
    /// applied to, so the caller can send their new flags.
    pub fn update_flags(
        &self,
        view: &mut SelectedView,
        set: &SequenceSet,
        flags: &FlagSet,
        op: FlagOp,
    ) -> Result<Vec<(Seqnum, Uid)>, Error> {
        if view.read_only() {
            return Err(Error::MailboxReadOnly);
        }

        let mailbox = self.store.get_mailbox(view.name(), false)?;
        if mailbox.read_only() {
            return Err(Error::MailboxReadOnly);
        }

        let permanent: FlagSet = flags
            .intersection(&mailbox.permanent_flags())
            .cloned()
            .collect();
        let session: FlagSet = flags
            .intersection(&mailbox.session_flags())
            .cloned()
            .collect();

        let found = mailbox.find(set, view)?;
        let mut updated = Vec::with_capacity(found.len());
        let mut messages = Vec::with_capacity(found.len());
        for (seqnum, mut message) in found {
            message.permanent_flags =
                op.apply(&message.permanent_flags, &permanent);
            view.shared()
                .with_session_flags(|sf| sf.update(message.uid, op, &session));
            updated.push((seqnum, message.uid));
            messages.push(message);
        }

        mailbox.save_flags(&messages)?;
        mailbox.change_signal().notify_all();
        self.load_updates(Some(view), Some(&mailbox))?;
        Ok(updated)
    }
}
