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


use log::info;

use super::defs::*;
use crate::account::model::*;
use crate::account::selected::SelectedView;
use crate::account::store::{Mailbox, MailboxStore};
use crate::support::error::Error;

impl<S: MailboxStore> Session<S> {
    /// The `EXPUNGE` and `UID EXPUNGE` commands.
    ///
    /// Every message matched by `uids` (by default, all messages in the
    /// view) which has the `\Deleted` flag is removed, in ascending UID
    /// order. Returns the UIDs actually removed by this call.
    pub fn expunge_mailbox(
        &self,
        view: &mut SelectedView,
        uids: Option<&SequenceSet>,
    ) -> Result<Vec<Uid>, Error> {
        if view.read_only() {
            return Err(Error::MailboxReadOnly);
        }

        let mailbox = self.store.get_mailbox(view.name(), false)?;
        if mailbox.read_only() {
            return Err(Error::MailboxReadOnly);
        }

        let all = SequenceSet::all(true);
        let mut doomed: Vec<Uid> = mailbox
            .find(uids.unwrap_or(&all), view)?
            .into_iter()
            .filter(|&(_, ref m)| m.permanent_flags.contains(&Flag::Deleted))
            .map(|(_, m)| m.uid)
            .collect();
        doomed.sort_unstable();

        let mut expunged = Vec::with_capacity(doomed.len());
        for uid in doomed {
            // Another session may have beaten us to it
            if mailbox.delete(uid)? {
                expunged.push(uid);
            }
        }

        if !expunged.is_empty() {
            info!("{} Expunged {} messages", view.log_prefix(), expunged.len());
        }

        mailbox.change_signal().notify_all();
        self.load_updates(Some(view), Some(&mailbox))?;
        Ok(expunged)
    }
}
