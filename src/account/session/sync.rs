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


use std::sync::Arc;

use super::defs::*;
use crate::account::selected::{SelectedView, ViewShared};
use crate::account::store::{Mailbox, MailboxStore};
use crate::support::error::Error;

impl<S: MailboxStore> Session<S> {
    /// Bring `view` up to date with its mailbox.
    ///
    /// `mailbox` is a handle the calling operation already resolved, if any.
    /// It is only used if it refers to the view's mailbox; otherwise the
    /// mailbox is resolved again by the view's name.
    ///
    /// If the mailbox no longer exists, the view is marked deleted. Nothing
    /// is done to a view that is already deleted.
    pub(super) fn load_updates(
        &self,
        view: Option<&mut SelectedView>,
        mailbox: Option<&S::Mailbox>,
    ) -> Result<(), Error> {
        let view = match view {
            Some(view) if !view.deleted() => view,
            _ => return Ok(()),
        };

        let resolved;
        let mailbox = match mailbox {
            Some(mailbox) if mailbox.name() == view.name() => mailbox,
            _ => match self.store.get_mailbox(view.name(), false) {
                Ok(mailbox) => {
                    resolved = mailbox;
                    &resolved
                }
                Err(e) if e.is_not_found() => {
                    view.mark_deleted();
                    return Ok(());
                }
                Err(e) => return Err(e),
            },
        };

        let uid_validity = mailbox.uid_validity();
        let messages = mailbox.messages()?.map(|m| (m.uid, m.permanent_flags));
        view.reconcile(uid_validity, messages);
        Ok(())
    }

    /// Resolve the mailbox of `view` for an operation that treats a missing
    /// mailbox as the view having been deleted.
    ///
    /// Returns `None` if the view is or has now become deleted.
    pub(super) fn resolve_selected(
        &self,
        view: &mut SelectedView,
    ) -> Result<Option<S::Mailbox>, Error> {
        if view.deleted() {
            return Ok(None);
        }

        match self.store.get_mailbox(view.name(), false) {
            Ok(mailbox) => Ok(Some(mailbox)),
            Err(e) if e.is_not_found() => {
                view.mark_deleted();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Determine which view, if any, should be credited with the recency of
    /// messages added to `mailbox`.
    ///
    /// This is the caller's own view if it has `mailbox` selected, and
    /// otherwise whichever writable view most recently selected it.
    pub(super) fn find_selected(
        &self,
        view: Option<&SelectedView>,
        mailbox: &S::Mailbox,
    ) -> Option<Arc<ViewShared>> {
        match view {
            Some(view) if !view.deleted() && view.name() == mailbox.name() => {
                Some(Arc::clone(view.shared()))
            }
            _ => mailbox.selected_set().any_selected(mailbox.name()),
        }
    }
}
