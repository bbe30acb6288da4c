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


use log::debug;

use super::defs::*;
use crate::account::model::*;
use crate::account::selected::SelectedView;
use crate::account::store::{Mailbox, MailboxStore, StoredMessage};
use crate::support::error::Error;

impl<S: MailboxStore> Session<S> {
    /// The `FETCH` and `UID FETCH` commands.
    ///
    /// Returns the messages matched by `set` in the view, with their
    /// sequence numbers as of before this call synchronised the view.
    /// Rendering the requested attributes is left to the caller; this only
    /// takes care of the implicit `\Seen` some attributes carry.
    ///
    /// If the selected mailbox no longer exists, the view is marked deleted
    /// and nothing is returned.
    pub fn fetch_messages(
        &self,
        view: &mut SelectedView,
        set: &SequenceSet,
        attributes: &[FetchAttribute],
    ) -> Result<Vec<(Seqnum, StoredMessage)>, Error> {
        let mailbox = match self.resolve_selected(view)? {
            Some(mailbox) => mailbox,
            None => return Ok(Vec::new()),
        };

        let mut found = mailbox.find(set, view)?;

        if !view.read_only()
            && attributes.iter().any(FetchAttribute::sets_seen)
            && mailbox.permanent_flags().contains(&Flag::Seen)
        {
            let mut changed = Vec::new();
            for &mut (_, ref mut message) in &mut found {
                if message.permanent_flags.insert(Flag::Seen) {
                    changed.push(message.clone());
                }
            }

            if !changed.is_empty() {
                debug!(
                    "{} Fetch implicitly set \\Seen on {} messages",
                    view.log_prefix(),
                    changed.len()
                );
                mailbox.save_flags(&changed)?;
                mailbox.change_signal().notify_all();
            }
        }

        self.load_updates(Some(view), Some(&mailbox))?;
        Ok(found)
    }
}

#[cfg(test)]
mod test {
    use super::super::test_prelude::*;

    fn body() -> FetchAttribute {
        FetchAttribute::Body {
            section: String::new(),
            peek: false,
        }
    }

    #[test]
    fn fetch_sets_seen_when_writable() {
        let setup = set_up();
        let session = setup.session("s");
        let uid = simple_append(&session, "INBOX", None);
        let (_, mut view) = session.select_mailbox("INBOX", false).unwrap();
        view.take_changes();

        let fetched = session
            .fetch_messages(
                &mut view,
                &SequenceSet::parse("1", false).unwrap(),
                &[FetchAttribute::Flags, body()],
            )
            .unwrap();
        assert_eq!(1, fetched.len());
        assert_eq!(Seqnum::u(1), fetched[0].0);
        assert_eq!(uid, fetched[0].1.uid);
        assert!(fetched[0].1.permanent_flags.contains(&Flag::Seen));

        let stored = setup.mailbox("INBOX").get(uid).unwrap().unwrap();
        assert!(stored.permanent_flags.contains(&Flag::Seen));
        assert_eq!(vec![uid], view.take_changes().fetch);
    }

    #[test]
    fn peek_does_not_set_seen() {
        let setup = set_up();
        let session = setup.session("s");
        let uid = simple_append(&session, "INBOX", None);
        let (_, mut view) = session.select_mailbox("INBOX", false).unwrap();

        let fetched = session
            .fetch_messages(
                &mut view,
                &SequenceSet::all(true),
                &[FetchAttribute::Body {
                    section: "HEADER".to_owned(),
                    peek: true,
                }],
            )
            .unwrap();
        assert!(!fetched[0].1.permanent_flags.contains(&Flag::Seen));
        let stored = setup.mailbox("INBOX").get(uid).unwrap().unwrap();
        assert!(!stored.permanent_flags.contains(&Flag::Seen));
    }

    #[test]
    fn read_only_fetch_does_not_set_seen() {
        let setup = set_up();
        let session = setup.session("s");
        let uid = simple_append(&session, "INBOX", None);
        let (_, mut view) = session.select_mailbox("INBOX", true).unwrap();

        let fetched = session
            .fetch_messages(
                &mut view,
                &SequenceSet::all(false),
                &[FetchAttribute::Rfc822],
            )
            .unwrap();
        assert_eq!(1, fetched.len());
        let stored = setup.mailbox("INBOX").get(uid).unwrap().unwrap();
        assert!(!stored.permanent_flags.contains(&Flag::Seen));
    }

    #[test]
    fn fetch_skips_concurrently_expunged_messages() {
        let setup = set_up();
        let session = setup.session("s");
        let uid1 = simple_append(&session, "INBOX", None);
        let uid2 = simple_append(&session, "INBOX", None);
        let (_, mut view) = session.select_mailbox("INBOX", false).unwrap();

        setup.mailbox("INBOX").delete(uid1).unwrap();
        let fetched = session
            .fetch_messages(
                &mut view,
                &SequenceSet::all(false),
                &[FetchAttribute::Flags],
            )
            .unwrap();
        assert_eq!(1, fetched.len());
        assert_eq!((Seqnum::u(2), uid2), (fetched[0].0, fetched[0].1.uid));
        assert_eq!(1, view.exists());
    }

    #[test]
    fn fetch_on_deleted_mailbox_returns_nothing() {
        let setup = set_up();
        let session = setup.session("s");
        session.create_mailbox("Gone", None).unwrap();
        simple_append(&session, "Gone", None);
        let (_, mut view) = session.select_mailbox("Gone", false).unwrap();

        session.delete_mailbox("Gone", None).unwrap();
        let fetched = session
            .fetch_messages(
                &mut view,
                &SequenceSet::all(false),
                &[FetchAttribute::Flags],
            )
            .unwrap();
        assert!(fetched.is_empty());
        assert!(view.deleted());
    }
}
