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

use chrono::prelude::*;
use log::info;

use super::defs::*;
use crate::account::model::*;
use crate::account::selected::SelectedView;
use crate::account::store::{Mailbox, MailboxStore, NewMessage};
use crate::support::error::Error;

impl<S: MailboxStore> Session<S> {
    /// The `APPEND` command.
    ///
    /// Each item is added to the mailbox called `name` in order. Flags
    /// outside the destination's permanent vocabulary are dropped. If some
    /// writable session has the destination selected, the new messages are
    /// recent in that session; otherwise they are recent on the messages
    /// themselves.
    ///
    /// This is not transactional: if an item fails, the items before it
    /// remain in the mailbox.
    pub fn append_messages(
        &self,
        name: &str,
        items: Vec<AppendItem>,
        view: Option<&mut SelectedView>,
    ) -> Result<AppendResponse, Error> {
        let mailbox = self.get_destination(name)?;
        if mailbox.read_only() {
            return Err(Error::MailboxReadOnly);
        }

        let permanent = mailbox.permanent_flags();
        let selected = self.find_selected(view.as_deref(), &mailbox);

        let mut uids = Vec::with_capacity(items.len());
        for item in items {
            let message = NewMessage {
                data: Arc::new(item.data),
                permanent_flags: item
                    .flags
                    .into_iter()
                    .filter(|f| permanent.contains(f))
                    .collect(),
                internal_date: item.internal_date.unwrap_or_else(Utc::now),
            };

            let uid = mailbox.add(message, selected.is_none())?;
            if let Some(ref selected) = selected {
                selected.add_recent(uid);
            }
            uids.push(uid);
        }

        info!(
            "{} Appended {} messages to {}",
            self.log_prefix,
            uids.len(),
            mailbox.name()
        );
        mailbox.change_signal().notify_all();
        self.load_updates(view, Some(&mailbox))?;

        Ok(AppendResponse {
            uid_validity: mailbox.uid_validity(),
            uids,
        })
    }

    /// The `COPY` and `UID COPY` commands.
    ///
    /// Recency of the copies follows the same rule as for `APPEND`.
    ///
    /// This is not transactional: if a message fails to copy, the copies
    /// made before it remain.
    pub fn copy_messages(
        &self,
        view: &mut SelectedView,
        set: &SequenceSet,
        destination: &str,
    ) -> Result<CopyResponse, Error> {
        let source = self.store.get_mailbox(view.name(), false)?;
        let dest = self.get_destination(destination)?;
        if dest.read_only() {
            return Err(Error::MailboxReadOnly);
        }

        let selected = self.find_selected(Some(&*view), &dest);
        let mut response = CopyResponse {
            uid_validity: dest.uid_validity(),
            uids: Vec::new(),
        };

        for (_, message) in source.find(set, view)? {
            let dest_uid = dest.add(
                NewMessage {
                    data: Arc::clone(&message.data),
                    permanent_flags: message.permanent_flags,
                    internal_date: message.internal_date,
                },
                selected.is_none(),
            )?;
            if let Some(ref selected) = selected {
                selected.add_recent(dest_uid);
            }
            response.uids.push((message.uid, dest_uid));
        }

        info!(
            "{} Copied {} messages to {}",
            view.log_prefix(),
            response.uids.len(),
            dest.name()
        );
        dest.change_signal().notify_all();
        self.load_updates(Some(view), Some(&source))?;
        Ok(response)
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::super::test_prelude::*;

    #[test]
    fn append_assigns_increasing_uids() {
        let setup = set_up();
        let session = setup.session("s");
        let response = session
            .append_messages(
                "INBOX",
                vec![
                    AppendItem {
                        data: b"one".to_vec(),
                        flags: vec![
                            Flag::Seen,
                            Flag::Recent,
                            Flag::Keyword("$Junk".to_owned()),
                        ],
                        ..AppendItem::default()
                    },
                    AppendItem {
                        data: b"two".to_vec(),
                        ..AppendItem::default()
                    },
                ],
                None,
            )
            .unwrap();

        assert_eq!(1, response.uid_validity);
        assert_eq!(vec![Uid::u(1), Uid::u(2)], response.uids);

        let inbox = setup.mailbox("INBOX");
        let first = inbox.get(Uid::u(1)).unwrap().unwrap();
        assert_eq!(flags(&[Flag::Seen]), first.permanent_flags);
        assert!(first.recent);
        assert_eq!(3, first.size());
    }

    #[test]
    fn append_to_missing_mailbox() {
        let setup = set_up();
        let session = setup.session("s");
        assert_matches!(
            Err(Error::NxMailboxTryCreate),
            session.append_messages("Nowhere", vec![AppendItem::default()], None)
        );

        let session = setup.auto_create_session("s");
        let response = session
            .append_messages("Nowhere", vec![AppendItem::default()], None)
            .unwrap();
        assert_eq!(2, response.uid_validity);
        assert_eq!(vec![Uid::u(1)], response.uids);
    }

    #[test]
    fn append_to_read_only_mailbox() {
        let setup = set_up();
        setup.store.set_read_only("INBOX", true).unwrap();
        assert_matches!(
            Err(Error::MailboxReadOnly),
            setup.session("s").append_messages(
                "INBOX",
                vec![AppendItem::default()],
                None
            )
        );
        assert_eq!(0, setup.mailbox("INBOX").messages().unwrap().count());
    }

    #[test]
    fn append_recency_goes_to_selecting_session() {
        let setup = set_up();
        let s1 = setup.session("s1");
        let s2 = setup.session("s2");
        s1.create_mailbox("Other", None).unwrap();

        let (_, mut v1) = s1.select_mailbox("INBOX", false).unwrap();
        let (_, mut v2) = s2.select_mailbox("Other", false).unwrap();

        // s2 appends to INBOX, which only s1 has selected
        let uid = simple_append(&s2, "INBOX", Some(&mut v2));
        assert_eq!(vec![(uid, false)], setup.global_recent("INBOX"));
        assert_eq!(0, v2.recent_count());

        s1.check_mailbox(&mut v1, false, None).unwrap();
        assert_eq!(1, v1.recent_count());
        let changes = v1.take_changes();
        assert_eq!(Some(1), changes.exists);
        assert_eq!(Some(1), changes.recent);

        // Appending to one's own selected mailbox is visible immediately
        let uid = simple_append(&s1, "INBOX", Some(&mut v1));
        assert_eq!(Some(uid), v1.max_uid());
        assert_eq!(2, v1.recent_count());
    }

    #[test]
    fn append_recency_skips_views_of_renamed_mailbox() {
        let setup = set_up();
        let s1 = setup.session("s1");
        let s2 = setup.session("s2");
        let s3 = setup.session("s3");
        s1.create_mailbox("A", None).unwrap();

        let (_, mut v1) = s1.select_mailbox("A", false).unwrap();
        s2.rename_mailbox("A", "B", None).unwrap();
        s1.check_mailbox(&mut v1, false, None).unwrap();
        assert!(v1.deleted());

        let uid = simple_append(&s2, "B", None);
        assert_eq!(vec![(uid, true)], setup.global_recent("B"));
        assert!(v1
            .shared()
            .with_session_flags(|sf| sf.recent_uids().is_empty()));

        let (snapshot, v3) = s3.select_mailbox("B", false).unwrap();
        assert_eq!(1, snapshot.recent);
        assert_eq!(1, v3.recent_count());
        assert_eq!(vec![(uid, false)], setup.global_recent("B"));
    }

    #[test]
    fn append_recency_skips_stale_view_not_yet_synced() {
        let setup = set_up();
        let s1 = setup.session("s1");
        let s2 = setup.session("s2");
        s1.create_mailbox("A", None).unwrap();

        let (_, v1) = s1.select_mailbox("A", false).unwrap();
        s2.rename_mailbox("A", "B", None).unwrap();
        assert!(!v1.deleted());

        let uid = simple_append(&s2, "B", None);
        assert_eq!(vec![(uid, true)], setup.global_recent("B"));
        assert!(!v1.shared().with_session_flags(|sf| sf.is_recent(uid)));
    }

    #[test]
    fn copy_to_unselected_mailbox() {
        let setup = set_up();
        let session = setup.session("s");
        session.create_mailbox("A", None).unwrap();
        session.create_mailbox("B", None).unwrap();
        for _ in 0..5 {
            simple_append(&session, "A", None);
        }

        let (_, mut view) = session.select_mailbox("A", false).unwrap();
        session
            .update_flags(
                &mut view,
                &SequenceSet::parse("5", true).unwrap(),
                &flags(&[Flag::Flagged]),
                FlagOp::Add,
            )
            .unwrap();

        let response = session
            .copy_messages(
                &mut view,
                &SequenceSet::parse("5", true).unwrap(),
                "B",
            )
            .unwrap();
        assert_eq!(setup.mailbox("B").uid_validity(), response.uid_validity);
        assert_eq!(vec![(Uid::u(5), Uid::u(1))], response.uids);

        let copy = setup.mailbox("B").get(Uid::u(1)).unwrap().unwrap();
        assert!(copy.recent);
        assert_eq!(flags(&[Flag::Flagged]), copy.permanent_flags);
    }

    #[test]
    fn copy_into_own_mailbox() {
        let setup = set_up();
        let session = setup.session("s");
        simple_append(&session, "INBOX", None);
        let (_, mut view) = session.select_mailbox("INBOX", false).unwrap();

        let response = session
            .copy_messages(&mut view, &SequenceSet::all(false), "INBOX")
            .unwrap();
        assert_eq!(vec![(Uid::u(1), Uid::u(2))], response.uids);
        assert_eq!(2, view.exists());
        assert_eq!(2, view.recent_count());
        assert_eq!(
            vec![(Uid::u(1), false), (Uid::u(2), false)],
            setup.global_recent("INBOX")
        );
    }

    #[test]
    fn copy_to_missing_or_read_only_mailbox() {
        let setup = set_up();
        let session = setup.session("s");
        simple_append(&session, "INBOX", None);
        let (_, mut view) = session.select_mailbox("INBOX", false).unwrap();

        assert_matches!(
            Err(Error::NxMailboxTryCreate),
            session.copy_messages(&mut view, &SequenceSet::all(false), "X")
        );

        session.create_mailbox("X", None).unwrap();
        setup.store.set_read_only("X", true).unwrap();
        assert_matches!(
            Err(Error::MailboxReadOnly),
            session.copy_messages(&mut view, &SequenceSet::all(false), "X")
        );
        assert_eq!(0, setup.mailbox("X").messages().unwrap().count());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn uids_strictly_increase(
            ops in prop::collection::vec((0..3u8, 1..4usize), 1..20)
        ) {
            let setup = set_up();
            let session = setup.session("s");
            session.create_mailbox("Dst", None).unwrap();
            simple_append(&session, "INBOX", None);
            let (_, mut view) =
                session.select_mailbox("INBOX", false).unwrap();

            let mut last = None;
            for (op, count) in ops {
                let assigned: Vec<Uid> = match op {
                    0 => session
                        .append_messages(
                            "Dst",
                            vec![AppendItem::default(); count],
                            Some(&mut view),
                        )
                        .unwrap()
                        .uids,
                    1 => session
                        .copy_messages(
                            &mut view,
                            &SequenceSet::all(false),
                            "Dst",
                        )
                        .unwrap()
                        .uids
                        .into_iter()
                        .map(|(_, dst)| dst)
                        .collect(),
                    _ => {
                        let (_, mut dst) =
                            session.select_mailbox("Dst", false).unwrap();
                        session
                            .update_flags(
                                &mut dst,
                                &SequenceSet::all(false),
                                &flags(&[Flag::Deleted]),
                                FlagOp::Add,
                            )
                            .unwrap();
                        session.expunge_mailbox(&mut dst, None).unwrap()
                    }
                };

                if op < 2 {
                    for uid in assigned {
                        prop_assert!(Some(uid) > last);
                        last = Some(uid);
                    }
                }
            }
        }
    }
}
