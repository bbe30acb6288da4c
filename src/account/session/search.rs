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


use std::collections::BTreeMap;

use super::defs::*;
use crate::account::model::*;
use crate::account::search::*;
use crate::account::selected::SelectedView;
use crate::account::store::{Mailbox, MailboxStore};
use crate::support::error::Error;

/// Capture the bounds and session flags of `view` as of now.
fn search_params(view: &SelectedView) -> SearchParams {
    let session_flags = view.session_flags();
    let mut params = SearchParams {
        max_seq: view.exists() as u32,
        max_uid: view.max_uid().map_or(0, u32::from),
        recent: session_flags.recent_uids(),
        session_flags: BTreeMap::new(),
    };

    for (uid, flags) in session_flags.iter() {
        let mut flags = flags.clone();
        flags.remove(&Flag::Recent);
        if !flags.is_empty() {
            params.session_flags.insert(uid, flags);
        }
    }

    params
}

impl<S: MailboxStore> Session<S> {
    /// The `SEARCH` and `UID SEARCH` commands, using the built-in evaluator.
    ///
    /// Returns the sequence number and UID of every matching message, in
    /// ascending order.
    pub fn search_mailbox(
        &self,
        view: &mut SelectedView,
        query: &SearchQuery,
    ) -> Result<Vec<(Seqnum, Uid)>, Error> {
        let params = search_params(view);
        let compiled = CompiledSearch::compile(query, &params);
        self.search_impl(view, &params, &compiled)
    }

    /// Like `search_mailbox`, but with a caller-provided evaluator.
    pub fn search_with(
        &self,
        view: &mut SelectedView,
        evaluator: &dyn SearchEvaluator,
    ) -> Result<Vec<(Seqnum, Uid)>, Error> {
        let params = search_params(view);
        self.search_impl(view, &params, evaluator)
    }

    fn search_impl(
        &self,
        view: &mut SelectedView,
        params: &SearchParams,
        evaluator: &dyn SearchEvaluator,
    ) -> Result<Vec<(Seqnum, Uid)>, Error> {
        let mailbox = self.store.get_mailbox(view.name(), false)?;
        let seqnums: BTreeMap<Uid, Seqnum> = view
            .iter_set(&SequenceSet::all(true))
            .map(|(seqnum, uid)| (uid, seqnum))
            .collect();

        let mut hits = Vec::new();
        for message in mailbox.messages()? {
            // Messages the view has not yet announced are not addressable
            let seqnum = match seqnums.get(&message.uid) {
                Some(&seqnum) => seqnum,
                None => continue,
            };

            if evaluator.matches(params, seqnum, &message)? {
                hits.push((seqnum, message.uid));
            }
        }

        self.load_updates(Some(view), Some(&mailbox))?;
        Ok(hits)
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use super::super::test_prelude::*;
    use crate::account::search::*;

    #[test]
    fn search_by_flags_and_recency() {
        let setup = set_up();
        let session = setup.session("s");
        simple_append(&session, "INBOX", None);
        let (_, mut view) = session.select_mailbox("INBOX", false).unwrap();
        let uid2 = simple_append(&session, "INBOX", Some(&mut view));
        let uid3 = simple_append(&setup.session("other"), "INBOX", None);
        session
            .update_flags(
                &mut view,
                &SequenceSet::parse("2", false).unwrap(),
                &flags(&[Flag::Flagged]),
                FlagOp::Add,
            )
            .unwrap();

        assert_eq!(
            vec![(Seqnum::u(2), uid2)],
            session
                .search_mailbox(&mut view, &SearchQuery::Flagged)
                .unwrap()
        );
        assert_eq!(
            3,
            session
                .search_mailbox(&mut view, &SearchQuery::Recent)
                .unwrap()
                .len()
        );
        assert_eq!(
            vec![(Seqnum::u(3), uid3)],
            session
                .search_mailbox(
                    &mut view,
                    &SearchQuery::SequenceSet(
                        SequenceSet::parse("*", true).unwrap()
                    )
                )
                .unwrap()
        );
    }

    /// An evaluator which delivers a new message to the mailbox while the
    /// scan is in progress.
    struct Meddler<'a> {
        session: &'a Session<MemoryStore>,
        meddled: Cell<bool>,
        inner: CompiledSearch,
    }

    impl SearchEvaluator for Meddler<'_> {
        fn matches(
            &self,
            params: &SearchParams,
            seqnum: Seqnum,
            message: &StoredMessage,
        ) -> Result<bool, Error> {
            if !self.meddled.replace(true) {
                simple_append(self.session, "INBOX", None);
            }
            self.inner.matches(params, seqnum, message)
        }
    }

    #[test]
    fn search_bounds_fixed_at_scan_start() {
        let setup = set_up();
        let session = setup.session("s");
        simple_append(&session, "INBOX", None);
        let uid2 = simple_append(&session, "INBOX", None);
        let (_, mut view) = session.select_mailbox("INBOX", false).unwrap();

        let other = setup.session("other");
        let query = SearchQuery::Or(
            Box::new(SearchQuery::SequenceSet(
                SequenceSet::parse("*", false).unwrap(),
            )),
            Box::new(SearchQuery::SequenceSet(
                SequenceSet::parse("*", true).unwrap(),
            )),
        );
        let params = super::search_params(&view);
        let meddler = Meddler {
            session: &other,
            meddled: Cell::new(false),
            inner: CompiledSearch::compile(&query, &params),
        };

        let hits = session.search_with(&mut view, &meddler).unwrap();
        assert!(meddler.meddled.get());
        assert_eq!(vec![(Seqnum::u(2), uid2)], hits);
        // The view itself catches up afterwards
        assert_eq!(3, view.exists());
    }

    #[test]
    fn search_on_missing_mailbox_fails() {
        let setup = set_up();
        let session = setup.session("s");
        session.create_mailbox("Gone", None).unwrap();
        let (_, mut view) = session.select_mailbox("Gone", false).unwrap();
        session.delete_mailbox("Gone", None).unwrap();

        assert_matches!(
            Err(Error::NxMailbox),
            session.search_mailbox(&mut view, &SearchQuery::All)
        );
    }
}
