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


//! Evaluation of `SEARCH` queries.
//!
//! Queries are compiled into a program for a simple boolean stack machine.
//! Sequence sets are resolved during compilation against the bounds in the
//! `SearchParams`, which are fixed before the scan starts, so that `*` means
//! the same thing for every message regardless of what happens to the
//! mailbox mid-scan.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use chrono::prelude::*;

use super::model::*;
use super::store::StoredMessage;
use crate::support::error::Error;

/// The state of the view against which a search is evaluated.
#[derive(Clone, Debug, Default)]
pub struct SearchParams {
    /// The greatest sequence number in the view at the start of the search.
    pub max_seq: u32,
    /// The greatest UID in the view at the start of the search.
    pub max_uid: u32,
    /// Messages recent in the searching session.
    pub recent: BTreeSet<Uid>,
    /// Session-local flags other than `\Recent`.
    pub session_flags: BTreeMap<Uid, FlagSet>,
}

/// Decides whether individual messages match a search.
pub trait SearchEvaluator {
    fn matches(
        &self,
        params: &SearchParams,
        seqnum: Seqnum,
        message: &StoredMessage,
    ) -> Result<bool, Error>;
}

#[derive(Debug)]
enum Op {
    True,
    And,
    Or,
    Not,
    Flag(Flag),
    Recent,
    SizeCompare(u32, bool, bool, bool),
    InternalDateCompare(NaiveDate, bool, bool, bool),
    UidIn(SeqRange<Uid>),
    SeqnumIn(SeqRange<Seqnum>),
}

/// A `SearchQuery` compiled against fixed view bounds.
#[derive(Debug)]
pub struct CompiledSearch {
    ops: Vec<Op>,
}

impl CompiledSearch {
    pub fn compile(query: &SearchQuery, params: &SearchParams) -> Self {
        let mut ops = Vec::new();
        compile_one(&mut ops, query, params);
        CompiledSearch { ops }
    }
}

fn compile_one(dst: &mut Vec<Op>, query: &SearchQuery, params: &SearchParams) {
    match *query {
        SearchQuery::All => dst.push(Op::True),
        SearchQuery::SequenceSet(ref set) => {
            if set.is_uid() {
                dst.push(Op::UidIn(set.resolve(params.max_uid)));
            } else {
                dst.push(Op::SeqnumIn(set.resolve(params.max_seq)));
            }
        }

        SearchQuery::Answered => dst.push(Op::Flag(Flag::Answered)),
        SearchQuery::Deleted => dst.push(Op::Flag(Flag::Deleted)),
        SearchQuery::Draft => dst.push(Op::Flag(Flag::Draft)),
        SearchQuery::Flagged => dst.push(Op::Flag(Flag::Flagged)),
        SearchQuery::Seen => dst.push(Op::Flag(Flag::Seen)),
        SearchQuery::Recent => dst.push(Op::Recent),
        SearchQuery::Keyword(ref kw) => {
            dst.push(Op::Flag(Flag::Keyword(kw.clone())))
        }

        SearchQuery::New => {
            dst.push(Op::Recent);
            dst.push(Op::Flag(Flag::Seen));
            dst.push(Op::Not);
            dst.push(Op::And);
        }
        SearchQuery::Old => {
            dst.push(Op::Recent);
            dst.push(Op::Not);
        }

        SearchQuery::Unanswered => not_flag(dst, Flag::Answered),
        SearchQuery::Undeleted => not_flag(dst, Flag::Deleted),
        SearchQuery::Undraft => not_flag(dst, Flag::Draft),
        SearchQuery::Unflagged => not_flag(dst, Flag::Flagged),
        SearchQuery::Unseen => not_flag(dst, Flag::Seen),
        SearchQuery::Unkeyword(ref kw) => {
            not_flag(dst, Flag::Keyword(kw.clone()))
        }

        SearchQuery::Larger(thresh) => {
            dst.push(Op::SizeCompare(thresh, false, false, true))
        }
        SearchQuery::Smaller(thresh) => {
            dst.push(Op::SizeCompare(thresh, true, false, false))
        }

        SearchQuery::Before(date) => {
            dst.push(Op::InternalDateCompare(date, true, false, false))
        }
        SearchQuery::On(date) => {
            dst.push(Op::InternalDateCompare(date, false, true, false))
        }
        SearchQuery::Since(date) => {
            dst.push(Op::InternalDateCompare(date, false, true, true))
        }

        SearchQuery::Not(ref sub) => {
            compile_one(dst, sub, params);
            dst.push(Op::Not);
        }
        SearchQuery::Or(ref a, ref b) => {
            compile_one(dst, a, params);
            compile_one(dst, b, params);
            dst.push(Op::Or);
        }
        SearchQuery::And(ref subs) => {
            if subs.is_empty() {
                dst.push(Op::True);
                return;
            }

            for (ix, sub) in subs.iter().enumerate() {
                compile_one(dst, sub, params);
                if ix > 0 {
                    dst.push(Op::And);
                }
            }
        }
    }
}

fn not_flag(dst: &mut Vec<Op>, flag: Flag) {
    dst.push(Op::Flag(flag));
    dst.push(Op::Not);
}

fn cmp<T: Ord>(value: &T, relative: &T, lt: bool, eq: bool, gt: bool) -> bool {
    match value.cmp(relative) {
        Ordering::Less => lt,
        Ordering::Equal => eq,
        Ordering::Greater => gt,
    }
}

impl SearchEvaluator for CompiledSearch {
    fn matches(
        &self,
        params: &SearchParams,
        seqnum: Seqnum,
        message: &StoredMessage,
    ) -> Result<bool, Error> {
        let uid = message.uid;
        let has_flag = |flag: &Flag| {
            message.permanent_flags.contains(flag)
                || params
                    .session_flags
                    .get(&uid)
                    .map_or(false, |f| f.contains(flag))
        };

        // Underflow yields false
        let mut stack: Vec<bool> = Vec::new();
        for op in &self.ops {
            let value = match *op {
                Op::True => true,
                Op::And => {
                    let b = stack.pop().unwrap_or(false);
                    let a = stack.pop().unwrap_or(false);
                    a && b
                }
                Op::Or => {
                    let b = stack.pop().unwrap_or(false);
                    let a = stack.pop().unwrap_or(false);
                    a || b
                }
                Op::Not => !stack.pop().unwrap_or(true),
                Op::Flag(ref flag) => has_flag(flag),
                Op::Recent => params.recent.contains(&uid),
                Op::SizeCompare(relative, lt, eq, gt) => cmp(
                    &(message.size() as u64),
                    &u64::from(relative),
                    lt,
                    eq,
                    gt,
                ),
                Op::InternalDateCompare(relative, lt, eq, gt) => cmp(
                    &message.internal_date.naive_utc().date(),
                    &relative,
                    lt,
                    eq,
                    gt,
                ),
                Op::UidIn(ref set) => set.contains(uid),
                Op::SeqnumIn(ref set) => set.contains(seqnum),
            };
            stack.push(value);
        }

        Ok(stack.pop().unwrap_or(false))
    }
}
