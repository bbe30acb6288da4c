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

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::convert::{TryFrom, TryInto};
use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroU32;
use std::ops::Bound::{Excluded, Included, Unbounded};
use std::str::FromStr;

use chrono::prelude::*;

use crate::support::error::Error;

/// Uniquely identifies a message within a single mailbox.
///
/// UIDs start at 1 and increase monotonically as messages are added to the
/// mailbox. UIDs are never reused within one UID validity epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uid(pub NonZeroU32);

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Uid({})", self.0.get())
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.get())
    }
}

impl Uid {
    // Unsafe because new() isn't const for some reason
    pub const MIN: Self = unsafe { Uid(NonZeroU32::new_unchecked(1)) };
    pub const MAX: Self = unsafe { Uid(NonZeroU32::new_unchecked(u32::MAX)) };

    pub fn of(uid: u32) -> Option<Self> {
        NonZeroU32::new(uid).map(Uid)
    }

    pub fn next(self) -> Option<Self> {
        self.0.get().checked_add(1).and_then(Uid::of)
    }

    pub fn saturating_next(self) -> Self {
        self.next().unwrap_or(Uid::MAX)
    }

    #[cfg(test)]
    pub fn u(uid: u32) -> Self {
        Uid::of(uid).unwrap()
    }
}

impl TryFrom<u32> for Uid {
    type Error = ();

    fn try_from(v: u32) -> Result<Self, ()> {
        Self::of(v).ok_or(())
    }
}

impl From<Uid> for u32 {
    fn from(uid: Uid) -> u32 {
        uid.0.get()
    }
}

/// The position of a message within a session's view of a mailbox.
///
/// The sequence number of a message is one plus the number of messages in
/// the view with a lesser UID. It is only meaningful relative to a particular
/// `SelectedView` as of its last synchronisation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Seqnum(pub NonZeroU32);

impl Seqnum {
    // Unsafe because new() isn't const for some reason
    pub const MIN: Self = unsafe { Seqnum(NonZeroU32::new_unchecked(1)) };

    pub fn of(seqnum: u32) -> Option<Self> {
        NonZeroU32::new(seqnum).map(Seqnum)
    }

    #[cfg(test)]
    pub fn u(seqnum: u32) -> Self {
        Seqnum::of(seqnum).unwrap()
    }

    pub fn to_index(self) -> usize {
        self.0.get() as usize - 1
    }

    pub fn from_index(ix: usize) -> Self {
        // More than u32::MAX messages cannot be addressed anyway
        Seqnum::of((ix + 1).try_into().unwrap_or(u32::MAX))
            .unwrap_or(Seqnum::MIN)
    }
}

impl TryFrom<u32> for Seqnum {
    type Error = ();

    fn try_from(v: u32) -> Result<Self, ()> {
        Self::of(v).ok_or(())
    }
}

impl From<Seqnum> for u32 {
    fn from(seqnum: Seqnum) -> u32 {
        seqnum.0.get()
    }
}

impl fmt::Debug for Seqnum {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Seqnum({})", self.0.get())
    }
}

/// A resolved set of sequence numbers or UIDs.
///
/// Internally, this is maintained as a minimal sorted set of inclusive ranges.
/// It does not maintain information on the original fragmentation, ordering,
/// or duplication.
///
/// There is no support for removal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeqRange<T> {
    parts: BTreeMap<u32, u32>,
    _t: PhantomData<T>,
}

impl<T> SeqRange<T> {
    /// Create a new, empty range.
    pub fn new() -> Self {
        SeqRange {
            parts: BTreeMap::new(),
            _t: PhantomData,
        }
    }

    /// Return whether this range is empty.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    fn insert_raw(&mut self, start_incl: u32, mut end_incl: u32) {
        // If this range overlaps any later ranges, fuse them.
        loop {
            let following = self
                .parts
                .range((Excluded(start_incl), Unbounded))
                .next()
                .map(|(&start, &end)| (start, end));

            if let Some((following_start, following_end)) = following {
                if following_start - 1 <= end_incl {
                    end_incl = end_incl.max(following_end);
                    self.parts.remove(&following_start);
                    continue;
                }
            }

            break;
        }

        let preceding = self
            .parts
            .range((Unbounded, Included(end_incl)))
            .next_back()
            .map(|(&start, &end)| (start, end));
        if let Some((preceding_start, preceding_end)) = preceding {
            if preceding_end.saturating_add(1) >= start_incl {
                if start_incl < preceding_start {
                    self.parts.remove(&preceding_start);
                    self.parts.insert(start_incl, end_incl.max(preceding_end));
                } else {
                    self.parts
                        .insert(preceding_start, end_incl.max(preceding_end));
                }
                return;
            }
        }

        self.parts.insert(start_incl, end_incl);
    }
}

impl<T: Into<u32>> SeqRange<T> {
    /// Return whether the given item is present in this set.
    pub fn contains(&self, v: T) -> bool {
        let v: u32 = v.into();
        self.parts
            .range(..=v)
            .next_back()
            .filter(|&(_, &end)| end >= v)
            .is_some()
    }
}

impl<T> Default for SeqRange<T> {
    fn default() -> Self {
        SeqRange::new()
    }
}

/// One endpoint of a range in a `SequenceSet`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeqBound {
    Num(NonZeroU32),
    /// `*`, the largest value in use at the time the set is resolved.
    Star,
}

impl SeqBound {
    fn resolve(self, max: u32) -> u32 {
        match self {
            SeqBound::Num(n) => n.get(),
            SeqBound::Star => max,
        }
    }
}

impl fmt::Display for SeqBound {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SeqBound::Num(n) => write!(f, "{}", n),
            SeqBound::Star => write!(f, "*"),
        }
    }
}

/// A sequence set as sent by the client, before `*` has been given meaning.
///
/// Whether the set addresses sequence numbers or UIDs is carried along with
/// it. The set is resolved against the bounds of a particular view at the
/// moment it is used, so `*` always refers to the largest sequence number or
/// UID that view knew of at that point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceSet {
    uid: bool,
    parts: Vec<(SeqBound, SeqBound)>,
}

impl SequenceSet {
    /// The set `1:*`.
    pub fn all(uid: bool) -> Self {
        SequenceSet {
            uid,
            parts: vec![(SeqBound::Num(Uid::MIN.0), SeqBound::Star)],
        }
    }

    /// A set containing exactly one sequence number or UID.
    pub fn just(n: NonZeroU32, uid: bool) -> Self {
        SequenceSet {
            uid,
            parts: vec![(SeqBound::Num(n), SeqBound::Num(n))],
        }
    }

    /// Parse the IMAP wire format of a sequence set.
    pub fn parse(raw: &str, uid: bool) -> Option<Self> {
        fn bound(r: &str) -> Option<SeqBound> {
            if "*" == r {
                Some(SeqBound::Star)
            } else {
                r.parse::<NonZeroU32>().ok().map(SeqBound::Num)
            }
        }

        let mut parts = Vec::new();
        for part in raw.split(',') {
            let mut subs = part.split(':');
            match (subs.next(), subs.next(), subs.next()) {
                (Some(only), None, None) => {
                    let only = bound(only)?;
                    parts.push((only, only));
                }
                (Some(start), Some(end), None) => {
                    parts.push((bound(start)?, bound(end)?));
                }
                _ => return None,
            }
        }

        Some(SequenceSet { uid, parts })
    }

    /// Whether this set addresses UIDs rather than sequence numbers.
    pub fn is_uid(&self) -> bool {
        self.uid
    }

    /// Resolve this set into a concrete range, with `*` taking the value
    /// `max`.
    pub fn resolve<T>(&self, max: u32) -> SeqRange<T> {
        let mut range = SeqRange::new();
        for &(start, end) in &self.parts {
            // `*` names no message when there are none
            if 0 == max && (SeqBound::Star == start || SeqBound::Star == end) {
                continue;
            }

            let start = start.resolve(max);
            let end = end.resolve(max);
            // RFC 3501 allows the endpoints to be in either order
            range.insert_raw(start.min(end), end.max(start));
        }
        range
    }
}

impl fmt::Display for SequenceSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (ix, &(start, end)) in self.parts.iter().enumerate() {
            if ix > 0 {
                write!(f, ",")?;
            }

            if start == end {
                write!(f, "{}", start)?;
            } else {
                write!(f, "{}:{}", start, end)?;
            }
        }

        Ok(())
    }
}

/// A message flag.
///
/// System flags are represented as top-level enum values. Keywords are in the
/// `Keyword` case.
///
/// The `Display` format of this type is the exact string value that would be
/// sent over the wire. `FromStr` does the reverse conversion, and also
/// understands non-standard casing of the system flags.
///
/// `\Recent` is included here since it is handled as a session flag: it lives
/// in a session's view rather than on the message once some session has seen
/// the message.
#[derive(Clone)]
pub enum Flag {
    Answered,
    Deleted,
    Draft,
    Flagged,
    Recent,
    Seen,
    Keyword(String),
}

/// A set of flags, ordered the way they are reported to clients.
pub type FlagSet = BTreeSet<Flag>;

impl Flag {
    fn rank(&self) -> u8 {
        match *self {
            Flag::Answered => 0,
            Flag::Deleted => 1,
            Flag::Draft => 2,
            Flag::Flagged => 3,
            Flag::Recent => 4,
            Flag::Seen => 5,
            Flag::Keyword(_) => 6,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Flag::Answered => write!(f, "\\Answered"),
            Flag::Deleted => write!(f, "\\Deleted"),
            Flag::Draft => write!(f, "\\Draft"),
            Flag::Flagged => write!(f, "\\Flagged"),
            Flag::Recent => write!(f, "\\Recent"),
            Flag::Seen => write!(f, "\\Seen"),
            Flag::Keyword(ref kw) => write!(f, "{}", kw),
        }
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        <Flag as fmt::Display>::fmt(self, f)
    }
}

impl FromStr for Flag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        if s.eq_ignore_ascii_case("\\answered") {
            Ok(Flag::Answered)
        } else if s.eq_ignore_ascii_case("\\deleted") {
            Ok(Flag::Deleted)
        } else if s.eq_ignore_ascii_case("\\draft") {
            Ok(Flag::Draft)
        } else if s.eq_ignore_ascii_case("\\flagged") {
            Ok(Flag::Flagged)
        } else if s.eq_ignore_ascii_case("\\recent") {
            Ok(Flag::Recent)
        } else if s.eq_ignore_ascii_case("\\seen") {
            Ok(Flag::Seen)
        } else if s.starts_with('\\') {
            Err(Error::NxFlag)
        } else if !s.is_empty() && s.as_bytes().iter().copied().all(is_atom_char)
        {
            Ok(Flag::Keyword(s.to_owned()))
        } else {
            Err(Error::UnsafeName)
        }
    }
}

fn is_atom_char(ch: u8) -> bool {
    match ch {
        0..=b' ' => false,
        127..=255 => false,
        b'(' | b')' | b'{' | b'*' | b'%' | b'\\' | b'"' | b']' => false,
        _ => true,
    }
}

impl Ord for Flag {
    fn cmp(&self, other: &Flag) -> Ordering {
        match (self, other) {
            // Keywords are case-insensitive, but only in ASCII since there's
            // no way to get Unicode flags within RFC 3501 anyway.
            (&Flag::Keyword(ref a), &Flag::Keyword(ref b)) => a
                .bytes()
                .map(|c| c.to_ascii_lowercase())
                .cmp(b.bytes().map(|c| c.to_ascii_lowercase())),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Flag {
    fn partial_cmp(&self, other: &Flag) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Flag {
    fn eq(&self, other: &Flag) -> bool {
        Ordering::Equal == self.cmp(other)
    }
}

impl Eq for Flag {}

/// The flags a mailbox stores durably unless it says otherwise.
pub fn default_permanent_flags() -> FlagSet {
    vec![
        Flag::Answered,
        Flag::Deleted,
        Flag::Draft,
        Flag::Flagged,
        Flag::Seen,
    ]
    .into_iter()
    .collect()
}

/// The flags a mailbox keeps only within sessions unless it says otherwise.
pub fn default_session_flags() -> FlagSet {
    Some(Flag::Recent).into_iter().collect()
}

/// How a `STORE` applies its flag list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlagOp {
    /// `FLAGS`: the message ends up with exactly the listed flags.
    Replace,
    /// `+FLAGS`
    Add,
    /// `-FLAGS`
    Delete,
}

impl FlagOp {
    /// Return the result of applying `given` to `current` by this operation.
    pub fn apply(self, current: &FlagSet, given: &FlagSet) -> FlagSet {
        match self {
            FlagOp::Replace => given.clone(),
            FlagOp::Add => current.union(given).cloned().collect(),
            FlagOp::Delete => current.difference(given).cloned().collect(),
        }
    }
}

/// Attributes that may be applied to mailboxes in `LIST` responses.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MailboxAttribute {
    Noselect,
    HasChildren,
    HasNoChildren,
    Subscribed,
}

impl MailboxAttribute {
    pub fn name(&self) -> &'static str {
        match *self {
            MailboxAttribute::Noselect => "\\Noselect",
            MailboxAttribute::HasChildren => "\\HasChildren",
            MailboxAttribute::HasNoChildren => "\\HasNoChildren",
            MailboxAttribute::Subscribed => "\\Subscribed",
        }
    }
}

impl fmt::Display for MailboxAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Debug for MailboxAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single `LIST` or `LSUB` response.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ListResponse {
    /// The name of the mailbox.
    pub name: String,
    /// The hierarchy delimiter.
    pub delimiter: char,
    /// Attributes to report on the mailbox.
    pub attributes: Vec<MailboxAttribute>,
}

/// A point-in-time summary of a mailbox, as needed for `SELECT`, `EXAMINE`
/// and `STATUS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxSnapshot {
    /// The name of the mailbox.
    pub name: String,
    /// Whether the mailbox is read-only.
    /// `TAG OK [READ-WRITE|READ-ONLY]`
    pub read_only: bool,
    /// `* OK [UIDVALIDITY uid_validity]`
    pub uid_validity: u32,
    /// `* OK [PERMANENTFLAGS (flags...)]`
    pub permanent_flags: FlagSet,
    /// Flags which exist only within sessions. Together with
    /// `permanent_flags`, these make up the `* FLAGS (...)` response.
    pub session_flags: FlagSet,
    /// `* exists EXISTS`
    pub exists: usize,
    /// `* recent RECENT`
    pub recent: usize,
    /// The number of messages without `\Seen`.
    pub unseen: usize,
    /// The sequence number of the first message without the `\Seen` flag.
    /// `None` if all messages are seen.
    /// `* OK [UNSEEN first_unseen]`
    pub first_unseen: Option<Seqnum>,
    /// The probable next UID.
    /// `* OK [UIDNEXT next_uid]`
    pub next_uid: Uid,
}

/// Why a session must be disconnected from its selected mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByeReason {
    /// The selected mailbox was deleted or renamed away.
    MailboxDeleted,
    /// The selected mailbox now has this new UID validity.
    UidValidityChanged(u32),
}

impl fmt::Display for ByeReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ByeReason::MailboxDeleted => write!(f, "Selected mailbox deleted."),
            ByeReason::UidValidityChanged(_) => {
                write!(f, "UID validity changed.")
            }
        }
    }
}

/// Unsolicited responses that must be sent to the client after a command
/// to bring it up to date with its selected mailbox.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollResponse {
    /// If set, the client must be disconnected with this reason and nothing
    /// else in the response is meaningful.
    pub bye: Option<ByeReason>,
    /// Messages to report as expunged, sorted ascending by the sequence
    /// number the client last knew them under.
    ///
    /// These must be sent as `EXPUNGE` responses in *reverse* order so that
    /// each sequence number is still valid when the client processes it.
    pub expunge: Vec<(Seqnum, Uid)>,
    /// If new messages arrived, the new mailbox size.
    /// `* exists EXISTS`
    pub exists: Option<usize>,
    /// If the recent count changed, the new recent count.
    /// `* recent RECENT`
    pub recent: Option<usize>,
    /// UIDs of messages whose flags should be sent in unsolicited `FETCH`
    /// responses.
    pub fetch: Vec<Uid>,
}

impl PollResponse {
    /// Return whether there is nothing to tell the client.
    pub fn is_empty(&self) -> bool {
        self.bye.is_none()
            && self.expunge.is_empty()
            && self.exists.is_none()
            && self.recent.is_none()
            && self.fetch.is_empty()
    }
}

/// A single item to be processed by the `APPEND` command.
#[derive(Debug, Clone, Default)]
pub struct AppendItem {
    /// The raw message.
    pub data: Vec<u8>,
    /// Any flags to set on the newly-inserted message.
    pub flags: Vec<Flag>,
    /// The internal date to record. Defaults to the time of the append.
    pub internal_date: Option<DateTime<Utc>>,
}

/// The response for the `APPEND` command, i.e., the RFC 4315 `APPENDUID`
/// response code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendResponse {
    /// The UID validity value of the destination mailbox.
    pub uid_validity: u32,
    /// The UID of each inserted message, in the order given.
    pub uids: Vec<Uid>,
}

/// The response from the `COPY` and `UID COPY` commands, i.e., the RFC 4315
/// `COPYUID` response code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyResponse {
    /// The UID validity value of the destination mailbox.
    pub uid_validity: u32,
    /// (source UID, destination UID) for each copied message.
    pub uids: Vec<(Uid, Uid)>,
}

/// An attribute requested by `FETCH`.
///
/// Rendering the attributes is the business of the protocol layer. The
/// session only needs to know which of them imply setting `\Seen`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAttribute {
    Uid,
    Flags,
    InternalDate,
    Rfc822Size,
    Rfc822,
    Rfc822Header,
    Rfc822Text,
    Envelope,
    BodyStructure,
    /// `BODY[section]` or `BODY.PEEK[section]`.
    Body { section: String, peek: bool },
}

impl FetchAttribute {
    /// Return whether fetching this attribute sets `\Seen` on the message.
    pub fn sets_seen(&self) -> bool {
        match *self {
            FetchAttribute::Rfc822 | FetchAttribute::Rfc822Text => true,
            FetchAttribute::Body { peek, .. } => !peek,
            _ => false,
        }
    }
}

/// The query for the `SEARCH` command.
///
/// Only criteria which can be evaluated on message metadata are represented;
/// content-based criteria belong to the evaluator of the storage backend.
#[derive(Clone, Debug)]
pub enum SearchQuery {
    All,
    /// A sequence-number or UID set, depending on the set.
    SequenceSet(SequenceSet),
    Answered,
    Deleted,
    Draft,
    Flagged,
    Seen,
    Recent,
    /// Recent and not seen.
    New,
    /// NB "NOT RECENT", not "NOT NEW"
    Old,
    Unanswered,
    Undeleted,
    Undraft,
    Unflagged,
    Unseen,
    Keyword(String),
    Unkeyword(String),
    Larger(u32),
    Smaller(u32),
    Before(NaiveDate),
    On(NaiveDate),
    Since(NaiveDate),
    Not(Box<SearchQuery>),
    Or(Box<SearchQuery>, Box<SearchQuery>),
    And(Vec<SearchQuery>),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn seqrange_fuses_overlapping_parts() {
        let mut range = SeqRange::<Uid>::new();
        range.insert_raw(5, 7);
        range.insert_raw(1, 2);
        range.insert_raw(3, 4);
        range.insert_raw(10, 10);
        range.insert_raw(9, 12);
        assert_eq!(
            vec![(1, 7), (9, 12)],
            range.parts.iter().map(|(&a, &b)| (a, b)).collect::<Vec<_>>()
        );
        assert!(range.contains(Uid::u(4)));
        assert!(!range.contains(Uid::u(8)));
        assert!(range.contains(Uid::u(12)));
    }

    #[test]
    fn sequence_set_parse_and_resolve() {
        let set = SequenceSet::parse("2,4:*", false).unwrap();
        assert!(!set.is_uid());
        assert_eq!("2,4:*", set.to_string());

        let resolved = set.resolve::<Seqnum>(6);
        let members: Vec<u32> =
            (1..=7).filter(|&n| resolved.contains(Seqnum::u(n))).collect();
        assert_eq!(vec![2, 4, 5, 6], members);

        // Reversed endpoints and a star below the start
        let set = SequenceSet::parse("9:*", true).unwrap();
        let resolved = set.resolve::<Uid>(3);
        assert!(!resolved.contains(Uid::u(2)));
        assert!(resolved.contains(Uid::u(3)));
        assert!(resolved.contains(Uid::u(9)));
        assert!(!resolved.contains(Uid::u(10)));

        assert!(SequenceSet::parse("", false).is_none());
        assert!(SequenceSet::parse("0", false).is_none());
        assert!(SequenceSet::parse("1:2:3", false).is_none());
        assert!(SequenceSet::parse("x", false).is_none());
    }

    #[test]
    fn star_in_empty_mailbox_matches_nothing() {
        let set = SequenceSet::all(false);
        let resolved = set.resolve::<Seqnum>(0);
        assert!(resolved.is_empty());
        assert!(!resolved.contains(Seqnum::u(1)));
        assert!(!resolved.contains(Seqnum::u(2)));
    }

    #[test]
    fn flag_parsing() {
        assert_eq!(Flag::Seen, "\\SEEN".parse::<Flag>().unwrap());
        assert_eq!(Flag::Recent, "\\recent".parse::<Flag>().unwrap());
        assert_eq!(
            Flag::Keyword("$Junk".to_owned()),
            "$Junk".parse::<Flag>().unwrap()
        );
        assert_matches!(Err(Error::NxFlag), "\\Bogus".parse::<Flag>());
        assert_matches!(Err(Error::UnsafeName), "foo bar".parse::<Flag>());
        assert_matches!(Err(Error::UnsafeName), "".parse::<Flag>());
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let set: FlagSet = vec![
            Flag::Keyword("Junk".to_owned()),
            Flag::Keyword("JUNK".to_owned()),
            Flag::Seen,
        ]
        .into_iter()
        .collect();
        assert_eq!(2, set.len());
        assert!(set.contains(&Flag::Keyword("junk".to_owned())));
    }

    #[test]
    fn flag_op_apply() {
        let current: FlagSet =
            vec![Flag::Seen, Flag::Flagged].into_iter().collect();
        let given: FlagSet =
            vec![Flag::Deleted, Flag::Seen].into_iter().collect();

        assert_eq!(given, FlagOp::Replace.apply(&current, &given));
        assert_eq!(
            vec![Flag::Deleted, Flag::Flagged, Flag::Seen],
            FlagOp::Add
                .apply(&current, &given)
                .into_iter()
                .collect::<Vec<_>>()
        );
        assert_eq!(
            vec![Flag::Flagged],
            FlagOp::Delete
                .apply(&current, &given)
                .into_iter()
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn fetch_attributes_implying_seen() {
        assert!(FetchAttribute::Rfc822.sets_seen());
        assert!(FetchAttribute::Rfc822Text.sets_seen());
        assert!(FetchAttribute::Body {
            section: String::new(),
            peek: false
        }
        .sets_seen());
        assert!(!FetchAttribute::Body {
            section: "HEADER".to_owned(),
            peek: true
        }
        .sets_seen());
        assert!(!FetchAttribute::Flags.sets_seen());
        assert!(!FetchAttribute::Rfc822Header.sets_seen());
    }
}
