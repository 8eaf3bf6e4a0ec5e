//! Like/dislike reconciliation.
//!
//! Every (user, post) pair is in exactly one [`ReactionState`]. A request for a
//! [`Polarity`] moves the pair to its next state through [`reconcile`], which
//! names the single reaction-row write and the counter deltas that must be
//! applied together.

use crate::config::{POLARITY_DISLIKE, POLARITY_LIKE};

/// Whether a reaction is a like or a dislike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Like,
    Dislike,
}

impl Polarity {
    /// Map the boolean `like` flag of a request to a polarity.
    pub fn from_like(like: bool) -> Self {
        if like {
            Polarity::Like
        } else {
            Polarity::Dislike
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Polarity::Like => POLARITY_LIKE,
            Polarity::Dislike => POLARITY_DISLIKE,
        }
    }

    /// Parse a stored polarity value. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            POLARITY_LIKE => Some(Polarity::Like),
            POLARITY_DISLIKE => Some(Polarity::Dislike),
            _ => None,
        }
    }
}

/// Reaction a user currently holds on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionState {
    NoReaction,
    AlreadyLiked,
    AlreadyDisliked,
}

impl From<Option<Polarity>> for ReactionState {
    fn from(polarity: Option<Polarity>) -> Self {
        match polarity {
            None => ReactionState::NoReaction,
            Some(Polarity::Like) => ReactionState::AlreadyLiked,
            Some(Polarity::Dislike) => ReactionState::AlreadyDisliked,
        }
    }
}

/// Persistence action on the reaction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionWrite {
    Insert(Polarity),
    Update(Polarity),
    Remove,
}

/// Signed adjustment of a post's like and dislike counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterDelta {
    pub likes: i32,
    pub dislikes: i32,
}

/// Outcome of one reconciliation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionChange {
    pub write: ReactionWrite,
    pub delta: CounterDelta,
}

impl ReactionChange {
    /// State of the (user, post) pair once the change is applied.
    pub fn next_state(&self) -> ReactionState {
        match self.write {
            ReactionWrite::Insert(p) | ReactionWrite::Update(p) => Some(p).into(),
            ReactionWrite::Remove => ReactionState::NoReaction,
        }
    }
}

/// Transition table for a reaction request.
///
/// Repeating the held polarity toggles it off, the opposite polarity flips
/// it, and a first reaction inserts it.
pub fn reconcile(state: ReactionState, requested: Polarity) -> ReactionChange {
    use Polarity::{Dislike, Like};
    use ReactionState::{AlreadyDisliked, AlreadyLiked, NoReaction};

    let (write, likes, dislikes) = match (state, requested) {
        (NoReaction, Like) => (ReactionWrite::Insert(Like), 1, 0),
        (NoReaction, Dislike) => (ReactionWrite::Insert(Dislike), 0, 1),
        (AlreadyLiked, Like) => (ReactionWrite::Remove, -1, 0),
        (AlreadyLiked, Dislike) => (ReactionWrite::Update(Dislike), -1, 1),
        (AlreadyDisliked, Like) => (ReactionWrite::Update(Like), 1, -1),
        (AlreadyDisliked, Dislike) => (ReactionWrite::Remove, 0, -1),
    };

    ReactionChange {
        write,
        delta: CounterDelta { likes, dislikes },
    }
}
