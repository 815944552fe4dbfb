use core::{
    fmt,
    sync::atomic::{
        AtomicU32,
        Ordering,
    },
};

use slotmap::{
    new_key_type,
    SlotMap,
};

use crate::Token;

new_key_type! {
    struct NodeKey;
}

static NEXT_SEQUENCE_ID: AtomicU32 = AtomicU32::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SequenceId(u32);

impl SequenceId {
    fn next() -> Self {
        Self(NEXT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A stable handle to a token within one [Sequence].
///
/// Positions survive inserts and removals of their neighbours. Once the token
/// itself is removed the position becomes stale and every lookup through it fails.
/// A position is only meaningful for the sequence which created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    owner: SequenceId,
    key: NodeKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    #[error("position belongs to another sequence")]
    ForeignPosition,

    #[error("position has been removed from the sequence")]
    StalePosition,

    #[error("range end is not reachable from its start")]
    UnreachableEnd,
}

#[derive(Clone)]
struct Node {
    token: Token,
    prev: Option<NodeKey>,
    next: Option<NodeKey>,
}

/// A mutable, ordered collection of tokens with O(1) positional insert and remove.
///
/// Nodes live in a generational arena and are linked by key, so removing a node
/// invalidates its position instead of leaving a dangling reference.
pub struct Sequence {
    id: SequenceId,
    nodes: SlotMap<NodeKey, Node>,
    head: Option<NodeKey>,
    tail: Option<NodeKey>,
}

impl Sequence {
    pub fn new() -> Self {
        Self {
            id: SequenceId::next(),
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn position(&self, key: NodeKey) -> Position {
        Position {
            owner: self.id,
            key,
        }
    }

    fn key(&self, position: Position) -> Result<NodeKey, SequenceError> {
        if position.owner != self.id {
            return Err(SequenceError::ForeignPosition);
        }

        if !self.nodes.contains_key(position.key) {
            return Err(SequenceError::StalePosition);
        }

        Ok(position.key)
    }

    /// Returns true if the position is currently part of this sequence.
    pub fn contains(&self, position: Position) -> bool {
        self.key(position).is_ok()
    }

    pub fn first(&self) -> Option<Position> {
        self.head.map(|key| self.position(key))
    }

    pub fn last(&self) -> Option<Position> {
        self.tail.map(|key| self.position(key))
    }

    /// The position following `position`, or `None` at the end (or for an invalid position).
    pub fn next(&self, position: Position) -> Option<Position> {
        let key = self.key(position).ok()?;
        self.nodes[key].next.map(|key| self.position(key))
    }

    /// The position preceding `position`, or `None` at the head (or for an invalid position).
    pub fn prev(&self, position: Position) -> Option<Position> {
        let key = self.key(position).ok()?;
        self.nodes[key].prev.map(|key| self.position(key))
    }

    pub fn get(&self, position: Position) -> Option<&Token> {
        let key = self.key(position).ok()?;
        Some(&self.nodes[key].token)
    }

    pub fn get_mut(&mut self, position: Position) -> Option<&mut Token> {
        let key = self.key(position).ok()?;
        Some(&mut self.nodes[key].token)
    }

    /// Like [Sequence::get] but reports why the lookup failed.
    pub fn token(&self, position: Position) -> Result<&Token, SequenceError> {
        let key = self.key(position)?;
        Ok(&self.nodes[key].token)
    }

    /// Like [Sequence::get_mut] but reports why the lookup failed.
    pub fn token_mut(&mut self, position: Position) -> Result<&mut Token, SequenceError> {
        let key = self.key(position)?;
        Ok(&mut self.nodes[key].token)
    }

    fn link_after(&mut self, prev: Option<NodeKey>, token: Token) -> NodeKey {
        let next = match prev {
            Some(prev) => self.nodes[prev].next,
            None => self.head,
        };

        let key = self.nodes.insert(Node { token, prev, next });
        match prev {
            Some(prev) => self.nodes[prev].next = Some(key),
            None => self.head = Some(key),
        }
        match next {
            Some(next) => self.nodes[next].prev = Some(key),
            None => self.tail = Some(key),
        }

        key
    }

    fn unlink(&mut self, key: NodeKey) -> Token {
        let Some(node) = self.nodes.remove(key) else {
            unreachable!("node key should have been validated");
        };

        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }

        node.token
    }

    pub fn push_back(&mut self, token: Token) -> Position {
        let key = self.link_after(self.tail, token);
        self.position(key)
    }

    pub fn push_front(&mut self, token: Token) -> Position {
        let key = self.link_after(None, token);
        self.position(key)
    }

    pub fn insert_after(
        &mut self,
        position: Position,
        token: Token,
    ) -> Result<Position, SequenceError> {
        let key = self.key(position)?;
        let key = self.link_after(Some(key), token);
        Ok(self.position(key))
    }

    pub fn insert_before(
        &mut self,
        position: Position,
        token: Token,
    ) -> Result<Position, SequenceError> {
        let key = self.key(position)?;
        let prev = self.nodes[key].prev;
        let key = self.link_after(prev, token);
        Ok(self.position(key))
    }

    /// Insert after `position`, or at the head of the sequence if `position` is `None`.
    pub fn insert_after_or_head(
        &mut self,
        position: Option<Position>,
        token: Token,
    ) -> Result<Position, SequenceError> {
        match position {
            Some(position) => self.insert_after(position, token),
            None => Ok(self.push_front(token)),
        }
    }

    pub fn remove(&mut self, position: Position) -> Result<Token, SequenceError> {
        let key = self.key(position)?;
        Ok(self.unlink(key))
    }

    /// Collects the keys of `start..=end`, failing when `end` can not be reached.
    fn range_keys(&self, start: Position, end: Position) -> Result<Vec<NodeKey>, SequenceError> {
        let start = self.key(start)?;
        let end = self.key(end)?;

        let mut keys = Vec::new();
        let mut cursor = Some(start);
        while let Some(key) = cursor {
            keys.push(key);
            if key == end {
                return Ok(keys);
            }

            cursor = self.nodes[key].next;
        }

        Err(SequenceError::UnreachableEnd)
    }

    /// Remove all tokens from `start` to `end`, both inclusive.
    ///
    /// Returns the number of removed tokens. Nothing is removed if `end` is not
    /// reachable from `start` by walking forward.
    pub fn remove_range(&mut self, start: Position, end: Position) -> Result<usize, SequenceError> {
        let keys = self.range_keys(start, end)?;
        for key in &keys {
            self.unlink(*key);
        }

        Ok(keys.len())
    }

    /// Copy the tokens `from..=to` of `source` into this sequence after `at`
    /// (or at the head if `at` is `None`). The source is left untouched.
    ///
    /// A range where `to` directly precedes `from` is empty and copies nothing.
    /// Returns the last inserted position, or `at` if nothing was inserted.
    pub fn copy_range_after(
        &mut self,
        at: Option<Position>,
        source: &Sequence,
        from: Position,
        to: Position,
    ) -> Result<Option<Position>, SequenceError> {
        if let Some(at) = at {
            self.key(at)?;
        }

        if source.next(to) == Some(from) {
            return Ok(at);
        }

        let tokens = source
            .range_keys(from, to)?
            .into_iter()
            .map(|key| source.nodes[key].token.clone())
            .collect::<Vec<_>>();

        let mut cursor = at;
        for token in tokens {
            cursor = Some(self.insert_after_or_head(cursor, token)?);
        }

        Ok(cursor)
    }

    /// Move the tokens `from..=to` out of `source` into this sequence after `at`
    /// (or at the head if `at` is `None`). The moved tokens receive new positions
    /// and their old positions become stale in `source`.
    pub fn splice_after(
        &mut self,
        at: Option<Position>,
        source: &mut Sequence,
        from: Position,
        to: Position,
    ) -> Result<Option<Position>, SequenceError> {
        if let Some(at) = at {
            self.key(at)?;
        }

        let tokens = source
            .range_keys(from, to)?
            .into_iter()
            .map(|key| source.unlink(key))
            .collect::<Vec<_>>();

        let mut cursor = at;
        for token in tokens {
            cursor = Some(self.insert_after_or_head(cursor, token)?);
        }

        Ok(cursor)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            sequence: self,
            cursor: self.head,
        }
    }

    pub fn positions(&self) -> Positions<'_> {
        Positions {
            sequence: self,
            cursor: self.head,
        }
    }

    pub fn to_vec(&self) -> Vec<Token> {
        self.iter().cloned().collect()
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Sequence {
    /// The clone is a distinct sequence: positions of `self` are foreign to it.
    fn clone(&self) -> Self {
        Self {
            id: SequenceId::next(),
            nodes: self.nodes.clone(),
            head: self.head,
            tail: self.tail,
        }
    }
}

impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Sequence {}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<Token> for Sequence {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        let mut sequence = Sequence::new();
        sequence.extend(iter);
        sequence
    }
}

impl Extend<Token> for Sequence {
    fn extend<I: IntoIterator<Item = Token>>(&mut self, iter: I) {
        for token in iter {
            self.push_back(token);
        }
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Token;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<'a> {
    sequence: &'a Sequence,
    cursor: Option<NodeKey>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Token;

    fn next(&mut self) -> Option<Self::Item> {
        let node = &self.sequence.nodes[self.cursor?];
        self.cursor = node.next;
        Some(&node.token)
    }
}

pub struct Positions<'a> {
    sequence: &'a Sequence,
    cursor: Option<NodeKey>,
}

impl Iterator for Positions<'_> {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        self.cursor = self.sequence.nodes[key].next;
        Some(self.sequence.position(key))
    }
}
