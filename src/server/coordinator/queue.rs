//! FIFO holding area for connections waiting for a seat.

use std::collections::VecDeque;

use super::types::ConnectionId;

/// Ordered, duplicate-free sequence of waiting connections.
/// Positions handed out to holders are 1-based.
#[derive(Debug, Default)]
pub struct MatchQueue {
    entries: VecDeque<ConnectionId>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `id` at the back and return its position.
    /// An existing entry for `id` is dropped first.
    pub fn push(&mut self, id: ConnectionId) -> usize {
        self.remove(id);
        self.entries.push_back(id);
        self.entries.len()
    }

    /// Remove `id`, returning the position it held.
    pub fn remove(&mut self, id: ConnectionId) -> Option<usize> {
        let index = self.entries.iter().position(|&entry| entry == id)?;
        self.entries.remove(index);
        Some(index + 1)
    }

    pub fn pop_front(&mut self) -> Option<ConnectionId> {
        self.entries.pop_front()
    }

    pub fn position(&self, id: ConnectionId) -> Option<usize> {
        self.entries.iter().position(|&entry| entry == id).map(|i| i + 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every holder with its current position, front first.
    pub fn positions(&self) -> impl Iterator<Item = (ConnectionId, usize)> + '_ {
        self.entries.iter().enumerate().map(|(i, &id)| (id, i + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_stay_contiguous_after_removal() {
        let mut queue = MatchQueue::new();
        let ids: Vec<_> = (0..4).map(|_| ConnectionId::new()).collect();
        for (i, &id) in ids.iter().enumerate() {
            assert_eq!(queue.push(id), i + 1);
        }

        assert_eq!(queue.remove(ids[1]), Some(2));
        let positions: Vec<_> = queue.positions().collect();
        assert_eq!(positions, vec![(ids[0], 1), (ids[2], 2), (ids[3], 3)]);
        assert_eq!(queue.remove(ids[1]), None);
    }

    #[test]
    fn requeue_moves_entry_to_the_back_without_duplicating() {
        let mut queue = MatchQueue::new();
        let first = ConnectionId::new();
        let second = ConnectionId::new();
        queue.push(first);
        queue.push(second);

        assert_eq!(queue.push(first), 2);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.position(second), Some(1));
        assert_eq!(queue.pop_front(), Some(second));
        assert_eq!(queue.pop_front(), Some(first));
        assert!(queue.is_empty());
    }
}
