use crate::types::Turn;
use std::collections::VecDeque;

/// Bounded, chronologically ordered turns for one user.
///
/// Appending past capacity drops the oldest turn first.
#[derive(Debug, Clone)]
pub struct ConversationBuffer {
    capacity: usize,
    turns: VecDeque<Turn>,
}

impl ConversationBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            turns: VecDeque::with_capacity(capacity.saturating_add(1)),
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Turn> {
        let skip = self.turns.len().saturating_sub(n);
        self.turns.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::ConversationBuffer;
    use crate::types::Turn;

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut buffer = ConversationBuffer::new(0);
        buffer.push(Turn::user("dropped"));
        assert!(buffer.is_empty());
        assert!(buffer.recent(8).is_empty());
    }

    #[test]
    fn recent_larger_than_len_returns_everything() {
        let mut buffer = ConversationBuffer::new(4);
        buffer.push(Turn::user("a"));
        buffer.push(Turn::assistant("b"));
        let recent = buffer.recent(10);
        assert_eq!(recent, vec![Turn::user("a"), Turn::assistant("b")]);
    }
}
