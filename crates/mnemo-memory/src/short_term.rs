// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-scoped conversation buffer.

use std::collections::VecDeque;

use crate::types::Turn;

/// Ordered buffer of the current session's turns.
///
/// Exchanges are appended as a user turn followed by an assistant turn. With
/// a cap set, the oldest exchange is evicted once the cap is exceeded.
#[derive(Debug, Clone, Default)]
pub struct ShortTermMemory {
    turns: VecDeque<Turn>,
    max_exchanges: Option<usize>,
}

impl ShortTermMemory {
    /// Unbounded buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer keeping at most `max_exchanges` user/assistant pairs.
    pub fn with_capacity_limit(max_exchanges: Option<usize>) -> Self {
        Self {
            turns: VecDeque::new(),
            max_exchanges,
        }
    }

    /// Record one exchange.
    pub fn save(&mut self, input: &str, output: &str) {
        self.turns.push_back(Turn::user(input));
        self.turns.push_back(Turn::assistant(output));

        if let Some(max) = self.max_exchanges {
            while self.turns.len() > max * 2 {
                self.turns.pop_front();
                self.turns.pop_front();
            }
        }
    }

    /// All turns in conversation order.
    pub fn load(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Number of turns (two per exchange).
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
