// Copyright 2024-Present eduMessenger. https://edumessenger.org/
// SPDX-License-Identifier: Apache-2.0

use crate::event::OutboundAction;

/// The buffer flushes once it holds more actions than this.
pub const MAX_BUFFERED_ACTIONS: usize = 100;

/// Takes in individual outbound actions and holds them, in arrival order,
/// until the relay flushes them to eduMessenger.
pub struct ActionAggregator {
    queue: Vec<OutboundAction>,
}

impl Default for ActionAggregator {
    fn default() -> Self {
        ActionAggregator {
            queue: Vec::with_capacity(MAX_BUFFERED_ACTIONS + 1),
        }
    }
}

impl ActionAggregator {
    /// Takes in an individual action.
    pub fn add(&mut self, action: OutboundAction) {
        self.queue.push(action);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Whether the buffer has grown past the flush threshold.
    pub fn over_threshold(&self) -> bool {
        self.queue.len() > MAX_BUFFERED_ACTIONS
    }

    /// Drains every pending action, preserving order.
    pub fn take_batch(&mut self) -> Vec<OutboundAction> {
        std::mem::take(&mut self.queue)
    }
}
