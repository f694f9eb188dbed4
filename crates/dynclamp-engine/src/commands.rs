// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Command queue for operator actions and host lifecycle events.

Producers (an operator UI thread, a scripting surface) push commands at any time;
the tick owner drains them between ticks, so engine state is only ever touched by
one thread.
*/

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::host::HostEvent;

/// A single command, applied between ticks
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    /// Operator toggled the couple button
    SetCoupled(bool),
    /// Operator toggled phase-triggered automation
    SetAutomate(bool),
    /// Host lifecycle notification
    Host(HostEvent),
}

/// Thread-safe FIFO of [`EngineCommand`]s
///
/// Cloning yields another handle onto the same queue.
pub struct CommandQueue {
    queue: Arc<Mutex<VecDeque<EngineCommand>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::with_capacity(16))),
        }
    }

    /// Push a command (called from a producer thread)
    pub fn push(&self, command: EngineCommand) {
        self.queue.lock().push_back(command);
    }

    /// Take the oldest pending command (called by the tick owner between ticks)
    pub fn pop(&self) -> Option<EngineCommand> {
        self.queue.lock().pop_front()
    }

    /// Get queue size (for monitoring)
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CommandQueue {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let queue = CommandQueue::new();
        queue.push(EngineCommand::SetAutomate(true));
        queue.push(EngineCommand::SetCoupled(true));
        queue.push(EngineCommand::Host(HostEvent::Pause));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(EngineCommand::SetAutomate(true)));
        assert_eq!(queue.pop(), Some(EngineCommand::SetCoupled(true)));
        assert_eq!(queue.pop(), Some(EngineCommand::Host(HostEvent::Pause)));
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_clones_share_queue() {
        let queue = CommandQueue::new();
        let producer = queue.clone();

        let handle = thread::spawn(move || {
            for i in 0..100 {
                producer.push(EngineCommand::SetCoupled(i % 2 == 0));
            }
        });
        handle.join().unwrap();

        assert_eq!(queue.len(), 100);
        assert_eq!(queue.pop(), Some(EngineCommand::SetCoupled(true)));
    }
}
