// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Tick driver: applies queued commands between ticks, runs the engine and
//! republishes its state.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::commands::{CommandQueue, EngineCommand};
use crate::engine::CouplingEngine;
use crate::error::EngineError;
use crate::host::{HostEvent, StatePublisher};
use crate::tick::{TickInput, TickOutput};

/// Owns a [`CouplingEngine`] on the tick thread and feeds it from a [`CommandQueue`]
pub struct CouplingRunner {
    engine: CouplingEngine,
    queue: CommandQueue,
    publisher: Option<Arc<dyn StatePublisher>>,
}

impl CouplingRunner {
    pub fn new(engine: CouplingEngine) -> Self {
        Self {
            engine,
            queue: CommandQueue::new(),
            publisher: None,
        }
    }

    /// Attach a publisher that receives [`crate::PublishedState`] after every tick
    pub fn with_publisher(mut self, publisher: Arc<dyn StatePublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Handle for producer threads
    pub fn queue(&self) -> CommandQueue {
        self.queue.clone()
    }

    /// Apply every pending command in arrival order.
    ///
    /// A rejected command leaves the engine unchanged and does not stop the
    /// remaining ones; the errors are returned. `HostEvent::Init` republishes
    /// parameters and state.
    pub fn apply_pending(&mut self) -> Vec<EngineError> {
        let mut errors = Vec::new();
        while let Some(command) = self.queue.pop() {
            trace!("Applying {:?}", command);
            let init = matches!(command, EngineCommand::Host(HostEvent::Init));
            match self.engine.apply(command) {
                Ok(()) if init => self.publish_current(),
                Ok(()) => {}
                Err(e) => errors.push(e),
            }
        }
        errors
    }

    /// Push the current parameters and state to the publisher, if any
    pub fn publish_current(&self) {
        let Some(publisher) = &self.publisher else {
            return;
        };
        if let Err(e) = publisher.publish_parameters(&self.engine.parameters()) {
            warn!("Parameter publish failed: {}", e);
        }
        if let Err(e) = publisher.publish_state(&self.engine.state()) {
            warn!("State publish failed: {}", e);
        }
    }

    /// Apply pending commands, run one tick, publish state
    pub fn tick(&mut self, input: &TickInput) -> TickOutput {
        if !self.queue.is_empty() {
            for e in self.apply_pending() {
                warn!("Command rejected: {}", e);
            }
        }

        let output = self.engine.execute(input);

        if let Some(publisher) = &self.publisher {
            if let Err(e) = publisher.publish_state(&self.engine.state()) {
                warn!("State publish failed: {}", e);
            }
        }
        output
    }

    pub fn engine(&self) -> &CouplingEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut CouplingEngine {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{EngineSettings, ParameterSnapshot};
    use crate::tick::PublishedState;
    use parking_lot::Mutex;

    fn runner() -> CouplingRunner {
        CouplingRunner::new(CouplingEngine::new(EngineSettings::default(), 1e-4).unwrap())
    }

    #[test]
    fn test_commands_applied_before_tick() {
        let mut runner = runner();
        let queue = runner.queue();
        queue.push(EngineCommand::SetCoupled(true));

        let out = runner.tick(&TickInput::new(-0.05, -0.05, true, false));
        assert!(runner.engine().is_coupled());
        assert_eq!(out.isyn_1_2, 0.0); // sample 0 of the alpha profile
        assert!(queue.is_empty());
    }

    #[test]
    fn test_rejected_command_does_not_block_queue() {
        let mut runner = runner();
        let queue = runner.queue();
        queue.push(EngineCommand::Host(HostEvent::Period { period_ns: 0 }));
        queue.push(EngineCommand::SetAutomate(true));

        let errors = runner.apply_pending();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], EngineError::Period(_)));
        assert!(runner.engine().is_automated());
        assert_eq!(runner.engine().dt(), 1e-4);
    }

    #[test]
    fn test_publisher_sees_every_tick() {
        let seen: Arc<Mutex<Vec<PublishedState>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let publisher = move |state: &PublishedState| -> Result<(), String> {
            sink.lock().push(*state);
            Ok(())
        };

        let mut runner = runner().with_publisher(Arc::new(publisher));
        for _ in 0..3 {
            runner.tick(&TickInput::default());
        }

        let seen = seen.lock();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].elapsed_time, 0.0);
        assert_eq!(seen[2].elapsed_time, 2.0 * 1e-4);
    }

    #[derive(Default)]
    struct RecordingPublisher {
        states: Mutex<Vec<PublishedState>>,
        parameters: Mutex<Vec<ParameterSnapshot>>,
    }

    impl StatePublisher for RecordingPublisher {
        fn publish_state(&self, state: &PublishedState) -> Result<(), String> {
            self.states.lock().push(*state);
            Ok(())
        }

        fn publish_parameters(&self, parameters: &ParameterSnapshot) -> Result<(), String> {
            self.parameters.lock().push(parameters.clone());
            Ok(())
        }
    }

    #[test]
    fn test_init_republishes_parameters_and_state() {
        let publisher = Arc::new(RecordingPublisher::default());
        let mut runner = runner().with_publisher(publisher.clone());
        runner.tick(&TickInput::new(0.0, 0.0, true, false));
        runner.tick(&TickInput::new(0.0, 0.0, false, true));

        runner.queue().push(EngineCommand::Host(HostEvent::Init));
        assert!(runner.apply_pending().is_empty());

        let parameters = publisher.parameters.lock();
        assert_eq!(parameters.len(), 1);
        assert_eq!(parameters[0].coupling_delay_ms, 187.5);
        assert_eq!(parameters[0].synapse_1_2.esyn_mv, -70.0);

        // Two ticks plus the Init republication, which does not advance time
        let states = publisher.states.lock();
        assert_eq!(states.len(), 3);
        assert_eq!(states[2], runner.engine().state());
        assert_eq!(states[2].phase_difference, 1e-4);
        assert_eq!(runner.engine().tick_count(), 2);
    }

    #[test]
    fn test_init_without_publisher_is_harmless() {
        let mut runner = runner();
        runner.queue().push(EngineCommand::Host(HostEvent::Init));
        assert!(runner.apply_pending().is_empty());
        assert_eq!(runner.engine().tick_count(), 0);
    }

    #[test]
    fn test_publisher_error_does_not_stop_ticks() {
        let publisher = |_: &PublishedState| -> Result<(), String> { Err("sink closed".into()) };
        let mut runner = runner().with_publisher(Arc::new(publisher));
        runner.tick(&TickInput::default());
        runner.tick(&TickInput::default());
        assert_eq!(runner.engine().tick_count(), 2);
    }
}
