//! Clock/reset sequencing of a pipelined DUT.
//!
//! Every vector walks the same state machine:
//!
//! ```text
//! RESET_LOW -> RESET_RELEASE -> STEADY_CLOCKING -> SAMPLE -> RESET_LOW
//! ```
//!
//! Reset is held for `reset_cycles` edges, which must exceed the pipeline
//! depth, and released between two edges. Stimulus is then set once and
//! held. In fixed mode the sequencer advances exactly `latency` edges and
//! samples; in handshake mode it polls the valid output after each edge and
//! gives up after `timeout_cycles`.

use std::fmt;

use parity_config::{ButterflyFields, SampleMode, TimingConfig};
use parity_dut::{Direction, DutAdapter};
use serde::Serialize;

use crate::error::HarnessError;

/// Sequencer state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SeqState {
    /// Reset will be asserted on the next call.
    ResetLow,
    /// Reset has been released on a clock boundary; stimulus may be applied.
    ResetRelease,
    /// Stimulus is held; the clock is running toward the sample point.
    SteadyClocking,
    /// Outputs have been read for this vector.
    Sample,
}

impl fmt::Display for SeqState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SeqState::ResetLow => "RESET_LOW",
            SeqState::ResetRelease => "RESET_RELEASE",
            SeqState::SteadyClocking => "STEADY_CLOCKING",
            SeqState::Sample => "SAMPLE",
        };
        f.write_str(s)
    }
}

/// What the sample point produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Output values, in the requested order, and the edges waited.
    Sampled {
        /// Sampled output values.
        values: Vec<i64>,
        /// Edges between applying stimulus and sampling.
        cycles: u32,
    },
    /// The valid output never asserted.
    TimedOut {
        /// Edges waited.
        cycles: u32,
    },
}

/// Checks that a DUT declares every field the harness will touch.
pub fn require_fields<D: DutAdapter + ?Sized>(
    dut: &D,
    inputs: &[&str],
    outputs: &[&str],
) -> Result<(), HarnessError> {
    let wanted = inputs
        .iter()
        .map(|f| (*f, Direction::Input, "input"))
        .chain(outputs.iter().map(|f| (*f, Direction::Output, "output")));
    for (field, direction, label) in wanted {
        if !dut.has_field(field, direction) {
            return Err(HarnessError::MissingField {
                dut: dut.name().to_string(),
                field: field.to_string(),
                direction: label,
            });
        }
    }
    Ok(())
}

/// Drives one DUT through the reset/stimulus/sample cycle.
pub struct Sequencer<'a, D: DutAdapter + ?Sized> {
    dut: &'a mut D,
    timing: &'a TimingConfig,
    fields: &'a ButterflyFields,
    state: SeqState,
    edges: u64,
}

impl<'a, D: DutAdapter + ?Sized> Sequencer<'a, D> {
    /// Creates a sequencer in [`SeqState::ResetLow`].
    pub fn new(dut: &'a mut D, timing: &'a TimingConfig, fields: &'a ButterflyFields) -> Self {
        Self {
            dut,
            timing,
            fields,
            state: SeqState::ResetLow,
            edges: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> SeqState {
        self.state
    }

    /// Clock edges driven so far.
    pub fn edges(&self) -> u64 {
        self.edges
    }

    fn expect_state(&self, state: SeqState, action: &'static str) -> Result<(), HarnessError> {
        if self.state != state {
            return Err(HarnessError::Sequencing {
                state: self.state,
                action,
            });
        }
        Ok(())
    }

    fn tick(&mut self) -> Result<(), HarnessError> {
        self.dut.step()?;
        self.edges += 1;
        Ok(())
    }

    /// Asserts reset for `reset_cycles` edges, then releases it.
    pub fn reset(&mut self) -> Result<(), HarnessError> {
        self.expect_state(SeqState::ResetLow, "assert reset")?;
        let (asserted, released) = if self.timing.reset_active_low {
            (0, 1)
        } else {
            (1, 0)
        };

        self.dut.set(&self.fields.reset, asserted)?;
        self.dut.set(&self.fields.enable, 1)?;
        self.dut.set(&self.fields.valid_in, 0)?;
        for _ in 0..self.timing.reset_cycles {
            self.tick()?;
        }
        // Released between edges, never mid-cycle.
        self.dut.set(&self.fields.reset, released)?;
        self.state = SeqState::ResetRelease;
        Ok(())
    }

    /// Sets the stimulus once and raises `valid_in`.
    pub fn apply(&mut self, inputs: &[(&str, i64)]) -> Result<(), HarnessError> {
        self.expect_state(SeqState::ResetRelease, "apply stimulus")?;
        for (field, value) in inputs {
            self.dut.set(field, *value)?;
        }
        self.dut.set(&self.fields.valid_in, 1)?;
        self.state = SeqState::SteadyClocking;
        Ok(())
    }

    /// Clocks to the sample point and reads `outputs` once.
    pub fn sample(&mut self, outputs: &[&str]) -> Result<SampleOutcome, HarnessError> {
        self.expect_state(SeqState::SteadyClocking, "sample")?;
        let waited = match self.timing.sample {
            SampleMode::Fixed => {
                for _ in 0..self.timing.latency {
                    self.tick()?;
                }
                Some(self.timing.latency)
            }
            SampleMode::Handshake => {
                let mut hit = None;
                for cycle in 1..=self.timing.timeout_cycles {
                    self.tick()?;
                    if self.dut.get(&self.fields.valid_out)? != 0 {
                        hit = Some(cycle);
                        break;
                    }
                }
                hit
            }
        };
        self.state = SeqState::Sample;

        let Some(cycles) = waited else {
            tracing::debug!(
                dut = self.dut.name(),
                cycles = self.timing.timeout_cycles,
                "valid output never asserted"
            );
            return Ok(SampleOutcome::TimedOut {
                cycles: self.timing.timeout_cycles,
            });
        };
        let values = outputs
            .iter()
            .map(|field| self.dut.get(field))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(dut = self.dut.name(), cycles, ?values, "sampled outputs");
        Ok(SampleOutcome::Sampled { values, cycles })
    }

    /// Returns from [`SeqState::Sample`] to [`SeqState::ResetLow`].
    pub fn finish(&mut self) -> Result<(), HarnessError> {
        self.expect_state(SeqState::Sample, "finish")?;
        self.state = SeqState::ResetLow;
        Ok(())
    }

    /// Runs one complete vector: reset, apply, sample, finish.
    pub fn run_vector(
        &mut self,
        inputs: &[(&str, i64)],
        outputs: &[&str],
    ) -> Result<SampleOutcome, HarnessError> {
        self.reset()?;
        self.apply(inputs)?;
        let outcome = self.sample(outputs)?;
        self.finish()?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parity_dut::{ButterflyFault, ButterflyUnit};

    fn timing(sample: SampleMode) -> TimingConfig {
        TimingConfig {
            sample,
            ..TimingConfig::default()
        }
    }

    fn stimulus() -> Vec<(&'static str, i64)> {
        vec![
            ("a_re", 1000),
            ("a_im", 0),
            ("b_re", 500),
            ("b_im", 0),
            ("w_re", 32767),
            ("w_im", 0),
        ]
    }

    const OUTPUTS: [&str; 4] = ["out_a_re", "out_a_im", "out_b_re", "out_b_im"];

    #[test]
    fn states_advance_in_order() {
        let mut dut = ButterflyUnit::new(3);
        let timing = timing(SampleMode::Fixed);
        let fields = ButterflyFields::default();
        let mut seq = Sequencer::new(&mut dut, &timing, &fields);
        assert_eq!(seq.state(), SeqState::ResetLow);
        seq.reset().unwrap();
        assert_eq!(seq.state(), SeqState::ResetRelease);
        assert_eq!(seq.edges(), 4);
        seq.apply(&stimulus()).unwrap();
        assert_eq!(seq.state(), SeqState::SteadyClocking);
        let out = seq.sample(&OUTPUTS).unwrap();
        assert_eq!(seq.state(), SeqState::Sample);
        assert_eq!(
            out,
            SampleOutcome::Sampled {
                values: vec![750, 0, 499, 0],
                cycles: 3
            }
        );
        seq.finish().unwrap();
        assert_eq!(seq.state(), SeqState::ResetLow);
        assert_eq!(seq.edges(), 7);
    }

    #[test]
    fn out_of_order_calls_are_rejected() {
        let mut dut = ButterflyUnit::new(3);
        let timing = TimingConfig::default();
        let fields = ButterflyFields::default();
        let mut seq = Sequencer::new(&mut dut, &timing, &fields);
        let err = seq.apply(&stimulus()).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Sequencing {
                state: SeqState::ResetLow,
                ..
            }
        ));
        assert!(seq.sample(&OUTPUTS).is_err());
        assert!(seq.finish().is_err());
    }

    #[test]
    fn handshake_samples_on_valid() {
        let mut dut = ButterflyUnit::new(3);
        let timing = timing(SampleMode::Handshake);
        let fields = ButterflyFields::default();
        let mut seq = Sequencer::new(&mut dut, &timing, &fields);
        let out = seq.run_vector(&stimulus(), &OUTPUTS).unwrap();
        assert_eq!(
            out,
            SampleOutcome::Sampled {
                values: vec![750, 0, 499, 0],
                cycles: 3
            }
        );
    }

    #[test]
    fn handshake_follows_a_longer_pipeline() {
        let mut dut = ButterflyUnit::new(3).with_fault(ButterflyFault::ExtraLatency);
        let timing = timing(SampleMode::Handshake);
        let fields = ButterflyFields::default();
        let mut seq = Sequencer::new(&mut dut, &timing, &fields);
        match seq.run_vector(&stimulus(), &OUTPUTS).unwrap() {
            SampleOutcome::Sampled { values, cycles } => {
                assert_eq!(cycles, 4);
                assert_eq!(values, vec![750, 0, 499, 0]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn fixed_mode_samples_too_early_on_a_longer_pipeline() {
        let mut dut = ButterflyUnit::new(3).with_fault(ButterflyFault::ExtraLatency);
        let timing = timing(SampleMode::Fixed);
        let fields = ButterflyFields::default();
        let mut seq = Sequencer::new(&mut dut, &timing, &fields);
        let out = seq.run_vector(&stimulus(), &OUTPUTS).unwrap();
        assert_eq!(
            out,
            SampleOutcome::Sampled {
                values: vec![0, 0, 0, 0],
                cycles: 3
            }
        );
    }

    #[test]
    fn handshake_times_out() {
        let mut dut = ButterflyUnit::new(3).with_fault(ButterflyFault::NeverValid);
        let timing = TimingConfig {
            timeout_cycles: 10,
            ..TimingConfig::default()
        };
        let fields = ButterflyFields::default();
        let mut seq = Sequencer::new(&mut dut, &timing, &fields);
        let out = seq.run_vector(&stimulus(), &OUTPUTS).unwrap();
        assert_eq!(out, SampleOutcome::TimedOut { cycles: 10 });
        assert_eq!(seq.state(), SeqState::ResetLow);
        assert_eq!(seq.edges(), 14);
    }

    #[test]
    fn reset_isolates_consecutive_vectors() {
        let mut dut = ButterflyUnit::new(3);
        let timing = TimingConfig::default();
        let fields = ButterflyFields::default();
        let mut seq = Sequencer::new(&mut dut, &timing, &fields);
        let first = seq.run_vector(&stimulus(), &OUTPUTS).unwrap();
        let mut other = stimulus();
        other[0].1 = -20000;
        seq.run_vector(&other, &OUTPUTS).unwrap();
        assert_eq!(seq.run_vector(&stimulus(), &OUTPUTS).unwrap(), first);
    }

    #[test]
    fn require_fields_reports_missing_output() {
        let dut = ButterflyUnit::new(3);
        require_fields(&dut, &["a_re", "rst_n"], &["valid_out"]).unwrap();
        let err = require_fields(&dut, &[], &["ready"]).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::MissingField { ref field, direction: "output", .. } if field == "ready"
        ));
    }

    #[test]
    fn require_fields_checks_direction() {
        let dut = ButterflyUnit::new(3);
        let err = require_fields(&dut, &["out_a_re"], &[]).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::MissingField { direction: "input", .. }
        ));
    }

    #[test]
    fn active_high_reset_level() {
        let mut dut = ButterflyUnit::new(1);
        let timing = TimingConfig {
            reset_active_low: false,
            latency: 1,
            reset_cycles: 2,
            sample: SampleMode::Fixed,
            ..TimingConfig::default()
        };
        let fields = ButterflyFields::default();
        let mut seq = Sequencer::new(&mut dut, &timing, &fields);
        seq.reset().unwrap();
        // Released to 0, which the active-low model reads as held in reset.
        drop(seq);
        assert_eq!(dut.get("rst_n").unwrap(), 0);
    }
}
