//! The test driver: runs suites against a DUT and aggregates verdicts.

use std::fmt;

use parity_config::{validate_config, HarnessConfig, PortFields, SampleMode};
use parity_dut::DutAdapter;
use parity_model::{Expected, MemoryModel, Port, QFormat};
use rayon::prelude::*;
use serde::Serialize;

use crate::compare::{compare, compare_exact, ComparisonResult, FieldComparison};
use crate::error::HarnessError;
use crate::scenario::{memory_scenarios, MemoryScenario};
use crate::sequencer::{require_fields, SampleOutcome, Sequencer};
use crate::stimulus::{configured_vectors, directed_vectors, random_vectors, TestVector};

/// Which group of cases a result belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Suite {
    /// Butterfly arithmetic vectors.
    Butterfly,
    /// Dual-port memory scenarios.
    Memory,
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suite::Butterfly => write!(f, "butterfly"),
            Suite::Memory => write!(f, "memory"),
        }
    }
}

/// Per-case verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseOutcome {
    /// Every compared value matched.
    Pass,
    /// At least one value differed beyond tolerance.
    Mismatch,
    /// The DUT never signalled valid output.
    Timeout {
        /// Edges waited.
        cycles: u32,
    },
}

impl CaseOutcome {
    /// Whether the case passed.
    pub fn is_pass(self) -> bool {
        self == CaseOutcome::Pass
    }
}

/// Result of one case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CaseResult {
    /// Case name.
    pub name: String,
    /// Owning suite.
    pub suite: Suite,
    /// Verdict.
    pub outcome: CaseOutcome,
    /// Human-readable stimulus summary.
    pub stimulus: String,
    /// Comparison detail; absent for timeouts.
    pub comparison: Option<ComparisonResult>,
}

/// Aggregate result of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Seed of every randomized stream in the run.
    pub seed: u64,
    /// Results in execution order.
    pub cases: Vec<CaseResult>,
}

impl RunSummary {
    /// Creates an empty summary.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            cases: Vec::new(),
        }
    }

    /// Number of passing cases.
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.outcome.is_pass()).count()
    }

    /// Number of failing cases.
    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    /// A run passes only if every case passes.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Process exit status: 0 if every case passed, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// Builds stimulus from a validated configuration and runs it.
#[derive(Clone, Debug)]
pub struct Harness {
    config: HarnessConfig,
    format: QFormat,
}

impl Harness {
    /// Validates `config` and builds a harness.
    pub fn new(config: HarnessConfig) -> Result<Self, HarnessError> {
        validate_config(&config)?;
        let format = QFormat::from_scale(config.fixed_point.scale).ok_or_else(|| {
            parity_config::ConfigError::Invalid {
                section: "fixed_point",
                reason: format!("unsupported scale {}", config.fixed_point.scale),
            }
        })?;
        Ok(Self { config, format })
    }

    /// The configuration in use.
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// The fixed-point format derived from the configured scale.
    pub fn format(&self) -> QFormat {
        self.format
    }

    /// Directed, configured and random vectors, in that order.
    pub fn butterfly_vectors(&self) -> Vec<TestVector> {
        let mut vectors = Vec::new();
        if self.config.stimulus.include_directed {
            vectors.extend(directed_vectors(self.format));
        }
        vectors.extend(configured_vectors(&self.config.butterfly.directed, self.format));
        vectors.extend(random_vectors(&self.config.stimulus, self.format));
        vectors
    }

    /// Memory scenarios for the configured geometry.
    pub fn memory_scenarios(&self) -> Vec<MemoryScenario> {
        memory_scenarios(&self.config.memory, self.config.stimulus.seed)
    }

    /// Fails with [`HarnessError::MissingField`] unless the DUT exposes
    /// every butterfly field the configured sampling mode uses.
    pub fn check_butterfly_fields<D: DutAdapter + ?Sized>(
        &self,
        dut: &D,
    ) -> Result<(), HarnessError> {
        let f = &self.config.butterfly.fields;
        let mut inputs = vec![f.reset.as_str(), f.enable.as_str(), f.valid_in.as_str()];
        inputs.extend(f.operand_inputs());
        let mut outputs = f.data_outputs().to_vec();
        if self.config.timing.sample == SampleMode::Handshake {
            outputs.push(f.valid_out.as_str());
        }
        require_fields(dut, &inputs, &outputs)
    }

    /// Fails with [`HarnessError::MissingField`] unless the DUT exposes
    /// both memory ports.
    pub fn check_memory_fields<D: DutAdapter + ?Sized>(
        &self,
        dut: &D,
    ) -> Result<(), HarnessError> {
        let fields = &self.config.memory.fields;
        for port in [&fields.port_a, &fields.port_b] {
            require_fields(
                dut,
                &[port.we.as_str(), port.addr.as_str(), port.din.as_str()],
                &[port.dout.as_str()],
            )?;
        }
        Ok(())
    }

    /// Runs one butterfly vector from reset to sample.
    pub fn run_butterfly_vector<D: DutAdapter + ?Sized>(
        &self,
        dut: &mut D,
        vector: &TestVector,
    ) -> Result<CaseResult, HarnessError> {
        let fields = &self.config.butterfly.fields;
        let inputs: Vec<(&str, i64)> = fields
            .operand_inputs()
            .into_iter()
            .zip(vector.operands())
            .collect();
        let outputs = fields.data_outputs();

        let mut seq = Sequencer::new(dut, &self.config.timing, fields);
        let sampled = seq.run_vector(&inputs, &outputs)?;

        let stimulus = format!("A={} B={} W={}", vector.a, vector.b, vector.w);
        let (outcome, comparison) = match sampled {
            SampleOutcome::Sampled { values, .. } => {
                let expected = vector.expected(self.format).to_fields();
                let result = compare(
                    &vector.name,
                    &outputs,
                    &values,
                    &expected,
                    u64::from(self.config.fixed_point.tolerance),
                );
                let outcome = if result.passed {
                    CaseOutcome::Pass
                } else {
                    CaseOutcome::Mismatch
                };
                (outcome, Some(result))
            }
            SampleOutcome::TimedOut { cycles } => (CaseOutcome::Timeout { cycles }, None),
        };

        tracing::debug!(case = %vector.name, ?outcome, "butterfly vector");
        if !outcome.is_pass() {
            tracing::warn!(
                case = %vector.name,
                seed = self.config.stimulus.seed,
                %stimulus,
                ?outcome,
                "butterfly case failed"
            );
        }
        Ok(CaseResult {
            name: vector.name.clone(),
            suite: Suite::Butterfly,
            outcome,
            stimulus,
            comparison,
        })
    }

    /// Runs every vector on one DUT, in order.
    pub fn run_butterfly<D: DutAdapter + ?Sized>(
        &self,
        dut: &mut D,
        vectors: &[TestVector],
    ) -> Result<Vec<CaseResult>, HarnessError> {
        self.check_butterfly_fields(&*dut)?;
        tracing::info!(
            dut = dut.name(),
            vectors = vectors.len(),
            seed = self.config.stimulus.seed,
            "running butterfly suite"
        );
        vectors
            .iter()
            .map(|v| self.run_butterfly_vector(&mut *dut, v))
            .collect()
    }

    /// Runs vectors across rayon workers. Each worker builds its own DUT
    /// with `factory` and owns it exclusively. Results keep vector order.
    pub fn run_butterfly_parallel<D, F>(
        &self,
        factory: F,
        vectors: &[TestVector],
    ) -> Result<Vec<CaseResult>, HarnessError>
    where
        D: DutAdapter,
        F: Fn() -> D + Sync,
    {
        if vectors.is_empty() {
            return Ok(Vec::new());
        }
        let chunk = vectors.len().div_ceil(rayon::current_num_threads()).max(1);
        tracing::info!(
            vectors = vectors.len(),
            chunk,
            seed = self.config.stimulus.seed,
            "running butterfly suite in parallel"
        );
        let chunks: Vec<Vec<CaseResult>> = vectors
            .par_chunks(chunk)
            .map(|part| {
                let mut dut = factory();
                self.check_butterfly_fields(&dut)?;
                part.iter()
                    .map(|v| self.run_butterfly_vector(&mut dut, v))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<_, _>>()?;
        Ok(chunks.into_iter().flatten().collect())
    }

    /// Replays one scenario on the DUT and checks every read with an exact
    /// expectation. Don't-care reads are not compared.
    pub fn run_memory_scenario<D: DutAdapter + ?Sized>(
        &self,
        dut: &mut D,
        scenario: &MemoryScenario,
    ) -> Result<CaseResult, HarnessError> {
        let mem = &self.config.memory;
        let table = MemoryModel::new(mem.depth, mem.data_width, mem.collision)
            .expected_reads(&scenario.events)?;

        let mut per_cycle = vec![[None; 2]; scenario.cycles() as usize];
        for event in &scenario.events {
            per_cycle[event.cycle as usize][event.port.index()] = Some(*event);
        }

        let ports: [&PortFields; 2] = [&mem.fields.port_a, &mem.fields.port_b];
        let mut observations = Vec::new();
        let mut dont_care = 0usize;
        for (cycle, events) in per_cycle.iter().enumerate() {
            for (fields, event) in ports.iter().zip(events) {
                let (we, addr, data) = event
                    .map(|e| (i64::from(e.write_enable), i64::from(e.addr), e.data as i64))
                    .unwrap_or((0, 0, 0));
                dut.set(&fields.we, we)?;
                dut.set(&fields.addr, addr)?;
                dut.set(&fields.din, data)?;
            }
            dut.step()?;

            let cycle = cycle as u64;
            for (port, fields) in Port::ALL.into_iter().zip(ports) {
                match table.get(port, cycle) {
                    Some(Expected::Exact(word)) => {
                        let actual = dut.get(&fields.dout)?;
                        let addr = events[port.index()].map_or(0, |e| e.addr);
                        observations.push(FieldComparison::new(
                            format!("{}@cycle {cycle} addr {addr}", fields.dout),
                            word as i64,
                            actual,
                        ));
                    }
                    Some(Expected::DontCare(_)) => dont_care += 1,
                    None => {}
                }
            }
        }

        let result = compare_exact(&scenario.name, observations);
        let outcome = if result.passed {
            CaseOutcome::Pass
        } else {
            CaseOutcome::Mismatch
        };
        let stimulus = format!(
            "{} events over {} cycles, {} exact reads, {} don't-care",
            scenario.events.len(),
            scenario.cycles(),
            result.checked,
            dont_care
        );
        tracing::debug!(case = %scenario.name, ?outcome, %stimulus, "memory scenario");
        if !outcome.is_pass() {
            tracing::warn!(
                case = %scenario.name,
                seed = self.config.stimulus.seed,
                mismatches = result.fields.len(),
                "memory case failed"
            );
        }
        Ok(CaseResult {
            name: scenario.name.clone(),
            suite: Suite::Memory,
            outcome,
            stimulus,
            comparison: Some(result),
        })
    }

    /// Runs every scenario on one DUT, in order.
    pub fn run_memory<D: DutAdapter + ?Sized>(
        &self,
        dut: &mut D,
        scenarios: &[MemoryScenario],
    ) -> Result<Vec<CaseResult>, HarnessError> {
        self.check_memory_fields(&*dut)?;
        tracing::info!(
            dut = dut.name(),
            scenarios = scenarios.len(),
            depth = self.config.memory.depth,
            "running memory suite"
        );
        scenarios
            .iter()
            .map(|s| self.run_memory_scenario(&mut *dut, s))
            .collect()
    }
}
