//! Configuration types deserialized from `parity.toml`.
//!
//! Every section carries a serde default, so an empty document yields the
//! same configuration as [`HarnessConfig::default`].

use serde::Deserialize;

/// The top-level harness configuration parsed from `parity.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Fixed-point representation and comparison tolerance.
    pub fixed_point: FixedPointConfig,
    /// Clock/reset cadence and output sampling strategy.
    pub timing: TimingConfig,
    /// Directed and randomized stimulus generation.
    pub stimulus: StimulusConfig,
    /// Dual-port memory geometry, collision policy and port names.
    pub memory: MemoryConfig,
    /// Butterfly port names and extra directed vectors.
    pub butterfly: ButterflyConfig,
}

/// Fixed-point settings shared by the golden model and the comparator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FixedPointConfig {
    /// Scale factor of the Q-format (`2^frac_bits`). Q1.15 uses 32768.
    pub scale: u32,
    /// Operand bit width of the datapath.
    pub width: u32,
    /// Maximum per-component absolute difference, in LSB units.
    pub tolerance: u32,
}

impl FixedPointConfig {
    /// Returns the number of fractional bits implied by `scale`.
    pub fn frac_bits(&self) -> u32 {
        self.scale.trailing_zeros()
    }
}

impl Default for FixedPointConfig {
    fn default() -> Self {
        Self {
            scale: 32768,
            width: 16,
            tolerance: 2,
        }
    }
}

/// How the sequencer decides that outputs are valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleMode {
    /// Poll the DUT's valid output after every edge, with a bounded timeout.
    #[default]
    Handshake,
    /// Advance exactly `latency` edges and sample unconditionally.
    Fixed,
}

/// Clock/reset timing contract of the DUT.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Documented pipeline latency in clock cycles.
    pub latency: u32,
    /// Clock edges driven while reset is asserted. Must exceed `latency`.
    pub reset_cycles: u32,
    /// Whether the reset input is active low (`rst_n`).
    pub reset_active_low: bool,
    /// Output sampling strategy.
    pub sample: SampleMode,
    /// Edges to wait for the valid output before reporting a timeout.
    pub timeout_cycles: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            latency: 3,
            reset_cycles: 4,
            reset_active_low: true,
            sample: SampleMode::Handshake,
            timeout_cycles: 32,
        }
    }
}

/// Stimulus generation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StimulusConfig {
    /// Seed for every randomized stream. Logged with failing runs.
    pub seed: u64,
    /// Number of randomized butterfly vectors.
    pub random_cases: usize,
    /// Inclusive lower bound of randomized operand components.
    pub operand_min: i64,
    /// Inclusive upper bound of randomized operand components.
    pub operand_max: i64,
    /// Whether the built-in directed vectors are part of the run.
    pub include_directed: bool,
}

impl Default for StimulusConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED_0001,
            random_cases: 100,
            operand_min: -32768,
            operand_max: 32767,
            include_directed: true,
        }
    }
}

/// Resolution policy for same-cycle, same-address writes from both ports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// The written word is unknown until rewritten; reads of it are not checked.
    #[default]
    DontCare,
    /// Port A's data is committed.
    PortAWins,
    /// Port B's data is committed.
    PortBWins,
}

/// Dual-port memory settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Number of addressable words.
    pub depth: u32,
    /// Number of ports. Only dual-port memories are supported.
    pub ports: u32,
    /// Data word width in bits.
    pub data_width: u32,
    /// Pattern base for fill-then-verify: address `i` holds `base_pattern + i`.
    pub base_pattern: u64,
    /// Same-address dual-write arbitration.
    pub collision: CollisionPolicy,
    /// Cycles of seeded random dual-port traffic.
    pub random_cycles: usize,
    /// DUT field names.
    pub fields: MemoryFields,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            depth: 1024,
            ports: 2,
            data_width: 32,
            base_pattern: 0xABC0_0000,
            collision: CollisionPolicy::DontCare,
            random_cycles: 256,
            fields: MemoryFields::default(),
        }
    }
}

/// Field names of one memory port.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PortFields {
    /// Write enable input.
    pub we: String,
    /// Address input.
    pub addr: String,
    /// Write data input.
    pub din: String,
    /// Registered read data output.
    pub dout: String,
}

impl PortFields {
    fn with_suffix(suffix: &str) -> Self {
        Self {
            we: format!("we_{suffix}"),
            addr: format!("addr_{suffix}"),
            din: format!("din_{suffix}"),
            dout: format!("dout_{suffix}"),
        }
    }
}

/// Field names of the dual-port memory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoryFields {
    /// Port A names.
    pub port_a: PortFields,
    /// Port B names.
    pub port_b: PortFields,
}

impl Default for MemoryFields {
    fn default() -> Self {
        Self {
            port_a: PortFields::with_suffix("a"),
            port_b: PortFields::with_suffix("b"),
        }
    }
}

/// Butterfly unit settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ButterflyConfig {
    /// DUT field names.
    pub fields: ButterflyFields,
    /// Additional directed vectors appended to the built-in set.
    pub directed: Vec<DirectedVectorSpec>,
}

/// Field names of the butterfly unit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ButterflyFields {
    /// Reset input.
    pub reset: String,
    /// Clock enable input.
    pub enable: String,
    /// Input valid strobe.
    pub valid_in: String,
    /// Output valid strobe, polled in handshake mode.
    pub valid_out: String,
    /// Operand A, real part.
    pub a_re: String,
    /// Operand A, imaginary part.
    pub a_im: String,
    /// Operand B, real part.
    pub b_re: String,
    /// Operand B, imaginary part.
    pub b_im: String,
    /// Twiddle, real part.
    pub w_re: String,
    /// Twiddle, imaginary part.
    pub w_im: String,
    /// Sum output, real part.
    pub out_a_re: String,
    /// Sum output, imaginary part.
    pub out_a_im: String,
    /// Rotated difference output, real part.
    pub out_b_re: String,
    /// Rotated difference output, imaginary part.
    pub out_b_im: String,
}

impl Default for ButterflyFields {
    fn default() -> Self {
        Self {
            reset: "rst_n".into(),
            enable: "en".into(),
            valid_in: "valid_in".into(),
            valid_out: "valid_out".into(),
            a_re: "a_re".into(),
            a_im: "a_im".into(),
            b_re: "b_re".into(),
            b_im: "b_im".into(),
            w_re: "w_re".into(),
            w_im: "w_im".into(),
            out_a_re: "out_a_re".into(),
            out_a_im: "out_a_im".into(),
            out_b_re: "out_b_re".into(),
            out_b_im: "out_b_im".into(),
        }
    }
}

impl ButterflyFields {
    /// Operand inputs in `[a_re, a_im, b_re, b_im, w_re, w_im]` order.
    pub fn operand_inputs(&self) -> [&str; 6] {
        [
            &self.a_re, &self.a_im, &self.b_re, &self.b_im, &self.w_re, &self.w_im,
        ]
    }

    /// Data outputs in `[out_a_re, out_a_im, out_b_re, out_b_im]` order.
    pub fn data_outputs(&self) -> [&str; 4] {
        [
            &self.out_a_re,
            &self.out_a_im,
            &self.out_b_re,
            &self.out_b_im,
        ]
    }
}

/// A directed butterfly vector declared in the configuration file.
///
/// The twiddle is given either as a real-valued `(cos, sin)` pair via `w`,
/// converted with the harness rounding rule, or as raw fixed-point integers
/// via `w_raw`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectedVectorSpec {
    /// Case name used in the report.
    pub name: String,
    /// Operand A as `[re, im]`.
    pub a: [i64; 2],
    /// Operand B as `[re, im]`.
    pub b: [i64; 2],
    /// Real-valued twiddle `[cos, sin]`.
    #[serde(default)]
    pub w: Option<[f64; 2]>,
    /// Raw fixed-point twiddle `[re, im]`.
    #[serde(default)]
    pub w_raw: Option<[i64; 2]>,
    /// Explicit expected sum output, overriding the golden model.
    #[serde(default)]
    pub expect_a: Option<[i64; 2]>,
    /// Explicit expected difference output, overriding the golden model.
    #[serde(default)]
    pub expect_b: Option<[i64; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frac_bits_from_scale() {
        let fp = FixedPointConfig::default();
        assert_eq!(fp.frac_bits(), 15);
        let q7 = FixedPointConfig {
            scale: 128,
            ..FixedPointConfig::default()
        };
        assert_eq!(q7.frac_bits(), 7);
    }

    #[test]
    fn default_port_fields() {
        let fields = MemoryFields::default();
        assert_eq!(fields.port_a.we, "we_a");
        assert_eq!(fields.port_a.dout, "dout_a");
        assert_eq!(fields.port_b.addr, "addr_b");
        assert_eq!(fields.port_b.din, "din_b");
    }

    #[test]
    fn butterfly_field_order() {
        let fields = ButterflyFields::default();
        assert_eq!(
            fields.operand_inputs(),
            ["a_re", "a_im", "b_re", "b_im", "w_re", "w_im"]
        );
        assert_eq!(
            fields.data_outputs(),
            ["out_a_re", "out_a_im", "out_b_re", "out_b_im"]
        );
    }
}
