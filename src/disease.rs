//! The simulated disease: susceptibility gates, the immune outcome they imply,
//! and the fixed timings of incubation, death and recovery.

use std::fmt;

/// Chebyshev radius within which an infectious agent exposes others.
pub const EXPOSURE_RADIUS: i32 = 3;
/// `incubation_day` must exceed this for an incubating agent to turn infectious.
pub const INCUBATION_DAYS: u32 = 3;
/// Infection day on which a fatal case dies (14 days after the first day).
pub const DEATH_DAY: u32 = 14 + 1;
/// Infection day on which a dead body stops transmitting.
pub const INERT_DAY: u32 = 14 + 5 + 1;
/// Infection day on which a recoverable case becomes immune.
pub const RECOVERY_DAY: u32 = 30 + 1;
/// Infection days already counted for agents that start the run infected.
pub const INITIAL_INFECTED_DAYS: u32 = 3;

/// One of the eight susceptibility markers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Gate {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl Gate {
    pub const ALL: [Gate; 8] = [
        Gate::A,
        Gate::B,
        Gate::C,
        Gate::D,
        Gate::E,
        Gate::F,
        Gate::G,
        Gate::H,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Gate::A),
            'B' => Some(Gate::B),
            'C' => Some(Gate::C),
            'D' => Some(Gate::D),
            'E' => Some(Gate::E),
            'F' => Some(Gate::F),
            'G' => Some(Gate::G),
            'H' => Some(Gate::H),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    fn letter(self) -> char {
        (b'A' + self as u8) as char
    }
}

/// The set of gates an agent carries.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Gates(u8);

impl Gates {
    /// Reads a gate string case-insensitively. Characters that are not gate
    /// letters are skipped.
    pub fn parse(gates: &str) -> Self {
        gates
            .chars()
            .filter_map(Gate::from_char)
            .fold(Gates::default(), |acc, gate| acc.with(gate))
    }

    pub fn with(self, gate: Gate) -> Self {
        Gates(self.0 | gate.bit())
    }

    pub fn has(&self, gate: Gate) -> bool {
        self.0 & gate.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn outcome(&self) -> ImmuneOutcome {
        if !self.has(Gate::A) && !self.has(Gate::B) {
            return ImmuneOutcome::Unaffected;
        }

        let total = [Gate::A, Gate::B, Gate::C, Gate::D]
            .into_iter()
            .filter(|gate| self.has(*gate))
            .count();

        if total >= 3 {
            ImmuneOutcome::Fatal
        } else {
            ImmuneOutcome::Recoverable
        }
    }
}

impl fmt::Display for Gates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for gate in Gate::ALL.into_iter().filter(|gate| self.has(*gate)) {
            write!(f, "{}", gate.letter())?;
        }
        Ok(())
    }
}

/// How an agent's infection ends, fixed when the agent is created.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImmuneOutcome {
    /// Can never be exposed or infected.
    Unaffected,
    Recoverable,
    Fatal,
}
