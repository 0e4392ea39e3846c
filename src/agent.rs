use crate::disease::{
    Gates, ImmuneOutcome, DEATH_DAY, EXPOSURE_RADIUS, INCUBATION_DAYS, INERT_DAY,
    INITIAL_INFECTED_DAYS, RECOVERY_DAY,
};
use crate::geometry::Position;
use crate::SimError;
use std::fmt;

/// The health of an agent. Day counters live inside the states that use them,
/// so an agent can never be incubating and infected at once and the terminal
/// states carry no counters at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Health {
    Susceptible,
    /// Exposed and waiting to turn infectious. `infected_day` already counts
    /// these days and carries over into `Infected`.
    Incubating {
        incubation_day: u32,
        infected_day: u32,
    },
    /// Alive and transmitting.
    Infected { infected_day: u32 },
    /// A fatal case that has died but still transmits.
    DeadInfectious { infected_day: u32 },
    /// A fatal case that no longer transmits. Absorbing.
    DeadInert,
    /// Permanently immune. Absorbing.
    Recovered,
}

impl Health {
    pub fn is_alive(&self) -> bool {
        !matches!(self, Health::DeadInfectious { .. } | Health::DeadInert)
    }

    /// Whether the agent transmits, alive or not.
    pub fn is_infected(&self) -> bool {
        matches!(self, Health::Infected { .. } | Health::DeadInfectious { .. })
    }

    pub fn is_incubating(&self) -> bool {
        matches!(self, Health::Incubating { .. })
    }

    pub fn is_recovered(&self) -> bool {
        matches!(self, Health::Recovered)
    }

    pub fn is_susceptible(&self) -> bool {
        matches!(self, Health::Susceptible)
    }

    pub fn infected_day(&self) -> u32 {
        match *self {
            Health::Incubating { infected_day, .. }
            | Health::Infected { infected_day }
            | Health::DeadInfectious { infected_day } => infected_day,
            _ => 0,
        }
    }

    pub fn incubation_day(&self) -> u32 {
        match *self {
            Health::Incubating { incubation_day, .. } => incubation_day,
            _ => 0,
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Health::Susceptible => write!(f, "susceptible"),
            Health::Incubating { incubation_day, .. } => write!(f, "incubating({incubation_day})"),
            Health::Infected { infected_day } => write!(f, "infected({infected_day})"),
            Health::DeadInfectious { infected_day } => {
                write!(f, "dead-infectious({infected_day})")
            }
            Health::DeadInert => write!(f, "dead"),
            Health::Recovered => write!(f, "recovered"),
        }
    }
}

/// A change of health worth reporting, as returned by `Agent::step`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Incubation ended and the agent became infectious.
    Onset,
    Death,
    /// The body stopped transmitting.
    Inert,
    Recovery,
}

/// Each agent is a distinct entity that gets simulated. Its identity, immune
/// outcome and trajectory are fixed at construction; only health and the
/// current position change during a run.
#[derive(Debug, Clone)]
pub struct Agent {
    id: i64,
    outcome: ImmuneOutcome,
    /// Day 0 is the starting position, day d the position after the d-th move.
    trajectory: Vec<Position>,
    pos: Position,
    health: Health,
}

impl Agent {
    /// Builds an agent from its scenario entry. The trajectory must contain at
    /// least the starting position. An `infected` flag on an agent whose gates
    /// make it unaffected is dropped.
    pub fn new(
        id: i64,
        gates: Gates,
        trajectory: Vec<Position>,
        infected: bool,
    ) -> Result<Self, SimError> {
        let pos = *trajectory
            .first()
            .ok_or(SimError::TrajectoryExhausted { id, day: 0 })?;
        let outcome = gates.outcome();

        let health = if infected && outcome != ImmuneOutcome::Unaffected {
            Health::Infected {
                infected_day: INITIAL_INFECTED_DAYS,
            }
        } else {
            if infected {
                log::warn!("entity {id} has gates '{gates}' and cannot be infected; ignoring flag");
            }
            Health::Susceptible
        };

        Ok(Agent {
            id,
            outcome,
            trajectory,
            pos,
            health,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn outcome(&self) -> ImmuneOutcome {
        self.outcome
    }

    pub fn trajectory(&self) -> &[Position] {
        &self.trajectory
    }

    pub fn pos(&self) -> Position {
        self.pos
    }

    pub fn health(&self) -> Health {
        self.health
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    /// Advances the health state by exactly one day.
    pub fn step(&mut self) -> Option<Transition> {
        let (next, transition) = self.next_health();
        self.health = next;
        transition
    }

    /// The health state one `step` from now, without taking it.
    pub fn health_tomorrow(&self) -> Health {
        self.next_health().0
    }

    fn next_health(&self) -> (Health, Option<Transition>) {
        match self.health {
            Health::Infected { infected_day } | Health::DeadInfectious { infected_day } => {
                self.advance_infection(infected_day + 1)
            }
            Health::Incubating {
                incubation_day,
                infected_day,
            } => {
                let incubation_day = incubation_day + 1;
                let infected_day = infected_day + 1;
                if incubation_day > INCUBATION_DAYS {
                    (Health::Infected { infected_day }, Some(Transition::Onset))
                } else {
                    (
                        Health::Incubating {
                            incubation_day,
                            infected_day,
                        },
                        None,
                    )
                }
            }
            Health::Susceptible | Health::DeadInert | Health::Recovered => (self.health, None),
        }
    }

    fn advance_infection(&self, infected_day: u32) -> (Health, Option<Transition>) {
        let alive = self.health.is_alive();
        let keep = if alive {
            Health::Infected { infected_day }
        } else {
            Health::DeadInfectious { infected_day }
        };

        match self.outcome {
            ImmuneOutcome::Fatal if infected_day == DEATH_DAY => (
                Health::DeadInfectious { infected_day },
                alive.then_some(Transition::Death),
            ),
            ImmuneOutcome::Fatal if infected_day == INERT_DAY => {
                (Health::DeadInert, Some(Transition::Inert))
            }
            ImmuneOutcome::Recoverable if infected_day == RECOVERY_DAY => {
                (Health::Recovered, Some(Transition::Recovery))
            }
            _ => (keep, None),
        }
    }

    /// Moves to the trajectory position for `day`. Dead agents stay where
    /// they are and never look at their trajectory.
    pub fn move_to_day(&mut self, day: usize) -> Result<(), SimError> {
        if !self.is_alive() {
            return Ok(());
        }

        self.pos = *self
            .trajectory
            .get(day)
            .ok_or(SimError::TrajectoryExhausted { id: self.id, day })?;
        Ok(())
    }

    /// Whether this agent would expose `target` right now.
    pub fn can_expose(&self, target: &Agent) -> bool {
        self.id != target.id
            && self.health.is_infected()
            && target.can_be_exposed()
            && self.pos.is_within(target.pos, EXPOSURE_RADIUS)
    }

    pub fn can_be_exposed(&self) -> bool {
        self.outcome != ImmuneOutcome::Unaffected && self.health.is_susceptible()
    }

    /// Starts incubation. Returns false, changing nothing, when the agent is
    /// not currently exposable.
    pub fn expose(&mut self) -> bool {
        if !self.can_be_exposed() {
            return false;
        }

        self.health = Health::Incubating {
            incubation_day: 0,
            infected_day: 0,
        };
        true
    }
}
