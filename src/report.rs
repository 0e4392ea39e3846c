use crate::agent::Agent;
use crate::geometry::Position;
use std::fmt;

/// Final status of one agent. Dead takes precedence, then infected, then
/// recovered.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AgentStatus {
    Normal,
    Infected,
    Immune,
    Dead,
}

impl AgentStatus {
    pub fn of(agent: &Agent) -> Self {
        let health = agent.health();
        if !health.is_alive() {
            AgentStatus::Dead
        } else if health.is_infected() {
            AgentStatus::Infected
        } else if health.is_recovered() {
            AgentStatus::Immune
        } else {
            AgentStatus::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgentStatus::Normal => "normal",
            AgentStatus::Infected => "infected",
            AgentStatus::Immune => "immune",
            AgentStatus::Dead => "dead",
        }
    }
}

/// Counts of agents per final status. Every agent lands in exactly one bucket.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub normal: usize,
    pub infected: usize,
    pub dead: usize,
    pub recovered: usize,
}

impl Tally {
    fn count(&mut self, status: AgentStatus) {
        match status {
            AgentStatus::Normal => self.normal += 1,
            AgentStatus::Infected => self.infected += 1,
            AgentStatus::Immune => self.recovered += 1,
            AgentStatus::Dead => self.dead += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.normal + self.infected + self.dead + self.recovered
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentLine {
    pub id: i64,
    pub pos: Position,
    pub status: AgentStatus,
}

/// The end-of-run population report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub tally: Tally,
    pub agents: Vec<AgentLine>,
}

impl Report {
    pub fn new(agents: &[Agent]) -> Self {
        let mut tally = Tally::default();
        let lines = agents
            .iter()
            .map(|agent| {
                let status = AgentStatus::of(agent);
                tally.count(status);
                AgentLine {
                    id: agent.id(),
                    pos: agent.pos(),
                    status,
                }
            })
            .collect();

        Report {
            tally,
            agents: lines,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<11}: {}", "Normal", self.tally.normal)?;
        writeln!(f, "{:<11}: {}", "Infected", self.tally.infected)?;
        writeln!(f, "{:<11}: {}", "Dead", self.tally.dead)?;
        writeln!(f, "{:<11}: {}", "Recovered", self.tally.recovered)?;
        for line in &self.agents {
            writeln!(f, "entity {} {} {}", line.id, line.pos, line.status.label())?;
        }
        Ok(())
    }
}
