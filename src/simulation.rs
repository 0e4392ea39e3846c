use crate::agent::{Agent, Transition};
use crate::board::{Board, MAX_SIZE};
use crate::exposure::{resolve_indexed, Exposure};
use crate::geometry::{Position, Rect};
use crate::quadtree::Quadtree;
use crate::report::Report;
use crate::SimError;
use std::collections::HashSet;

/// Receives one board per simulated day, in day order.
pub trait SnapshotSink {
    fn snapshot(&mut self, day: usize, board: &Board) -> Result<(), SimError>;
}

impl SnapshotSink for Vec<Board> {
    fn snapshot(&mut self, _day: usize, board: &Board) -> Result<(), SimError> {
        self.push(board.clone());
        Ok(())
    }
}

/// What happened during one simulated day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySummary {
    pub day: usize,
    /// Health transitions as `(entity id, transition)`, in population order.
    pub transitions: Vec<(i64, Transition)>,
    pub exposures: Vec<Exposure>,
}

/// Owns the population and drives it one day at a time.
pub struct Simulation {
    size: i32,
    days: usize,
    day: usize,
    agents: Vec<Agent>,
    index: Quadtree,
}

impl Simulation {
    /// Checks that the grid size is usable, that ids are unique and that every
    /// trajectory position lies on the `size` by `size` grid.
    pub fn new(size: i32, days: usize, agents: Vec<Agent>) -> Result<Self, SimError> {
        if !(1..=MAX_SIZE).contains(&size) {
            return Err(SimError::InvalidSize { size });
        }

        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.id()) {
                return Err(SimError::DuplicateIdentity { id: agent.id() });
            }

            for (day, pos) in agent.trajectory().iter().enumerate() {
                if !(1..=size).contains(&pos.x) || !(1..=size).contains(&pos.y) {
                    return Err(SimError::OutOfBounds {
                        id: agent.id(),
                        day,
                        x: pos.x,
                        y: pos.y,
                        size,
                    });
                }
            }
        }

        let bounds = Rect::new(Position::new(1, 1), Position::new(size, size));
        let positions: Vec<Position> = agents.iter().map(|agent| agent.pos()).collect();
        let index = Quadtree::new_with_positions(bounds, &positions);

        Ok(Simulation {
            size,
            days,
            day: 0,
            agents,
            index,
        })
    }

    /// The last day completed, 0 before the first.
    pub fn day(&self) -> usize {
        self.day
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn is_finished(&self) -> bool {
        self.day >= self.days
    }

    /// Runs every remaining day and returns the final report.
    pub fn run<S: SnapshotSink>(&mut self, sink: &mut S) -> Result<Report, SimError> {
        while !self.is_finished() {
            self.step_day(sink)?;
        }

        let report = self.report();
        log::info!(
            "finished {} days: {} normal, {} infected, {} dead, {} recovered",
            self.day,
            report.tally.normal,
            report.tally.infected,
            report.tally.dead,
            report.tally.recovered
        );
        Ok(report)
    }

    /// Simulates the next day: advance health, move, emit the snapshot, then
    /// resolve exposures for tomorrow.
    pub fn step_day<S: SnapshotSink>(&mut self, sink: &mut S) -> Result<DaySummary, SimError> {
        let day = self.day + 1;
        log::debug!("day {day}");

        // Nobody changes unless everyone alive tomorrow has somewhere to go
        if let Some(agent) = self
            .agents
            .iter()
            .find(|agent| agent.health_tomorrow().is_alive() && agent.trajectory().len() <= day)
        {
            return Err(SimError::TrajectoryExhausted {
                id: agent.id(),
                day,
            });
        }

        let transitions = self.advance_health();
        self.move_agents(day)?;

        let board = Board::rasterize(self.size, &self.agents);
        sink.snapshot(day, &board)?;

        let exposures = resolve_indexed(&mut self.agents, &self.index);
        self.day = day;

        Ok(DaySummary {
            day,
            transitions,
            exposures,
        })
    }

    fn advance_health(&mut self) -> Vec<(i64, Transition)> {
        let mut transitions = Vec::new();

        for agent in self.agents.iter_mut() {
            if let Some(transition) = agent.step() {
                log::trace!(
                    "entity {}: {:?}, now {}",
                    agent.id(),
                    transition,
                    agent.health()
                );
                transitions.push((agent.id(), transition));
            }
        }

        transitions
    }

    fn move_agents(&mut self, day: usize) -> Result<(), SimError> {
        for (item, agent) in self.agents.iter_mut().enumerate() {
            agent.move_to_day(day)?;
            let pos = agent.pos();
            self.index
                .move_item(item, pos)
                .ok_or(SimError::OutOfBounds {
                    id: agent.id(),
                    day,
                    x: pos.x,
                    y: pos.y,
                    size: self.size,
                })?;
        }
        self.index.clean_tree();

        Ok(())
    }

    pub fn report(&self) -> Report {
        Report::new(&self.agents)
    }
}
