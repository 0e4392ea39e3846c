//! Day-by-day simulation of an infection spreading through agents that walk
//! fixed trajectories on a bounded grid.

pub mod agent;
pub mod board;
pub mod disease;
pub mod error;
pub mod exposure;
pub mod generate;
pub mod geometry;
pub mod logging;
pub mod output;
pub mod quadtree;
pub mod report;
pub mod scenario;
pub mod simulation;

pub use agent::{Agent, Health, Transition};
pub use board::{Board, Cell};
pub use disease::{Gate, Gates, ImmuneOutcome};
pub use error::SimError;
pub use geometry::{Position, Rect, Vec2D};
pub use quadtree::Quadtree;
pub use report::{AgentStatus, Report, Tally};
pub use scenario::Scenario;
pub use simulation::{DaySummary, Simulation, SnapshotSink};

// ANSI escape codes for colours in the terminal
pub const RESET: &str = "\x1b[0m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
