//! Reading and writing scenario files.
//!
//! A scenario is a line-oriented list of directives:
//!
//! ```text
//! size 10
//! turn_count 3
//! entity 1 AB 5x5 infected
//! entity 2 ABC 5x6
//! turn 1 5x5 6x6
//! turn 2 5x6 6x7
//! turn 3 5x7 6x8
//! ```
//!
//! Each `turn` line carries one position per entity declared so far, in
//! declaration order.

use crate::agent::Agent;
use crate::disease::Gates;
use crate::geometry::Position;
use crate::simulation::Simulation;
use crate::SimError;
use std::fmt;
use std::str::FromStr;

/// One `entity` directive plus the positions later `turn` lines gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySpec {
    pub id: i64,
    pub gates: Gates,
    pub infected: bool,
    /// Starting position followed by one position per turn.
    pub trajectory: Vec<Position>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scenario {
    pub size: i32,
    pub turn_count: usize,
    pub entities: Vec<EntitySpec>,
}

impl Scenario {
    /// Number of `turn` lines that were read.
    pub fn turns_given(&self) -> usize {
        self.entities
            .iter()
            .map(|entity| entity.trajectory.len().saturating_sub(1))
            .min()
            .unwrap_or(0)
    }

    /// Builds the population and hands it to a new simulation.
    pub fn into_simulation(self) -> Result<Simulation, SimError> {
        let agents = self
            .entities
            .into_iter()
            .map(|entity| Agent::new(entity.id, entity.gates, entity.trajectory, entity.infected))
            .collect::<Result<Vec<_>, _>>()?;

        Simulation::new(self.size, self.turn_count, agents)
    }
}

impl FromStr for Scenario {
    type Err = SimError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut scenario = Scenario::default();
        let mut turns = 0;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let Some((directive, args)) = tokens.split_first() else {
                continue;
            };

            match *directive {
                "size" => scenario.size = parse_number(line_no, "size", args)?,
                "turn_count" => scenario.turn_count = parse_number(line_no, "turn_count", args)?,
                "entity" => scenario.entities.push(parse_entity(line_no, args)?),
                "turn" => {
                    let Some((number, positions)) = args.split_first() else {
                        return Err(SimError::parse(line_no, "turn without a turn number"));
                    };
                    turns += 1;
                    if number.parse::<usize>().ok() != Some(turns) {
                        log::debug!("line {line_no}: turn '{number}' read as turn {turns}");
                    }

                    if positions.len() != scenario.entities.len() {
                        return Err(SimError::parse(
                            line_no,
                            format!(
                                "turn has {} positions for {} entities",
                                positions.len(),
                                scenario.entities.len()
                            ),
                        ));
                    }

                    for (entity, token) in scenario.entities.iter_mut().zip(positions) {
                        entity.trajectory.push(parse_position(line_no, token)?);
                    }
                }
                other => {
                    return Err(SimError::parse(
                        line_no,
                        format!("unknown directive '{other}'"),
                    ))
                }
            }
        }

        log::info!(
            "loaded scenario: size {}, {} turns, {} entities",
            scenario.size,
            scenario.turn_count,
            scenario.entities.len()
        );
        Ok(scenario)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "size {}", self.size)?;
        writeln!(f, "turn_count {}", self.turn_count)?;

        for entity in &self.entities {
            let start = entity.trajectory.first().copied().unwrap_or(Position::new_zero());
            if entity.gates.is_empty() {
                write!(f, "entity {} - {}", entity.id, start)?;
            } else {
                write!(f, "entity {} {} {}", entity.id, entity.gates, start)?;
            }
            if entity.infected {
                write!(f, " infected")?;
            }
            writeln!(f)?;
        }

        for turn in 1..=self.turns_given() {
            write!(f, "turn {turn}")?;
            for entity in &self.entities {
                write!(f, " {}", entity.trajectory[turn])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

fn parse_number<T: FromStr>(line: usize, directive: &str, args: &[&str]) -> Result<T, SimError> {
    match args {
        [value] => value
            .parse()
            .map_err(|_| SimError::parse(line, format!("{directive} needs a number, got '{value}'"))),
        _ => Err(SimError::parse(
            line,
            format!("{directive} takes exactly one value"),
        )),
    }
}

fn parse_entity(line: usize, args: &[&str]) -> Result<EntitySpec, SimError> {
    let (id, gates, pos, infected) = match args {
        [id, gates, pos] => (id, gates, pos, false),
        [id, gates, pos, "infected"] => (id, gates, pos, true),
        [_, _, _, flag] => {
            return Err(SimError::parse(line, format!("unknown entity flag '{flag}'")))
        }
        _ => {
            return Err(SimError::parse(
                line,
                "expected 'entity ID GATES XxY [infected]'",
            ))
        }
    };

    let id = id
        .parse()
        .map_err(|_| SimError::parse(line, format!("bad entity id '{id}'")))?;

    Ok(EntitySpec {
        id,
        gates: Gates::parse(gates),
        infected,
        trajectory: vec![parse_position(line, pos)?],
    })
}

/// Reads `"12x7"` as x = 12, y = 7.
pub fn parse_position(line: usize, token: &str) -> Result<Position, SimError> {
    let bad = || SimError::parse(line, format!("bad position '{token}'"));
    let (x, y) = token.split_once(['x', 'X']).ok_or_else(bad)?;
    Ok(Position::new(
        x.parse().map_err(|_| bad())?,
        y.parse().map_err(|_| bad())?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disease::ImmuneOutcome;

    const SCENARIO: &str = "\
size 10
turn_count 2
entity 1 AB 5x5 infected
entity 2 abcd 5x6

turn 1 5x5 6x6
turn 2 4x5 7x6
";

    #[test]
    fn test_parse_scenario() {
        let scenario: Scenario = SCENARIO.parse().unwrap();
        assert_eq!(scenario.size, 10);
        assert_eq!(scenario.turn_count, 2);
        assert_eq!(scenario.turns_given(), 2);

        let first = &scenario.entities[0];
        assert!(first.infected);
        assert_eq!(first.gates.outcome(), ImmuneOutcome::Recoverable);
        assert_eq!(
            first.trajectory,
            vec![Position::new(5, 5), Position::new(5, 5), Position::new(4, 5)]
        );

        let second = &scenario.entities[1];
        assert!(!second.infected);
        assert_eq!(second.gates.outcome(), ImmuneOutcome::Fatal);
        assert_eq!(second.trajectory[2], Position::new(7, 6));
    }

    #[test]
    fn test_display_reads_back() {
        let scenario: Scenario = SCENARIO.parse().unwrap();
        let text = scenario.to_string();
        assert!(text.contains("entity 2 ABCD 5x6\n"));
        assert_eq!(text.parse::<Scenario>().unwrap(), scenario);
    }

    #[test]
    fn test_into_simulation() {
        let scenario: Scenario = SCENARIO.parse().unwrap();
        let mut sim = scenario.into_simulation().unwrap();
        let report = sim.run(&mut Vec::<crate::Board>::new()).unwrap();
        assert_eq!(report.agents[0].pos, Position::new(4, 5));
        assert_eq!(report.agents[1].pos, Position::new(7, 6));
    }

    #[test]
    fn test_parse_errors_name_the_line() {
        let cases = [
            ("size ten\n", 1),
            ("size 3\nbogus 1\n", 2),
            ("size 3\nentity 1 AB 1-1\n", 2),
            ("size 3\nentity 1 AB 1x1 sick\n", 2),
            ("entity 1 AB 1x1\nturn 1 1x1 2x2\n", 2),
            ("entity 1 AB 1x1\nturn\n", 2),
            ("turn_count\n", 1),
        ];

        for (text, line) in cases {
            match text.parse::<Scenario>() {
                Err(SimError::Parse { line: got, .. }) => assert_eq!(got, line, "{text:?}"),
                other => panic!("expected a parse error for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_duplicate_entities_are_rejected_when_built() {
        let text = "size 3\nturn_count 0\nentity 1 A 1x1\nentity 1 B 2x2\n";
        let scenario: Scenario = text.parse().unwrap();
        assert!(matches!(
            scenario.into_simulation(),
            Err(SimError::DuplicateIdentity { id: 1 })
        ));
    }

    #[test]
    fn test_huge_size_is_rejected_when_built() {
        let scenario: Scenario = "size 2147483647\nturn_count 1\n".parse().unwrap();
        assert!(matches!(
            scenario.into_simulation(),
            Err(SimError::InvalidSize { size: i32::MAX })
        ));
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position(1, "12x7").unwrap(), Position::new(12, 7));
        assert!(parse_position(1, "12x").is_err());
        assert!(parse_position(1, "7").is_err());
    }
}
