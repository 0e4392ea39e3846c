use crate::agent::{Agent, Health};
use crate::geometry::Position;
use crate::{BLUE, GREEN, RED, RESET, YELLOW};
use std::fmt;

/// What a single board cell shows.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Empty,
    /// An alive agent that is susceptible or recovered.
    Normal,
    /// An alive agent that is incubating or infected.
    Infectious,
    /// A dead agent that still transmits.
    DeadInfectious,
}

impl Cell {
    /// The cell an agent in this health state paints. Inert bodies paint
    /// `Empty`, erasing whatever was there.
    pub fn for_health(health: Health) -> Self {
        match health {
            Health::DeadInfectious { .. } => Cell::DeadInfectious,
            Health::DeadInert => Cell::Empty,
            Health::Infected { .. } | Health::Incubating { .. } => Cell::Infectious,
            Health::Susceptible | Health::Recovered => Cell::Normal,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Cell::Wall => '-',
            Cell::Empty => ' ',
            Cell::Normal => 'O',
            Cell::Infectious => 'X',
            Cell::DeadInfectious => 'D',
        }
    }

    fn color(&self) -> &'static str {
        match self {
            Cell::Wall => BLUE,
            Cell::Empty => RESET,
            Cell::Normal => GREEN,
            Cell::Infectious => RED,
            Cell::DeadInfectious => YELLOW,
        }
    }

    fn fill(&self) -> Option<&'static str> {
        match self {
            Cell::Wall => Some("gray"),
            Cell::Empty => None,
            Cell::Normal => Some("green"),
            Cell::Infectious => Some("red"),
            Cell::DeadInfectious => Some("black"),
        }
    }
}

/// Largest grid side a board is built for.
pub const MAX_SIZE: i32 = 4096;

/// A `(size + 2)` square snapshot of the grid. Row and column 0 and
/// `size + 1` are walls. The agent at position (x, y) is drawn at row x,
/// column y.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: i32,
    cells: Vec<Vec<Cell>>,
}

impl Board {
    /// Sizes outside `0..=MAX_SIZE` are clamped into it.
    pub fn new(size: i32) -> Self {
        let size = size.clamp(0, MAX_SIZE);
        let side = (size + 2) as usize;
        let cells = (0..side)
            .map(|row| {
                (0..side)
                    .map(|col| {
                        if row == 0 || col == 0 || row == side - 1 || col == side - 1 {
                            Cell::Wall
                        } else {
                            Cell::Empty
                        }
                    })
                    .collect()
            })
            .collect();

        Board { size, cells }
    }

    /// Paints every agent in population order, so a later agent overwrites
    /// an earlier one sharing its cell.
    pub fn rasterize(size: i32, agents: &[Agent]) -> Self {
        let mut board = Board::new(size);

        for agent in agents {
            let cell = Cell::for_health(agent.health());
            match board.paint(agent.pos(), cell) {
                Some(Cell::Empty) | None => {}
                Some(previous) => log::debug!(
                    "entity {} at {} overwrites a '{}' cell with '{}'",
                    agent.id(),
                    agent.pos(),
                    previous.symbol(),
                    cell.symbol()
                ),
            }
        }

        board
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    /// Returns the interior cell at `pos`, or `None` for walls and anything
    /// beyond them.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        if !self.is_interior(pos) {
            return None;
        }
        Some(self.cells[pos.x as usize][pos.y as usize])
    }

    /// Sets an interior cell and returns what it held before. Positions
    /// outside the interior are left alone.
    fn paint(&mut self, pos: Position, cell: Cell) -> Option<Cell> {
        if !self.is_interior(pos) {
            return None;
        }
        let slot = &mut self.cells[pos.x as usize][pos.y as usize];
        Some(std::mem::replace(slot, cell))
    }

    fn is_interior(&self, pos: Position) -> bool {
        (1..=self.size).contains(&pos.x) && (1..=self.size).contains(&pos.y)
    }

    /// A view of the board that prints with ANSI colours.
    pub fn colored(&self) -> Colored<'_> {
        Colored(self)
    }

    /// One unit square per non-empty cell, laid out as the text rendering is.
    pub fn render_as_svg(&self) -> svg::Document {
        let side = self.cells.len() as f64;
        let mut doc = svg::Document::new()
            .set("viewBox", (0.0, 0.0, side, side))
            .add(
                svg::node::element::Rectangle::new()
                    .set("width", side)
                    .set("height", side)
                    .set("fill", "white"),
            );

        for (row, cells) in self.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if let Some(fill) = cell.fill() {
                    let rect = svg::node::element::Rectangle::new()
                        .set("x", col as f64)
                        .set("y", row as f64)
                        .set("width", 1.0)
                        .set("height", 1.0)
                        .set("fill", fill);
                    doc = doc.add(rect);
                }
            }
        }

        doc
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for cell in row {
                write!(f, "{}", cell.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub struct Colored<'a>(&'a Board);

impl fmt::Display for Colored<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.0.cells {
            for cell in row {
                write!(f, "{}{}", cell.color(), cell.symbol())?;
            }
            writeln!(f, "{}", RESET)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disease::Gates;

    fn agent(id: i64, gates: &str, x: i32, y: i32, infected: bool) -> Agent {
        Agent::new(id, Gates::parse(gates), vec![Position::new(x, y)], infected).unwrap()
    }

    #[test]
    fn test_empty_board() {
        let board = Board::new(3);
        assert_eq!(board.to_string(), "-----\n-   -\n-   -\n-   -\n-----\n");
        assert_eq!(board.rows().len(), 5);
    }

    #[test]
    fn test_oversized_board_is_clamped() {
        let board = Board::new(i32::MAX);
        assert_eq!(board.size(), MAX_SIZE);
        assert_eq!(board.rows().len(), MAX_SIZE as usize + 2);
        assert_eq!(Board::new(-4), Board::new(0));
    }

    #[test]
    fn test_cell_codes() {
        let mut incubating = agent(2, "AB", 1, 2, false);
        incubating.expose();
        let agents = vec![
            agent(1, "AB", 1, 1, false),
            incubating,
            agent(3, "ABC", 3, 1, true),
            agent(4, "EFGH", 3, 3, true),
        ];

        let board = Board::rasterize(3, &agents);
        assert_eq!(board.to_string(), "-----\n-OX -\n-   -\n-X O-\n-----\n");
    }

    #[test]
    fn test_x_is_the_row() {
        let board = Board::rasterize(4, &[agent(1, "A", 4, 1, false)]);
        let rows: Vec<String> = board.to_string().lines().map(String::from).collect();
        assert_eq!(rows[4], "-O   -");
        assert_eq!(board.get(Position::new(4, 1)), Some(Cell::Normal));
        assert_eq!(board.get(Position::new(1, 4)), Some(Cell::Empty));
        assert_eq!(board.get(Position::new(0, 1)), None);
    }

    #[test]
    fn test_dead_bodies() {
        let mut dead = agent(1, "ABC", 2, 2, true);
        for _ in 0..12 {
            dead.step();
        }
        let board = Board::rasterize(3, &[dead.clone()]);
        assert_eq!(board.get(Position::new(2, 2)), Some(Cell::DeadInfectious));

        for _ in 0..5 {
            dead.step();
        }
        assert_eq!(dead.health(), Health::DeadInert);
        let board = Board::rasterize(3, &[dead]);
        assert_eq!(board, Board::new(3));
    }

    #[test]
    fn test_last_writer_wins() {
        let mut inert = agent(3, "ABC", 2, 2, true);
        for _ in 0..17 {
            inert.step();
        }
        let agents = vec![
            agent(1, "AB", 2, 2, false),
            agent(2, "AB", 2, 2, true),
            inert,
        ];
        assert_eq!(
            Board::rasterize(3, &agents[..2]).get(Position::new(2, 2)),
            Some(Cell::Infectious)
        );
        // An inert body painted last erases the cell
        assert_eq!(
            Board::rasterize(3, &agents).get(Position::new(2, 2)),
            Some(Cell::Empty)
        );
    }

    #[test]
    fn test_colored_keeps_symbols() {
        let board = Board::rasterize(2, &[agent(1, "A", 1, 1, false)]);
        let colored = board.colored().to_string();
        assert!(colored.contains(&format!("{}O", GREEN)));
        assert_eq!(colored.lines().count(), 4);
    }

    #[test]
    fn test_svg_has_a_square_per_painted_cell() {
        let board = Board::rasterize(2, &[agent(1, "A", 1, 1, false)]);
        let mut bytes = Vec::new();
        svg::write(&mut bytes, &board.render_as_svg()).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        // 12 wall cells, one agent, one background
        assert_eq!(svg.matches("<rect").count(), 14);
        assert!(svg.contains("fill=\"green\""));
    }
}
