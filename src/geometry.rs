use num::{PrimInt, Signed};
use std::fmt;
use std::ops::{Add, Sub};

/// Integer vector on the simulation grid. Positions are `Vec2D<i32>`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Vec2D<T: PrimInt + Signed> {
    pub x: T,
    pub y: T,
}

pub type Position = Vec2D<i32>;

impl<T: PrimInt + Signed> Vec2D<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    pub fn new_zero() -> Self {
        Self {
            x: T::zero(),
            y: T::zero(),
        }
    }

    pub fn new_random<Dx, Dy, R>(x_distro: Dx, y_distro: Dy, rng: &mut R) -> Self
    where
        Dx: rand::distributions::Distribution<T>,
        Dy: rand::distributions::Distribution<T>,
        R: rand::Rng,
    {
        Self {
            x: x_distro.sample(rng),
            y: y_distro.sample(rng),
        }
    }

    /// Chebyshev distance: the larger of the two per-axis distances.
    pub fn dist(&self, other: Self) -> T {
        let delta = *self - other;
        delta.x.abs().max(delta.y.abs())
    }

    /// True when both per-axis distances are at most `radius`.
    pub fn is_within(&self, other: Self, radius: T) -> bool {
        self.dist(other) <= radius
    }

    /// Clamps both components into `lo..=hi`.
    pub fn clamp(&self, lo: T, hi: T) -> Self {
        Self {
            x: self.x.max(lo).min(hi),
            y: self.y.max(lo).min(hi),
        }
    }
}

impl<T: PrimInt + Signed + fmt::Display> fmt::Display for Vec2D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

// Vector addition
impl<T: PrimInt + Signed> Add for Vec2D<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

// Vector plus scalar addition
impl<T: PrimInt + Signed> Add<T> for Vec2D<T> {
    type Output = Self;

    fn add(self, other: T) -> Self::Output {
        Self {
            x: self.x + other,
            y: self.y + other,
        }
    }
}

// Vector subtraction
impl<T: PrimInt + Signed> Sub for Vec2D<T> {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

// Vector minus scalar subtraction
impl<T: PrimInt + Signed> Sub<T> for Vec2D<T> {
    type Output = Self;

    fn sub(self, other: T) -> Self::Output {
        Self {
            x: self.x - other,
            y: self.y - other,
        }
    }
}

/// Rect is an axis-aligned box of grid cells given by two inclusive corners.
/// Internally, the first corner is in the bottom left and the second corner is
/// in the top right, so `bl` has the smallest x and y values and `tr` has the
/// largest.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rect<T: PrimInt + Signed> {
    pub bl: Vec2D<T>,
    pub tr: Vec2D<T>,
}

impl<T: PrimInt + Signed> Rect<T> {
    /// Creates a new Rect from two corners, regardless of which corners they
    /// are on the rectangle.
    pub fn new(corner1: Vec2D<T>, corner2: Vec2D<T>) -> Self {
        Self {
            bl: Vec2D::new(corner1.x.min(corner2.x), corner1.y.min(corner2.y)),
            tr: Vec2D::new(corner1.x.max(corner2.x), corner1.y.max(corner2.y)),
        }
    }

    /// The square of cells whose Chebyshev distance from `center` is at most
    /// `radius`.
    pub fn new_centered(center: Vec2D<T>, radius: T) -> Self {
        Self::new(center - radius, center + radius)
    }

    /// Checks if the rectangle contains a cell. Both edges are inclusive.
    pub fn contains(&self, point: Vec2D<T>) -> bool {
        point.x >= self.bl.x && point.x <= self.tr.x && point.y >= self.bl.y && point.y <= self.tr.y
    }

    /// Checks if the two rectangles share at least one cell
    pub fn intersects(&self, other: Self) -> bool {
        !(self.bl.x > other.tr.x
            || other.bl.x > self.tr.x
            || self.bl.y > other.tr.y
            || other.bl.y > self.tr.y)
    }

    fn center(&self) -> Vec2D<T> {
        let two = T::one() + T::one();
        Vec2D::new(
            self.bl.x + (self.tr.x - self.bl.x) / two,
            self.bl.y + (self.tr.y - self.bl.y) / two,
        )
    }

    /// Finds which quadrant of the rectangle a cell falls in. The center cell
    /// belongs to the bottom-left quadrant. Cells outside the rectangle are
    /// still assigned as if the quadrants extended outward.
    /// Quadrants are numbered by the following system:
    /// +---+---+
    /// | 0 | 1 |
    /// +---+---+
    /// | 2 | 3 |
    /// +---+---+
    pub fn get_quadrant(&self, point: Vec2D<T>) -> usize {
        let center = self.center();
        let x = if point.x <= center.x { 0 } else { 1 };
        let y = if point.y <= center.y { 0 } else { 1 };
        2 - 2 * y + x
    }

    /// Number of cells spanned minus one along x.
    pub fn get_width(&self) -> T {
        self.tr.x - self.bl.x
    }

    /// Number of cells spanned minus one along y.
    pub fn get_height(&self) -> T {
        self.tr.y - self.bl.y
    }

    /// A rectangle can be quartered once it spans at least two cells on each
    /// axis.
    pub fn can_quarter(&self) -> bool {
        self.get_width() >= T::one() && self.get_height() >= T::one()
    }

    /// Returns the four non-overlapping quadrants of this rectangle, indexed
    /// as in `get_quadrant`. Only meaningful when `can_quarter` holds.
    pub fn quarter(&self) -> [Rect<T>; 4] {
        let c = self.center();
        let one = T::one();
        [
            Rect::new(Vec2D::new(self.bl.x, c.y + one), Vec2D::new(c.x, self.tr.y)),
            Rect::new(c + one, self.tr),
            Rect::new(self.bl, c),
            Rect::new(Vec2D::new(c.x + one, self.bl.y), Vec2D::new(self.tr.x, c.y)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chebyshev_distance() {
        let origin = Position::new(5, 5);
        assert_eq!(origin.dist(Position::new(8, 8)), 3);
        assert_eq!(origin.dist(Position::new(9, 5)), 4);
        assert_eq!(origin.dist(Position::new(2, 7)), 3);
        assert!(origin.is_within(Position::new(8, 2), 3));
        assert!(!origin.is_within(Position::new(5, 1), 3));
    }

    #[test]
    fn test_display_uses_x_separator() {
        assert_eq!(Position::new(12, 7).to_string(), "12x7");
    }

    #[test]
    fn test_rect_contains_is_inclusive() {
        let rect = Rect::new_centered(Position::new(4, 4), 3);
        assert_eq!(rect.bl, Position::new(1, 1));
        assert_eq!(rect.tr, Position::new(7, 7));
        assert!(rect.contains(Position::new(1, 7)));
        assert!(!rect.contains(Position::new(0, 4)));
        assert!(!rect.contains(Position::new(4, 8)));
    }

    #[test]
    fn test_rect_intersects() {
        let a = Rect::new(Position::new(1, 1), Position::new(3, 3));
        assert!(a.intersects(Rect::new(Position::new(3, 3), Position::new(5, 5))));
        assert!(!a.intersects(Rect::new(Position::new(4, 1), Position::new(5, 3))));
    }

    #[test]
    fn test_quarter_covers_every_cell_once() {
        let rect = Rect::new(Position::new(1, 1), Position::new(5, 4));
        let quadrants = rect.quarter();
        for x in 1..=5 {
            for y in 1..=4 {
                let cell = Position::new(x, y);
                let holders: Vec<usize> = (0..4).filter(|&q| quadrants[q].contains(cell)).collect();
                assert_eq!(holders, vec![rect.get_quadrant(cell)]);
            }
        }
    }

    #[test]
    fn test_single_column_cannot_quarter() {
        let rect = Rect::new(Position::new(2, 1), Position::new(2, 9));
        assert!(!rect.can_quarter());
    }
}
