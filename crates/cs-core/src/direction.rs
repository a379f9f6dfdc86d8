//! Adjacency directions of the cell graph.
//!
//! `Right`/`Left` run along a lane (forward/backward), `Top`/`Bottom` cross
//! into the neighbouring parallel lane.

/// One of the four adjacency slots of a cell.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Top,
    Bottom,
    Left,
    #[default]
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Bottom,
        Direction::Left,
        Direction::Right,
    ];

    /// Slot index in a `[_; 4]` adjacency array.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::Top    => 0,
            Direction::Bottom => 1,
            Direction::Left   => 2,
            Direction::Right  => 3,
        }
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Top    => Direction::Bottom,
            Direction::Bottom => Direction::Top,
            Direction::Left   => Direction::Right,
            Direction::Right  => Direction::Left,
        }
    }

    /// `true` for the along-lane directions.
    #[inline]
    pub fn is_longitudinal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Directions a vehicle travelling in `self` may pick this tick:
    /// straight ahead first, then the two orthogonal lane changes.
    pub fn candidates(self) -> [Direction; 3] {
        match self {
            Direction::Left | Direction::Right => [self, Direction::Top, Direction::Bottom],
            Direction::Top | Direction::Bottom => [self, Direction::Right, Direction::Left],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Top    => "top",
            Direction::Bottom => "bottom",
            Direction::Left   => "left",
            Direction::Right  => "right",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
