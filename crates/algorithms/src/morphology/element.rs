//! Structuring elements for binary morphology

/// 3x3 neighbourhood shape applied once per iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StructuringElement {
    /// Centre plus the 4 edge neighbours; n iterations reach Manhattan distance n
    #[default]
    Cross,
    /// Full 3x3 block; n iterations reach Chebyshev distance n
    Square,
}

const CROSS: [(isize, isize); 5] = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];
const SQUARE: [(isize, isize); 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl StructuringElement {
    /// (row, col) offsets covered by the element, centre included
    pub fn offsets(&self) -> &'static [(isize, isize)] {
        match self {
            StructuringElement::Cross => &CROSS,
            StructuringElement::Square => &SQUARE,
        }
    }
}

/// Neighbour of (row, col) at `offset`, or `None` outside a rows x cols grid
pub(super) fn neighbor(
    row: usize,
    col: usize,
    (dr, dc): (isize, isize),
    rows: usize,
    cols: usize,
) -> Option<(usize, usize)> {
    let r = row.checked_add_signed(dr)?;
    let c = col.checked_add_signed(dc)?;
    (r < rows && c < cols).then_some((r, c))
}
