//! The eight winning lines.

/// Three board indices forming a row, column or diagonal.
pub type Line = [usize; 3];

/// Every winning line: rows, then columns, then diagonals.
///
/// Scans over this table always run in declaration order.
pub const WINNING_LINES: [Line; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];
