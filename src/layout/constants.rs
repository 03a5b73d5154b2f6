//! Various constants used for laying out the items of a document.

use crate::units::Px;

/// The height of a line of the grid, when none is configured.
pub const LINE_HEIGHT: Px = Px(34.0);

/// The width of a run of whitespace between two words.
pub const SPACE_WIDTH: Px = Px(6.0);

/// The room left on each side of inline math.
pub const INLINE_MATH_MARGIN: Px = Px(4.0);

/// The room left above and below display math.
pub const DISPLAY_MATH_PADDING: Px = Px(8.0);

/// The point size of the text of paragraphs.
pub const BODY_SIZE: f64 = 22.0;

/// The point size of math, for which the math renderer gives its drawings.
pub const MATH_SIZE: Px = Px(22.0);

/// Room between the top of the content area and the first grid line.
pub const CONTENT_PADDING_TOP: Px = Px(6.0);

/// How far above the bottom of its line the baseline of a text line sits.
pub const BASELINE_OFFSET: Px = Px(8.0);

/// The point size of headings, by level.
pub fn heading_size(level: u8) -> f64 {
    match level {
        1 => 36.0,
        2 => 28.0,
        _ => 22.0,
    }
}
