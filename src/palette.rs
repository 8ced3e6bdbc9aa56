use std::collections::HashSet;

use serde::Serialize;

pub const PALETTE_CAPACITY: usize = 7;

const BASE_COLORS: [DisplayColor; PALETTE_CAPACITY] = [
    DisplayColor("#f14c4c"),
    DisplayColor("#3794ff"),
    DisplayColor("#cca700"),
    DisplayColor("#20bf55"),
    DisplayColor("#f14cd0"),
    DisplayColor("#2ec8c8"),
    DisplayColor("#9b57d3"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DisplayColor(pub &'static str);

pub fn copy_base_palette() -> Vec<DisplayColor> {
    BASE_COLORS.to_vec()
}

/// Reclaimed colors re-enter the pool in base-palette order, not in the
/// order their experiments disappeared.
pub(crate) fn reorder_to_palette(colors: &HashSet<DisplayColor>) -> Vec<DisplayColor> {
    BASE_COLORS
        .iter()
        .copied()
        .filter(|color| colors.contains(color))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ColorAssignment {
    Assigned(DisplayColor),
    Unassigned,
}

impl ColorAssignment {
    pub fn is_assigned(self) -> bool {
        matches!(self, ColorAssignment::Assigned(_))
    }

    pub fn color(self) -> Option<DisplayColor> {
        match self {
            ColorAssignment::Assigned(color) => Some(color),
            ColorAssignment::Unassigned => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_palette_has_seven_distinct_colors() {
        let palette = copy_base_palette();
        assert_eq!(palette.len(), PALETTE_CAPACITY);
        let distinct = palette.iter().collect::<HashSet<_>>();
        assert_eq!(distinct.len(), PALETTE_CAPACITY);
    }

    #[test]
    fn reorder_follows_base_palette_order() {
        let palette = copy_base_palette();
        let subset = [palette[4], palette[0], palette[2]]
            .into_iter()
            .collect::<HashSet<_>>();
        assert_eq!(
            reorder_to_palette(&subset),
            vec![palette[0], palette[2], palette[4]]
        );
    }
}
