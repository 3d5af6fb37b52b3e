//! Card grid placement and selection cycling.

use crate::cards::{CARD_HEIGHT, CARD_WIDTH};

pub const CARDS_PER_ROW: usize = 3;
pub const CARD_SPACING: f32 = 20.0;

pub fn card_size() -> [f32; 2] {
    [CARD_WIDTH as f32, CARD_HEIGHT as f32]
}

/// Top-left corner of card `index` on a `screen` sized surface.
///
/// Cards sit three to a row around the screen centre; the first row is
/// offset half a step upward so two rows balance vertically.
pub fn card_origin(index: usize, screen: [f32; 2]) -> [f32; 2] {
    let [w, h] = card_size();
    let col = (index % CARDS_PER_ROW) as f32;
    let row = (index / CARDS_PER_ROW) as f32;
    let rel = [col - 1.0, row - 0.5];
    let mid = [
        screen[0] / 2.0 + rel[0] * (w + CARD_SPACING),
        screen[1] / 2.0 + rel[1] * (h + CARD_SPACING),
    ];
    [mid[0] - w / 2.0, mid[1] - h / 2.0]
}

/// Step `current` by `delta`, wrapping modulo `count`. Zero cards: unchanged.
pub fn step_selection(current: usize, delta: isize, count: usize) -> usize {
    if count == 0 {
        return current;
    }
    let count = count as isize;
    (current as isize + delta).rem_euclid(count) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_cards_form_two_centred_rows() {
        let screen = [1920.0, 1080.0];
        // Middle column of the first row.
        assert_eq!(card_origin(1, screen), [960.0 - 195.0, 540.0 - 150.0 - 140.0]);
        assert_eq!(card_origin(0, screen), [960.0 - 410.0 - 195.0, 250.0]);
        assert_eq!(card_origin(2, screen), [960.0 + 410.0 - 195.0, 250.0]);
        assert_eq!(card_origin(4, screen), [765.0, 540.0 + 150.0 - 140.0]);
    }

    #[test]
    fn rows_do_not_overlap() {
        let screen = [1920.0, 1080.0];
        let top = card_origin(0, screen);
        let bottom = card_origin(3, screen);
        assert_eq!(bottom[0], top[0]);
        assert_eq!(bottom[1] - top[1], CARD_HEIGHT as f32 + CARD_SPACING);
    }

    #[test]
    fn selection_wraps_both_ways() {
        assert_eq!(step_selection(5, 1, 6), 0);
        assert_eq!(step_selection(0, -1, 6), 5);
        assert_eq!(step_selection(2, 1, 6), 3);
    }

    #[test]
    fn selection_is_unchanged_without_cards() {
        assert_eq!(step_selection(0, 1, 0), 0);
        assert_eq!(step_selection(0, -1, 0), 0);
    }
}
