//! Per-route pages
//!
//! Each page owns its view state and key handling; network effects are
//! returned as actions and executed by the app, so pages stay synchronous
//! and testable.

pub mod cart;
pub mod clients;
pub mod new_order;
pub mod orders;
pub mod products;
pub mod register;

/// Move a selection index within a list of `len` items
pub(crate) fn move_selection(selected: usize, len: usize, delta: i64) -> usize {
    if len == 0 {
        return 0;
    }
    let max = len as i64 - 1;
    (selected as i64 + delta).clamp(0, max) as usize
}

#[cfg(test)]
mod tests {
    use super::move_selection;

    #[test]
    fn selection_stays_in_bounds() {
        assert_eq!(move_selection(0, 3, -1), 0);
        assert_eq!(move_selection(0, 3, 1), 1);
        assert_eq!(move_selection(2, 3, 1), 2);
        assert_eq!(move_selection(5, 0, 1), 0);
    }
}
