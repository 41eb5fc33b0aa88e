//! Keyboard focus traversal
//!
//! The navigable set is recomputed from the surface on every command, since
//! pages and filters can reshape the list between two key presses.

use crate::surface::{ItemHandle, RenderSurface};

/// Index reached by moving `delta` rows through a list of `len` rows
///
/// Without a current position, a forward move lands on the first row and a
/// backward move on the last. Moves wrap around both ends.
pub fn next_focus_index(len: usize, current: Option<usize>, delta: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }

    let len_signed = len as isize;
    let idx = match current {
        Some(idx) => (idx % len + delta.rem_euclid(len_signed) as usize) % len,
        None if delta > 0 => (delta - 1).rem_euclid(len_signed) as usize,
        None => delta.rem_euclid(len_signed) as usize,
    };
    Some(idx)
}

/// Move input focus `delta` enabled rows up or down
///
/// Returns the newly focused row, or `None` when nothing is navigable.
pub fn move_focus(surface: &mut dyn RenderSurface, delta: isize) -> Option<ItemHandle> {
    let navigable = surface.navigable_items();
    let current = surface
        .focused_item()
        .and_then(|focused| navigable.iter().position(|h| *h == focused));

    let idx = next_focus_index(navigable.len(), current, delta)?;
    let target = navigable[idx];
    surface.focus_item(target);
    tracing::trace!("Focus moved by {} to row {}", delta, idx);
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::OptionLeaf;
    use crate::surface::RecordingSurface;

    #[test]
    fn test_start_without_focus() {
        assert_eq!(next_focus_index(5, None, 1), Some(0));
        assert_eq!(next_focus_index(5, None, -1), Some(4));
        assert_eq!(next_focus_index(5, None, 3), Some(2));
        assert_eq!(next_focus_index(5, None, -2), Some(3));
    }

    #[test]
    fn test_wraps_both_ends() {
        assert_eq!(next_focus_index(3, Some(2), 1), Some(0));
        assert_eq!(next_focus_index(3, Some(0), -1), Some(2));
        assert_eq!(next_focus_index(3, Some(1), -7), Some(0));
    }

    #[test]
    fn test_extreme_deltas_do_not_overflow() {
        assert_eq!(next_focus_index(3, Some(2), isize::MAX), Some(0));
        assert_eq!(next_focus_index(3, Some(0), isize::MIN), Some(1));
        assert_eq!(next_focus_index(4, None, isize::MAX), Some(2));
        assert_eq!(next_focus_index(4, None, isize::MIN), Some(0));
    }

    #[test]
    fn test_empty_set_is_noop() {
        assert_eq!(next_focus_index(0, None, 1), None);

        let mut surface = RecordingSurface::new();
        assert_eq!(move_focus(&mut surface, 1), None);
        assert_eq!(surface.focused_item(), None);
    }

    #[test]
    fn test_move_focus_skips_disabled_rows() {
        let mut surface = RecordingSurface::new();
        let a = surface.render_leaf(&OptionLeaf::new("a", "Apple"), None, false);
        surface.render_leaf(&OptionLeaf::new("b", "Banana").disabled(), None, false);
        let c = surface.render_leaf(&OptionLeaf::new("c", "Cherry"), None, false);

        assert_eq!(move_focus(&mut surface, 1), Some(a));
        assert_eq!(move_focus(&mut surface, 1), Some(c));
        assert_eq!(move_focus(&mut surface, 1), Some(a));
        assert_eq!(move_focus(&mut surface, -1), Some(c));
    }

    #[test]
    fn test_focus_outside_set_restarts() {
        let mut surface = RecordingSurface::new();
        let a = surface.render_leaf(&OptionLeaf::new("a", "Apple"), None, false);
        let b = surface.render_leaf(&OptionLeaf::new("b", "Banana"), None, false);
        surface.focus_input();

        assert_eq!(move_focus(&mut surface, -1), Some(b));
        surface.focus_input();
        assert_eq!(move_focus(&mut surface, 1), Some(a));
    }
}
