/// Items shown before the current one in the thumbnail strip.
pub const WINDOW_BEHIND: usize = 3;
/// Items shown from the current one onwards.
pub const WINDOW_AHEAD: usize = 12;

/// Visible slice of the queue around the current index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewWindow<'a, T> {
    /// Queue index of `items[0]`.
    pub start: usize,
    /// Exclusive queue index of the slice end.
    pub end: usize,
    pub items: &'a [T],
    pub has_more_before: bool,
    pub has_more_after: bool,
}

impl<T> ViewWindow<'_, T> {
    /// Position of the current item inside `items`, if it is visible.
    pub fn current_offset(&self, current_index: usize) -> Option<usize> {
        (self.start..self.end)
            .contains(&current_index)
            .then(|| current_index - self.start)
    }
}

/// `items[max(0, current-behind) .. min(len, current+ahead)]` plus "more" flags.
pub fn window_for<T>(
    items: &[T],
    current_index: usize,
    behind: usize,
    ahead: usize,
) -> ViewWindow<'_, T> {
    let end = current_index.saturating_add(ahead).min(items.len());
    let start = current_index.saturating_sub(behind).min(end);
    ViewWindow {
        start,
        end,
        items: &items[start..end],
        has_more_before: start > 0,
        has_more_after: end < items.len(),
    }
}
