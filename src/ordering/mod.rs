pub(crate) mod debounce;

use std::collections::HashSet;

/// Anything that lives in a user-sortable list.
///
/// Identity must be stable for the lifetime of the list. Entities whose backend
/// schema stores an explicit position override `set_position` so the in-memory
/// index can be written back before persisting.
pub(crate) trait OrderedItem {
    fn item_id(&self) -> i64;

    fn set_position(&mut self, _position: usize) {}

    /// Fixed items stay pinned at the head of the list and never take part in a drag.
    fn is_fixed(&self) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ReorderError {
    #[error("index {index} is out of range for a list of {len} items")]
    OutOfRange { index: usize, len: usize },
}

/// Move the element at `from` to `to`, keeping everything else in relative order.
pub(crate) fn reorder<T: Clone>(items: &[T], from: usize, to: usize) -> Result<Vec<T>, ReorderError> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(ReorderError::OutOfRange { index, len });
        }
    }

    let mut out = items.to_vec();
    let moved = out.remove(from);
    out.insert(to, moved);
    Ok(out)
}

/// Result of a finished drag gesture. `destination` is `None` when the item was
/// dropped outside any drop zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DragEnd {
    pub source: usize,
    pub destination: Option<usize>,
}

impl DragEnd {
    pub fn dropped(source: usize, destination: usize) -> Self {
        Self {
            source,
            destination: Some(destination),
        }
    }

    pub fn cancelled(source: usize) -> Self {
        Self {
            source,
            destination: None,
        }
    }
}

/// Split a list into its pinned head and the part the user may reorder.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Partitioned<T> {
    pub fixed: Vec<T>,
    pub sortable: Vec<T>,
}

impl<T: OrderedItem + Clone> Partitioned<T> {
    pub fn split(items: &[T]) -> Self {
        let (fixed, sortable) = items.iter().cloned().partition(|item| item.is_fixed());
        Self { fixed, sortable }
    }

    /// Fixed items first, then the sortable tail, with positions rewritten.
    pub fn concat(self) -> Vec<T> {
        let mut out = self.fixed;
        out.extend(self.sortable);
        write_positions(&mut out);
        out
    }
}

/// The list as it should be saved: pinned items first, positions dense.
///
/// Items can be appended behind a pinned one (a Phases widget added late), so the
/// order is normalized on the way out.
pub(crate) fn order_to_persist<T: OrderedItem + Clone>(items: &[T]) -> Vec<T> {
    Partitioned::split(items).concat()
}

/// Apply a drag gesture to a full list. Drag indices address the sortable subset.
///
/// Returns `Ok(None)` when nothing changed (cancelled drag, or dropped in place).
pub(crate) fn apply_drag_end<T: OrderedItem + Clone>(
    items: &[T],
    drag: DragEnd,
) -> Result<Option<Vec<T>>, ReorderError> {
    let Some(destination) = drag.destination else {
        return Ok(None);
    };
    if destination == drag.source {
        return Ok(None);
    }

    let mut parts = Partitioned::split(items);
    parts.sortable = reorder(&parts.sortable, drag.source, destination)?;
    Ok(Some(parts.concat()))
}

pub(crate) fn write_positions<T: OrderedItem>(items: &mut [T]) {
    for (idx, item) in items.iter_mut().enumerate() {
        item.set_position(idx);
    }
}

pub(crate) fn has_unique_ids<T: OrderedItem>(items: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().all(|item| seen.insert(item.item_id()))
}

/// Drop an item by id. Remaining items are re-densified.
pub(crate) fn remove_by_id<T: OrderedItem + Clone>(items: &[T], id: i64) -> Vec<T> {
    let mut out: Vec<T> = items.iter().filter(|x| x.item_id() != id).cloned().collect();
    write_positions(&mut out);
    out
}

/// Replace an item with the same id, or append it.
pub(crate) fn upsert_by_id<T: OrderedItem + Clone>(items: &[T], item: T) -> Vec<T> {
    let mut out = items.to_vec();
    match out.iter().position(|x| x.item_id() == item.item_id()) {
        Some(idx) => out[idx] = item,
        None => out.push(item),
    }
    write_positions(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: i64,
        pinned: bool,
        position: usize,
    }

    impl OrderedItem for Row {
        fn item_id(&self) -> i64 {
            self.id
        }

        fn set_position(&mut self, position: usize) {
            self.position = position;
        }

        fn is_fixed(&self) -> bool {
            self.pinned
        }
    }

    fn rows(ids: &[i64]) -> Vec<Row> {
        ids.iter()
            .enumerate()
            .map(|(position, id)| Row {
                id: *id,
                pinned: false,
                position,
            })
            .collect()
    }

    fn ids(items: &[Row]) -> Vec<i64> {
        items.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_reorder_moves_forward() {
        let out = reorder(&['A', 'B', 'C', 'D'], 0, 2).expect("in range");
        assert_eq!(out, vec!['B', 'C', 'A', 'D']);
    }

    #[test]
    fn test_reorder_moves_backward() {
        let out = reorder(&['A', 'B', 'C', 'D', 'E'], 2, 0).expect("in range");
        assert_eq!(out, vec!['C', 'A', 'B', 'D', 'E']);
    }

    #[test]
    fn test_reorder_same_index_is_identity() {
        let input = vec!['A', 'B', 'C'];
        for i in 0..input.len() {
            assert_eq!(reorder(&input, i, i).expect("in range"), input);
        }
    }

    #[test]
    fn test_reorder_every_pair_is_a_single_move() {
        let input: Vec<u32> = (0..6).collect();
        for i in 0..input.len() {
            for j in 0..input.len() {
                let out = reorder(&input, i, j).expect("in range");
                assert_eq!(out.len(), input.len());
                assert_eq!(out[j], input[i]);

                let rest_before: Vec<u32> = input.iter().copied().filter(|x| *x != input[i]).collect();
                let rest_after: Vec<u32> = out.iter().copied().filter(|x| *x != input[i]).collect();
                assert_eq!(rest_before, rest_after);
            }
        }
    }

    #[test]
    fn test_reorder_out_of_range() {
        let input = vec![1, 2, 3];
        assert_eq!(
            reorder(&input, 3, 0),
            Err(ReorderError::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            reorder(&input, 0, 7),
            Err(ReorderError::OutOfRange { index: 7, len: 3 })
        );
        assert!(reorder::<u8>(&[], 0, 0).is_err());
    }

    #[test]
    fn test_drag_without_destination_is_noop() {
        let items = rows(&[1, 2, 3]);
        assert_eq!(apply_drag_end(&items, DragEnd::cancelled(1)), Ok(None));
        assert_eq!(apply_drag_end(&items, DragEnd::dropped(1, 1)), Ok(None));
    }

    #[test]
    fn test_drag_rewrites_positions() {
        let items = rows(&[10, 20, 30, 40, 50]);
        let out = apply_drag_end(&items, DragEnd::dropped(2, 0))
            .expect("in range")
            .expect("changed");
        assert_eq!(ids(&out), vec![30, 10, 20, 40, 50]);
        let positions: Vec<usize> = out.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_fixed_items_keep_head_positions() {
        let mut items = rows(&[1, 2, 3, 4, 5]);
        items[0].pinned = true;
        items[1].pinned = true;

        // Indices address the sortable tail [3, 4, 5].
        let out = apply_drag_end(&items, DragEnd::dropped(2, 0))
            .expect("in range")
            .expect("changed");
        assert_eq!(ids(&out), vec![1, 2, 5, 3, 4]);
        assert_eq!(&out[..2], &[
            Row { id: 1, pinned: true, position: 0 },
            Row { id: 2, pinned: true, position: 1 },
        ]);
    }

    #[test]
    fn test_fixed_items_scattered_are_moved_to_head() {
        let mut items = rows(&[1, 2, 3]);
        items[2].pinned = true;
        let parts = Partitioned::split(&items);
        assert_eq!(ids(&parts.fixed), vec![3]);
        assert_eq!(ids(&parts.sortable), vec![1, 2]);
        assert_eq!(ids(&parts.concat()), vec![3, 1, 2]);
    }

    #[test]
    fn test_drag_out_of_range_in_sortable_subset() {
        let mut items = rows(&[1, 2, 3]);
        items[0].pinned = true;
        assert_eq!(
            apply_drag_end(&items, DragEnd::dropped(0, 2)),
            Err(ReorderError::OutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_remove_and_upsert_keep_ids_unique_and_dense() {
        let items = rows(&[1, 2, 3]);
        let removed = remove_by_id(&items, 2);
        assert_eq!(ids(&removed), vec![1, 3]);
        assert_eq!(removed[1].position, 1);

        let updated = upsert_by_id(&removed, Row { id: 3, pinned: false, position: 99 });
        assert_eq!(ids(&updated), vec![1, 3]);
        assert_eq!(updated[1].position, 1);

        let appended = upsert_by_id(&updated, Row { id: 4, pinned: false, position: 0 });
        assert_eq!(ids(&appended), vec![1, 3, 4]);
        assert!(has_unique_ids(&appended));
        assert!(!has_unique_ids(&rows(&[1, 1])));
    }

    #[test]
    fn test_order_to_persist_reflects_later_edits() {
        // Drag, then delete one row and add a pinned one before the save goes out.
        let dragged = apply_drag_end(&rows(&[1, 2, 3]), DragEnd::dropped(0, 2))
            .expect("in range")
            .expect("changed");
        assert_eq!(ids(&dragged), vec![2, 3, 1]);

        let removed = remove_by_id(&dragged, 3);
        let pinned = Row {
            id: 9,
            pinned: true,
            position: 0,
        };
        let current = upsert_by_id(&removed, pinned);

        let out = order_to_persist(&current);
        assert_eq!(ids(&out), vec![9, 2, 1]);
        assert_eq!(out.iter().map(|r| r.position).collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
