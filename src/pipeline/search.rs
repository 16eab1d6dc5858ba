/// Binary search over `items`, sorted ascending by whatever key `cmp`
/// compares against `target`.
///
/// `cmp(item, target)` returns a negative number when `item` sorts before the
/// target, zero on a match and a positive number when it sorts after.
///
/// Returns the index of a matching item, or `!insertion_index` when there is
/// no match, so a negative result always means "not found" and `!result` is
/// the index of the first item after the target.
pub fn search<T, K, F>(items: &[T], target: &K, mut cmp: F) -> isize
where
    F: FnMut(&T, &K) -> i64,
{
    let mut low = 0usize;
    let mut high = items.len();

    while low < high {
        let mid = low + (high - low) / 2;
        let order = cmp(&items[mid], target);
        if order < 0 {
            low = mid + 1;
        } else if order > 0 {
            high = mid;
        } else {
            return mid as isize;
        }
    }

    !(low as isize)
}
