/// Moves the head of `queue` to the back: `[a0, a1, .., an] -> [a1, .., an, a0]`.
///
/// The result is built from the untouched input, so no slot is read after it
/// has been written. Queues of length zero or one come back unchanged.
pub fn rotate_left_by_one<T: Clone>(queue: &[T]) -> Vec<T> {
    match queue.split_first() {
        Some((head, rest)) if !rest.is_empty() => {
            let mut rotated = Vec::with_capacity(queue.len());
            rotated.extend_from_slice(rest);
            rotated.push(head.clone());
            rotated
        }
        _ => queue.to_vec(),
    }
}

/// In-place variant of [`rotate_left_by_one`].
pub fn rotate_queue<T>(queue: &mut [T]) {
    if queue.len() > 1 {
        queue.rotate_left(1);
    }
}
