//! Property-based tests for the deque implementations using proptest
//!
//! The sequential backings are checked against a straightforward `Vec`
//! model; the concurrent deque is checked for the transfer-idempotence
//! and conservation properties that must hold regardless of how
//! operations interleave with the two-buffer transfer.

use super::*;
use proptest::prelude::*;

/// A single operation against the deque model.
#[derive(Debug, Clone)]
enum Op {
    Push(i32),
    Pop,
    Enqueue(i32),
    Dequeue,
    RemoveAt(usize),
    Reverse,
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<i32>().prop_map(Op::Push),
        Just(Op::Pop),
        any::<i32>().prop_map(Op::Enqueue),
        Just(Op::Dequeue),
        (0usize..20).prop_map(Op::RemoveAt),
        Just(Op::Reverse),
        Just(Op::Clear),
    ]
}

/// Apply an operation to both the deque under test and the Vec model,
/// asserting agreement on every returned value.
fn apply<D: Deque<i32>>(deque: &mut D, model: &mut Vec<i32>, op: &Op) {
    match op {
        Op::Push(v) => {
            deque.push(*v);
            model.push(*v);
        }
        Op::Pop => {
            assert_eq!(deque.pop(), model.pop());
        }
        Op::Enqueue(v) => {
            deque.enqueue(*v);
            model.push(*v);
        }
        Op::Dequeue => {
            let expected = if model.is_empty() {
                None
            } else {
                Some(model.remove(0))
            };
            assert_eq!(deque.dequeue(), expected);
        }
        Op::RemoveAt(index) => {
            let expected = if *index < model.len() {
                Some(model.remove(*index))
            } else {
                None
            };
            assert_eq!(deque.remove_at(*index), expected);
        }
        Op::Reverse => {
            deque.reverse();
            model.reverse();
        }
        Op::Clear => {
            deque.clear();
            model.clear();
        }
    }
}

proptest! {
    #[test]
    fn test_array_deque_matches_vec_model(ops in prop::collection::vec(op_strategy(), 0..100)) {
        let mut deque: ArrayDeque<i32> = ArrayDeque::new();
        let mut model: Vec<i32> = Vec::new();

        for op in &ops {
            apply(&mut deque, &mut model, op);
            prop_assert_eq!(deque.len(), model.len());
            prop_assert_eq!(deque.front(), model.first());
            prop_assert_eq!(deque.back(), model.last());
        }
        prop_assert_eq!(deque.to_vec(), model);
    }

    #[test]
    fn test_linked_deque_matches_vec_model(ops in prop::collection::vec(op_strategy(), 0..100)) {
        let mut deque: LinkedDeque<i32> = LinkedDeque::new();
        let mut model: Vec<i32> = Vec::new();

        for op in &ops {
            apply(&mut deque, &mut model, op);
            prop_assert_eq!(deque.len(), model.len());
        }
        prop_assert_eq!(deque.to_vec(), model);
    }

    #[test]
    fn test_backings_agree_with_each_other(ops in prop::collection::vec(op_strategy(), 0..100)) {
        let mut array: ArrayDeque<i32> = ArrayDeque::new();
        let mut linked: LinkedDeque<i32> = LinkedDeque::new();
        let mut model_a: Vec<i32> = Vec::new();
        let mut model_b: Vec<i32> = Vec::new();

        for op in &ops {
            apply(&mut array, &mut model_a, op);
            apply(&mut linked, &mut model_b, op);
        }
        prop_assert_eq!(array.to_vec(), linked.to_vec());
    }

    /// Transfer idempotence: N enqueues with no concurrent writers drain
    /// in exact order, then stay empty, no matter where dequeues split
    /// the sequence across the two buffers.
    #[test]
    fn test_concurrent_deque_transfer_idempotence(
        values in prop::collection::vec(any::<i32>(), 0..200),
        split in 0usize..200,
    ) {
        let deque: ConcurrentArrayDeque<i32> = ConcurrentArrayDeque::new();
        let split = split.min(values.len());

        for &v in &values[..split] {
            deque.enqueue(v);
        }
        let mut drained = Vec::new();
        // Interleave a partial drain to force a transfer mid-sequence.
        if split > 0 {
            drained.extend(deque.dequeue());
        }
        for &v in &values[split..] {
            deque.enqueue(v);
        }
        while let Some(v) = deque.dequeue() {
            drained.push(v);
        }

        prop_assert_eq!(drained, values);
        prop_assert!(deque.is_empty());
        prop_assert_eq!(deque.dequeue(), None);
    }

    /// The logical snapshot always equals out-buffer contents followed by
    /// in-buffer contents, which for pure FIFO use is enqueue order.
    #[test]
    fn test_concurrent_deque_snapshot_order(
        values in prop::collection::vec(any::<i32>(), 0..100),
        drains in 0usize..100,
    ) {
        let deque: ConcurrentArrayDeque<i32> = ConcurrentArrayDeque::new();
        for &v in &values {
            deque.enqueue(v);
        }
        let drains = drains.min(values.len());
        for _ in 0..drains {
            deque.dequeue();
        }
        prop_assert_eq!(deque.to_vec(), values[drains..].to_vec());
    }
}
