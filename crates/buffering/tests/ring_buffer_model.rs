use std::collections::VecDeque;
use std::sync::Arc;

use proptest::prelude::*;
use sensorring_buffering::{BufferError, NullSink, RingBuffer};

#[derive(Debug, Clone)]
enum Op {
    Write(i32),
    Push(i32),
    Pop,
    Read,
    Grow(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<i32>().prop_map(Op::Write),
        2 => any::<i32>().prop_map(Op::Push),
        3 => Just(Op::Pop),
        1 => Just(Op::Read),
        1 => (0usize..4).prop_map(Op::Grow),
    ]
}

fn quiet(capacity: usize) -> RingBuffer<i32> {
    RingBuffer::<i32>::with_sink(capacity, Arc::new(NullSink)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn matches_deque_model(capacity in 1usize..8, ops in prop::collection::vec(op_strategy(), 0..64)) {
        let mut buffer = quiet(capacity);
        let mut model: VecDeque<i32> = VecDeque::new();
        let mut model_capacity = capacity;

        for op in ops {
            match op {
                Op::Write(value) => {
                    let result = buffer.write(value);
                    if model.len() == model_capacity {
                        prop_assert_eq!(result, Err(BufferError::Full { capacity: model_capacity }));
                    } else {
                        prop_assert_eq!(result, Ok(()));
                        model.push_back(value);
                    }
                }
                Op::Push(value) => {
                    let expected = if model.len() == model_capacity {
                        model.pop_front()
                    } else {
                        None
                    };
                    model.push_back(value);
                    prop_assert_eq!(buffer.push(value), Ok(expected));
                }
                Op::Pop => {
                    prop_assert_eq!(buffer.pop().ok(), model.pop_front());
                }
                Op::Read => {
                    prop_assert_eq!(buffer.read().ok(), model.front().copied());
                }
                Op::Grow(extra) => {
                    model_capacity += extra;
                    prop_assert_eq!(buffer.resize(model_capacity), Ok(()));
                }
            }

            prop_assert_eq!(buffer.len(), model.len());
            prop_assert_eq!(buffer.capacity(), model_capacity);
            prop_assert_eq!(buffer.is_empty(), model.is_empty());
            prop_assert_eq!(buffer.is_full(), model.len() == model_capacity);
            prop_assert_eq!(buffer.iter().copied().collect::<Vec<_>>(), model.iter().copied().collect::<Vec<_>>());
        }
    }

    #[test]
    fn resize_does_not_change_drain_order(
        capacity in 1usize..8,
        values in prop::collection::vec(any::<i32>(), 0..16),
        popped in 0usize..8,
        extra in 0usize..8,
    ) {
        let mut plain = quiet(capacity);
        let mut grown = quiet(capacity);
        for &value in &values {
            plain.push(value).unwrap();
            grown.push(value).unwrap();
        }
        for _ in 0..popped {
            let _ = plain.pop();
            let _ = grown.pop();
        }

        grown.resize(capacity + extra).unwrap();

        prop_assert_eq!(plain.drain().collect::<Vec<_>>(), grown.drain().collect::<Vec<_>>());
    }

    #[test]
    fn fifo_under_capacity(values in prop::collection::vec(any::<i32>(), 1..32)) {
        let mut buffer = quiet(values.len());
        for &value in &values {
            buffer.write(value).unwrap();
        }
        prop_assert!(buffer.is_full());
        prop_assert_eq!(buffer.drain().collect::<Vec<_>>(), values);
        prop_assert!(buffer.is_empty());
    }
}
