#![no_main]

use std::collections::VecDeque;

use fifomap::order::OrderQueue;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on OrderQueue
//
// Runs the queue in lockstep with an eagerly maintained VecDeque of live
// keys, so any stale-entry mishandling in the lazy queue shows up as a
// divergence.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let mut queue: OrderQueue<u32> = OrderQueue::new();
    let mut live: VecDeque<u32> = VecDeque::new();

    let mut idx = 0;
    while idx + 1 < data.len() {
        let op = data[idx] % 9;
        let key = u32::from(data[idx + 1]) % 32;

        match op {
            0 | 1 | 2 => {
                // Push (re-pushing a live key moves it to the back)
                queue.push_back(key);
                if let Some(pos) = live.iter().position(|k| *k == key) {
                    live.remove(pos);
                }
                live.push_back(key);
            }
            3 => {
                let removed = queue.remove(&key);
                let pos = live.iter().position(|k| *k == key);
                assert_eq!(removed, pos.is_some());
                if let Some(pos) = pos {
                    live.remove(pos);
                }
            }
            4 => {
                assert_eq!(queue.pop_front(), live.pop_front());
            }
            5 => {
                assert_eq!(queue.front(), live.front());
            }
            6 => {
                assert_eq!(queue.contains(&key), live.contains(&key));
                assert_eq!(queue.rank(&key), live.iter().position(|k| *k == key));
            }
            7 => {
                queue.compact();
                assert_eq!(queue.order_len(), queue.len());
            }
            8 => {
                queue.clear();
                live.clear();
            }
            _ => unreachable!(),
        }

        assert_eq!(queue.len(), live.len());
        assert_eq!(queue.is_empty(), live.is_empty());
        queue.debug_validate_invariants();

        idx += 2;
    }

    // Full drain agrees with the model
    let drained: Vec<u32> = std::iter::from_fn(|| queue.pop_front()).collect();
    let expected: Vec<u32> = live.into_iter().collect();
    assert_eq!(drained, expected);
});
