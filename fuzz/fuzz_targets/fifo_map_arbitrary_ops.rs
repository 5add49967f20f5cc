#![no_main]

use fifomap::FifoMap;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on FifoMap
//
// Tests random sequences of insert, remove, get, pop, peek, and clear
// operations to find edge cases and invariant violations in the map.
fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    // Use first byte to determine capacity (1-64)
    let capacity = (data[0] as usize) % 64 + 1;
    let mut map: FifoMap<u32, u32> = FifoMap::new(capacity);

    let mut idx = 1;
    while idx + 2 < data.len() {
        let op = data[idx] % 8;
        let key = u32::from(data[idx + 1]);
        let value = u32::from(data[idx + 2]);

        match op {
            0 | 1 => {
                // Insert (weighted heavier)
                map.insert(key, value);
            }
            2 => {
                map.remove(&key);
            }
            3 => {
                let _ = map.get(&key);
            }
            4 => {
                let _ = map.contains(&key);
            }
            5 => {
                let _ = map.pop_oldest();
            }
            6 => {
                let _ = map.peek_oldest();
            }
            7 => {
                map.clear();
            }
            _ => unreachable!(),
        }

        // Check basic consistency after each operation
        assert!(map.len() <= capacity);
        assert_eq!(map.is_empty(), map.len() == 0);
        assert!(map.order_len() <= 2 * map.len());

        #[cfg(debug_assertions)]
        map.check_invariants().unwrap();

        idx += 3;
    }

    // Draining must agree with iteration order
    let iterated: Vec<u32> = map.keys().copied().collect();
    let mut drained = Vec::new();
    while let Some((key, _)) = map.pop_oldest() {
        drained.push(key);
    }
    assert_eq!(iterated, drained);
});
