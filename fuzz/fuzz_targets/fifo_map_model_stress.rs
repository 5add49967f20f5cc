#![no_main]

use std::collections::VecDeque;

use fifomap::FifoMap;
use libfuzzer_sys::fuzz_target;

// Fuzz FifoMap against a naive ordered-vec model
//
// Every operation runs on both structures; any divergence in return values
// or in the live contents is a bug in the map's lazy bookkeeping.

struct Model {
    capacity: usize,
    entries: VecDeque<(u32, u32)>,
}

impl Model {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::new(),
        }
    }

    fn insert(&mut self, key: u32, value: u32) -> Option<u32> {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((key, value));
        None
    }

    fn get(&self, key: u32) -> Option<u32> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    fn remove(&mut self, key: u32) -> Option<u32> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        self.entries.remove(pos).map(|(_, v)| v)
    }

    fn pop_oldest(&mut self) -> Option<(u32, u32)> {
        self.entries.pop_front()
    }

    fn contains(&self, key: u32) -> bool {
        self.entries.iter().any(|(k, _)| *k == key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn keys(&self) -> Vec<u32> {
        self.entries.iter().map(|(k, _)| *k).collect()
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let capacity = (data[0] as usize) % 32 + 1;
    let mut map: FifoMap<u32, u32> = FifoMap::new(capacity);
    let mut model = Model::new(capacity);

    let mut idx = 1;
    while idx + 2 < data.len() {
        let op = data[idx] % 6;
        // Narrow key space so overwrites and re-inserts happen often
        let key = u32::from(data[idx + 1]) % 48;
        let value = u32::from(data[idx + 2]);

        match op {
            0 | 1 => {
                assert_eq!(map.insert(key, value), model.insert(key, value));
            }
            2 => {
                assert_eq!(map.remove(&key), model.remove(key));
            }
            3 => {
                assert_eq!(map.get(&key).copied(), model.get(key));
            }
            4 => {
                assert_eq!(map.pop_oldest(), model.pop_oldest());
            }
            5 => {
                assert_eq!(map.contains(&key), model.contains(key));
            }
            _ => unreachable!(),
        }

        assert_eq!(map.len(), model.len());
        let keys: Vec<u32> = map.keys().copied().collect();
        assert_eq!(keys, model.keys());

        idx += 3;
    }
});
