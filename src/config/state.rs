use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct State {
    pub counter: Counter,
}

/// Daily invoice sequence. The sequence belongs to a single day key
/// (YYYYMMDD) and resets at local midnight.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Counter {
    #[serde(default)]
    pub last_day: String,
    #[serde(default)]
    pub last_number: u32,
}

impl Counter {
    /// Sequence number the next invoice for `day_key` will get, without
    /// committing it.
    pub fn peek(&self, day_key: &str) -> u32 {
        if self.last_day == day_key {
            self.last_number + 1
        } else {
            1
        }
    }

    /// Commit the next sequence number for `day_key`. Monotonic within a
    /// day; a new day key resets the sequence to 1.
    pub fn next(&mut self, day_key: &str) -> u32 {
        let seq = self.peek(day_key);
        self.last_day = day_key.to_string();
        self.last_number = seq;
        seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_day_increments() {
        let mut counter = Counter::default();
        assert_eq!(counter.next("20240101"), 1);
        assert_eq!(counter.next("20240101"), 2);
        assert_eq!(counter.next("20240101"), 3);
    }

    #[test]
    fn new_day_resets_to_one() {
        let mut counter = Counter::default();
        assert_eq!(counter.next("20240101"), 1);
        assert_eq!(counter.next("20240101"), 2);
        assert_eq!(counter.next("20240102"), 1);
        assert_eq!(counter.next("20240102"), 2);
    }

    #[test]
    fn peek_does_not_commit() {
        let mut counter = Counter::default();
        assert_eq!(counter.peek("20240101"), 1);
        assert_eq!(counter.peek("20240101"), 1);
        assert_eq!(counter.next("20240101"), 1);
        assert_eq!(counter.peek("20240101"), 2);
    }
}
