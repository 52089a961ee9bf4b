use crate::options::DEFAULT_INITIAL_BUCKETS;

/// Two-level bucket queue keyed by `(primary, secondary)` in lexicographic order.
///
/// Primary buckets hold resizable rows of secondary buckets. The cursor is a
/// key pair; it scans the secondary axis of the current primary bucket and
/// wraps to the next primary bucket once that row is exhausted.
#[derive(Clone, Debug)]
pub struct NestedBucketQueue<V> {
    buckets: Vec<Vec<Vec<V>>>,
    current: (usize, usize),
    len: usize,
    pushes: u32,
}

impl<V> Default for NestedBucketQueue<V> {
    fn default() -> Self {
        Self::with_buckets(DEFAULT_INITIAL_BUCKETS)
    }
}

impl<V> NestedBucketQueue<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buckets(n: usize) -> Self {
        let mut buckets = Vec::with_capacity(n.max(1));
        buckets.resize_with(n.max(1), || {
            let mut row = Vec::with_capacity(1);
            row.push(Vec::new());
            row
        });
        Self { buckets, current: (0, 0), len: 0, pushes: 0 }
    }

    fn grow<T>(v: &mut Vec<T>, key: usize, fill: impl FnMut() -> T) {
        let n = v.len();
        if key >= n {
            v.resize_with((key * 2 + 1).max(n * 2), fill);
        }
    }

    pub fn push(&mut self, primary: usize, secondary: usize, value: V) {
        assert!(self.pushes < u32::MAX, "nested bucket queue push counter overflow");
        self.pushes += 1;
        self.len += 1;
        Self::grow(&mut self.buckets, primary, Vec::new);
        Self::grow(&mut self.buckets[primary], secondary, Vec::new);
        if (primary, secondary) < self.current {
            self.current = (primary, secondary);
        }
        self.buckets[primary][secondary].push(value);
    }

    /// Move the cursor to the smallest non-empty bucket.
    fn advance(&mut self) {
        loop {
            let (p, s) = self.current;
            let row = &self.buckets[p];
            match row.get(s) {
                Some(bucket) if !bucket.is_empty() => return,
                Some(_) => self.current = (p, s + 1),
                None => self.current = (p + 1, 0),
            }
        }
    }

    pub fn pop(&mut self) -> Option<(usize, usize, V)> {
        if self.len == 0 {
            return None;
        }
        self.advance();
        let (p, s) = self.current;
        let value = self.buckets[p][s].pop()?;
        self.len -= 1;
        Some((p, s, value))
    }

    pub fn clear(&mut self) {
        let (mut p, mut s) = self.current;
        while self.len != 0 {
            if let Some(bucket) = self.buckets[p].get_mut(s) {
                debug_assert!(bucket.len() <= self.len);
                self.len -= bucket.len();
                bucket.clear();
                s += 1;
            } else {
                p += 1;
                s = 0;
            }
        }
        self.current = (0, 0);
        self.pushes = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn pushes(&self) -> u32 {
        self.pushes
    }

    pub fn add_virtual_pushes(&mut self, n: u32) {
        self.pushes = self.pushes.checked_add(n).unwrap_or(u32::MAX);
    }
}
