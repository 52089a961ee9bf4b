use crate::options::DEFAULT_INITIAL_BUCKETS;

/// A bucket-based min-priority queue with O(1) amortized push/pop.
///
/// Keys are small non-negative integers (relaxed costs). Each key owns a
/// bucket; a scan cursor walks forward over the buckets and only retreats
/// when a key below it is pushed. Within a bucket entries come out in
/// reverse insertion order.
#[derive(Clone, Debug)]
pub struct BucketQueue<V> {
    buckets: Vec<Vec<V>>,
    current_bucket: usize,
    len: usize,
    pushes: u32,
}

impl<V> Default for BucketQueue<V> {
    fn default() -> Self {
        Self::with_buckets(DEFAULT_INITIAL_BUCKETS)
    }
}

impl<V> BucketQueue<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue with `n` preallocated buckets.
    pub fn with_buckets(n: usize) -> Self {
        let mut buckets = Vec::with_capacity(n.max(1));
        buckets.resize_with(n.max(1), Vec::new);
        Self { buckets, current_bucket: 0, len: 0, pushes: 0 }
    }

    /// Grow to fit `key`, at least doubling the bucket array.
    fn ensure_bucket_capacity(&mut self, key: usize) {
        let n = self.buckets.len();
        if key >= n {
            let target = (key * 2 + 1).max(n * 2);
            self.buckets.resize_with(target, Vec::new);
        }
    }

    pub fn push(&mut self, key: usize, value: V) {
        assert!(self.pushes < u32::MAX, "bucket queue push counter overflow");
        self.pushes += 1;
        self.len += 1;
        self.ensure_bucket_capacity(key);
        if key < self.current_bucket {
            self.current_bucket = key;
        }
        self.buckets[key].push(value);
    }

    /// Remove the most recently pushed entry among those with the smallest key.
    pub fn pop(&mut self) -> Option<(usize, V)> {
        if self.len == 0 {
            return None;
        }
        while self.buckets[self.current_bucket].is_empty() {
            self.current_bucket += 1;
        }
        let value = self.buckets[self.current_bucket].pop()?;
        self.len -= 1;
        Some((self.current_bucket, value))
    }

    /// Drop every entry and rewind the cursor, keeping bucket storage.
    pub fn clear(&mut self) {
        let mut i = self.current_bucket;
        while self.len != 0 {
            let bucket = &mut self.buckets[i];
            debug_assert!(bucket.len() <= self.len);
            self.len -= bucket.len();
            bucket.clear();
            i += 1;
        }
        self.current_bucket = 0;
        self.pushes = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Pushes since construction or the last `clear`, virtual ones included.
    pub fn pushes(&self) -> u32 {
        self.pushes
    }

    /// Account for pushes that were performed elsewhere on behalf of this queue.
    pub fn add_virtual_pushes(&mut self, n: u32) {
        self.pushes = self.pushes.checked_add(n).unwrap_or(u32::MAX);
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}
