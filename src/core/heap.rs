/// Starting capacity of the backing storage.
pub const INITIAL_CAPACITY: usize = 128;

/// Array-backed binary max-heap.
///
/// The greatest element under `T`'s `Ord` sits at the root. Callers choose what
/// "greatest" means through their `Ord` impl; [`Event`](crate::core::Event) orders
/// the earliest time as greatest, so `extract_max` yields the next event to process.
///
/// Elements that compare equal come out in no particular order. The heap is not
/// stable and callers must not rely on any tie-break between equal elements.
#[derive(Debug, Clone)]
pub struct Heap<T> {
    storage: Vec<T>,
}

impl<T: Ord> Heap<T> {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Vec::with_capacity(capacity.max(1)),
        }
    }

    /// Number of stored elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Allocated slots in the backing storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Greatest element without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.storage.first()
    }

    /// Logical storage in heap order: children of slot `i` live at `2i+1` and `2i+2`.
    pub fn as_slice(&self) -> &[T] {
        &self.storage
    }

    pub fn clear(&mut self) {
        self.storage.clear();
    }

    /// Insert `item`, doubling the backing storage first if it is full.
    pub fn insert(&mut self, item: T) {
        if self.storage.len() == self.storage.capacity() {
            let extra = self.storage.capacity().max(1);
            self.storage.reserve_exact(extra);
        }
        self.storage.push(item);
        self.sift_up(self.storage.len() - 1);
    }

    /// Remove and return the greatest element, or `None` when empty.
    pub fn extract_max(&mut self) -> Option<T> {
        if self.storage.is_empty() {
            return None;
        }
        let top = self.storage.swap_remove(0);
        if !self.storage.is_empty() {
            self.sift_down(0);
        }
        Some(top)
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.storage[idx] <= self.storage[parent] {
                break;
            }
            self.storage.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let n = self.storage.len();
        loop {
            let left = 2 * idx + 1;
            let right = left + 1;
            let mut largest = idx;
            if left < n && self.storage[left] > self.storage[largest] {
                largest = left;
            }
            if right < n && self.storage[right] > self.storage[largest] {
                largest = right;
            }
            if largest == idx {
                break;
            }
            self.storage.swap(idx, largest);
            idx = largest;
        }
    }
}

impl<T: Ord> Default for Heap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> Extend<T> for Heap<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}
