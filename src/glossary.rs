use alloc::vec::Vec;
use core::fmt;
use core::fmt::Debug;
use core::mem;

use crate::primes;

/// Base of the free-list encoding in `Entry::next`.
///
/// A live entry stores its chain successor (`>= 0`) or `-1` for end of
/// chain. A free entry stores `START_OF_FREE_LIST - next_free_index`, which
/// is always `<= -2`, so `next < -1` doubles as the "this slot is free"
/// test without a separate tag field.
const START_OF_FREE_LIST: i32 = -3;

/// Errors reported by [`Glossary`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The key already has a live entry; [`Glossary::insert`] never
    /// overwrites silently.
    DuplicateKey(i32),
    /// No live entry matches the key.
    KeyNotFound(i32),
    /// A [`ValueRef`] obtained from a failed lookup was dereferenced.
    InvalidReference,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DuplicateKey(key) => write!(f, "key {key} already exists"),
            Error::KeyNotFound(key) => write!(f, "key {key} isn't found"),
            Error::InvalidReference => write!(f, "reference does not point at a live entry"),
        }
    }
}

impl core::error::Error for Error {}

#[derive(Clone, Default)]
struct Entry<V> {
    next: i32,
    key: i32,
    value: V,
}

impl<V> Entry<V> {
    #[inline(always)]
    fn is_live(&self) -> bool {
        self.next >= -1
    }
}

/// An integer-keyed hash table with index-linked collision chains.
///
/// `Glossary<V>` maps `i32` keys to values stored by value in a contiguous
/// slot array. Collision chains and the deleted-slot free list are threaded
/// through that same array with integer indices, so no operation allocates
/// per entry. Keys hash by `key mod capacity` with capacities drawn from
/// [`crate::primes::next_prime`], and there is no hasher to configure.
///
/// Mutating operations require `V: Default`: slots are default-initialized
/// when claimed and reset to `V::default()` when their entry is removed, so
/// payload-held resources are released eagerly rather than lingering in a
/// dead slot.
///
/// ## Performance characteristics
///
/// - Insert, lookup, and removal are amortized O(1); growth and
///   [`trim_excess`](Glossary::trim_excess) are O(capacity) rehashes.
/// - Per-entry overhead is two `i32`s (`next` link and key) plus one bucket
///   index amortized across the table.
/// - Borrows returned by [`insert_slot`](Glossary::insert_slot),
///   [`get_mut`](Glossary::get_mut), and friends are invalidated by any
///   structural mutation; unlike the equivalent contract in a
///   garbage-collected language, the borrow checker enforces this.
///
/// ## Example
///
/// ```rust
/// # use glossary::Glossary;
/// #
/// let mut table: Glossary<u64> = Glossary::new();
/// table.insert(17, 1700).unwrap();
///
/// *table.get_mut(17).unwrap() += 1;
/// assert_eq!(table.get(17), Some(&1701));
/// assert_eq!(table.remove(17), Some(1701));
/// assert!(table.is_empty());
/// ```
#[derive(Clone)]
pub struct Glossary<V> {
    buckets: Vec<i32>,
    entries: Vec<Entry<V>>,
    count: usize,
    free_count: usize,
    free_list: i32,
}

impl<V> Glossary<V> {
    /// Creates an empty table with zero capacity.
    ///
    /// No allocation happens until the first insert.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Glossary;
    /// #
    /// let table: Glossary<u32> = Glossary::new();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            entries: Vec::new(),
            count: 0,
            free_count: 0,
            free_list: 0,
        }
    }

    /// Returns the number of live entries.
    ///
    /// This is the high-water mark of allocated slots minus the slots
    /// currently parked on the free list, and is O(1).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Glossary;
    /// #
    /// let mut table: Glossary<u32> = Glossary::new();
    /// table.insert(1, 10).unwrap();
    /// table.insert(2, 20).unwrap();
    /// table.remove(1);
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.count - self.free_count
    }

    /// Returns `true` if the table contains no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the current slot capacity.
    ///
    /// Zero for a table that has never allocated; otherwise a prime (or,
    /// after [`trim_excess`](Glossary::trim_excess), exactly the live count
    /// at the time of trimming).
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if the table has a live entry for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Glossary;
    /// #
    /// let mut table: Glossary<u32> = Glossary::new();
    /// table.insert(5, 50).unwrap();
    /// assert!(table.contains_key(5));
    /// assert!(!table.contains_key(6));
    /// ```
    pub fn contains_key(&self, key: i32) -> bool {
        self.find_index(key).is_some()
    }

    /// Returns a borrow of the value for `key`, or `None` if absent.
    ///
    /// Never allocates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Glossary;
    /// #
    /// let mut table: Glossary<u32> = Glossary::new();
    /// table.insert(5, 50).unwrap();
    /// assert_eq!(table.get(5), Some(&50));
    /// assert_eq!(table.get(6), None);
    /// ```
    pub fn get(&self, key: i32) -> Option<&V> {
        self.find_index(key).map(|index| &self.entries[index].value)
    }

    /// Returns a mutable borrow of the value for `key`, or `None` if
    /// absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Glossary;
    /// #
    /// let mut table: Glossary<u32> = Glossary::new();
    /// table.insert(5, 50).unwrap();
    /// *table.get_mut(5).unwrap() = 51;
    /// assert_eq!(table.get(5), Some(&51));
    /// ```
    pub fn get_mut(&mut self, key: i32) -> Option<&mut V> {
        self.find_index(key)
            .map(|index| &mut self.entries[index].value)
    }

    /// Returns a borrow of the value for `key`, failing with
    /// [`Error::KeyNotFound`] if absent.
    ///
    /// Use [`get`](Glossary::get) when absence is an expected outcome
    /// rather than an error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Error;
    /// # use glossary::Glossary;
    /// #
    /// let mut table: Glossary<u32> = Glossary::new();
    /// table.insert(5, 50).unwrap();
    /// assert_eq!(table.value(5), Ok(&50));
    /// assert_eq!(table.value(6), Err(Error::KeyNotFound(6)));
    /// ```
    pub fn value(&self, key: i32) -> Result<&V, Error> {
        self.get(key).ok_or(Error::KeyNotFound(key))
    }

    /// Returns a mutable borrow of the value for `key`, failing with
    /// [`Error::KeyNotFound`] if absent.
    pub fn value_mut(&mut self, key: i32) -> Result<&mut V, Error> {
        match self.find_index(key) {
            Some(index) => Ok(&mut self.entries[index].value),
            None => Err(Error::KeyNotFound(key)),
        }
    }

    /// Looks up `key` and returns a [`ValueRef`] recording the outcome.
    ///
    /// Unlike [`get_mut`](Glossary::get_mut), the result can be passed
    /// around and queried for success before dereferencing; dereferencing a
    /// missed lookup fails with [`Error::InvalidReference`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Error;
    /// # use glossary::Glossary;
    /// #
    /// let mut table: Glossary<u32> = Glossary::new();
    /// table.insert(5, 50).unwrap();
    ///
    /// let mut hit = table.value_ref(5);
    /// assert!(hit.found());
    /// *hit.get_mut().unwrap() += 1;
    ///
    /// let miss = table.value_ref(6);
    /// assert!(!miss.found());
    /// assert_eq!(miss.get(), Err(Error::InvalidReference));
    /// ```
    pub fn value_ref(&mut self, key: i32) -> ValueRef<'_, V> {
        ValueRef {
            value: self
                .find_index(key)
                .map(|index| &mut self.entries[index].value),
        }
    }

    /// Returns `true` if any live entry's value equals `value`.
    ///
    /// Linear scan over all touched slots; O(n) and intended for
    /// diagnostics and tests, not hot paths.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.contains_value_by(|candidate| candidate == value)
    }

    /// Returns `true` if any live entry's value satisfies `eq`.
    ///
    /// The predicate-taking form of
    /// [`contains_value`](Glossary::contains_value), for payload types with
    /// a comparison other than `PartialEq`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Glossary;
    /// #
    /// let mut table: Glossary<f32> = Glossary::new();
    /// table.insert(1, 1.5).unwrap();
    /// assert!(table.contains_value_by(|v| (v - 1.5).abs() < 1e-6));
    /// assert!(!table.contains_value_by(|v| *v > 2.0));
    /// ```
    pub fn contains_value_by(&self, eq: impl Fn(&V) -> bool) -> bool {
        self.entries[..self.count]
            .iter()
            .any(|entry| entry.is_live() && eq(&entry.value))
    }

    /// Returns an iterator over live entries as `(key, &value)` pairs.
    ///
    /// Entries are yielded in increasing slot-index order, which is not
    /// insertion order once removals have recycled slots.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Glossary;
    /// #
    /// let mut table: Glossary<u32> = Glossary::new();
    /// table.insert(1, 10).unwrap();
    /// table.insert(2, 20).unwrap();
    ///
    /// let entries: Vec<(i32, u32)> = table.iter().map(|(k, v)| (k, *v)).collect();
    /// assert_eq!(entries, vec![(1, 10), (2, 20)]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            entries: &self.entries[..self.count],
            index: 0,
        }
    }

    /// Returns an iterator over live entries as `(key, &mut value)` pairs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Glossary;
    /// #
    /// let mut table: Glossary<u32> = Glossary::new();
    /// table.insert(1, 10).unwrap();
    /// table.insert(2, 20).unwrap();
    ///
    /// for (_, value) in table.iter_mut() {
    ///     *value *= 2;
    /// }
    /// assert_eq!(table.get(2), Some(&40));
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            entries: self.entries[..self.count].iter_mut(),
        }
    }

    #[inline(always)]
    fn bucket_of(&self, key: i32) -> usize {
        // Two's-complement reinterpretation so negative keys spread over
        // the full bucket range.
        (key as u32 as usize) % self.buckets.len()
    }

    fn find_index(&self, key: i32) -> Option<usize> {
        if self.count == 0 {
            return None;
        }

        let mut i = self.buckets[self.bucket_of(key)] - 1;
        while i >= 0 {
            let entry = &self.entries[i as usize];
            if entry.key == key {
                return Some(i as usize);
            }
            i = entry.next;
        }

        None
    }
}

impl<V: Default> Glossary<V> {
    /// Creates an empty table sized for at least `capacity` entries.
    ///
    /// The hint is rounded up to the next curated prime; a hint of zero
    /// defers allocation until the first insert.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Glossary;
    /// #
    /// let table: Glossary<u32> = Glossary::with_capacity(4);
    /// assert_eq!(table.capacity(), 7);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            return Self::new();
        }

        let capacity = primes::next_prime(capacity);
        let mut entries = Vec::new();
        entries.resize_with(capacity, Entry::default);

        Self {
            buckets: alloc::vec![0; capacity],
            entries,
            count: 0,
            free_count: 0,
            free_list: 0,
        }
    }

    /// Inserts `key` mapped to `value`.
    ///
    /// Fails with [`Error::DuplicateKey`] if the key already has a live
    /// entry, leaving the table unchanged; callers wanting upsert semantics
    /// should check [`get_mut`](Glossary::get_mut) first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Error;
    /// # use glossary::Glossary;
    /// #
    /// let mut table: Glossary<u32> = Glossary::new();
    /// assert_eq!(table.insert(5, 50), Ok(()));
    /// assert_eq!(table.insert(5, 51), Err(Error::DuplicateKey(5)));
    /// assert_eq!(table.get(5), Some(&50));
    /// ```
    pub fn insert(&mut self, key: i32, value: V) -> Result<(), Error> {
        let slot = self.insert_slot(key)?;
        *slot = value;
        Ok(())
    }

    /// Claims a slot for `key` and returns a mutable borrow of its value
    /// for in-place initialization.
    ///
    /// The returned slot holds `V::default()`. Building the value through
    /// the borrow avoids the second chain walk a lookup-after-insert would
    /// cost. The slot comes from the free list when one is available,
    /// otherwise from the tail of the entry array, growing the table first
    /// if the tail is exhausted.
    ///
    /// Fails with [`Error::DuplicateKey`] if the key already has a live
    /// entry, leaving the table unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Glossary;
    /// #
    /// let mut table: Glossary<Vec<u32>> = Glossary::new();
    /// table.insert_slot(3).unwrap().extend([1, 2, 3]);
    /// assert_eq!(table.get(3), Some(&vec![1, 2, 3]));
    /// ```
    pub fn insert_slot(&mut self, key: i32) -> Result<&mut V, Error> {
        if self.buckets.is_empty() {
            self.resize();
        }

        let mut bucket = self.bucket_of(key);
        let mut i = self.buckets[bucket] - 1;
        while i >= 0 {
            let entry = &self.entries[i as usize];
            if entry.key == key {
                return Err(Error::DuplicateKey(key));
            }
            i = entry.next;
        }

        let index;
        if self.free_count > 0 {
            index = self.free_list as usize;
            self.free_list = START_OF_FREE_LIST - self.entries[index].next;
            self.free_count -= 1;
        } else {
            if self.count == self.entries.len() {
                self.resize();
                bucket = self.bucket_of(key);
            }
            index = self.count;
            self.count += 1;
        }

        let head = self.buckets[bucket];
        self.buckets[bucket] = index as i32 + 1;

        let entry = &mut self.entries[index];
        entry.key = key;
        entry.next = head - 1;
        Ok(&mut entry.value)
    }

    /// Removes the entry for `key`, returning its value.
    ///
    /// The slot is reset to `V::default()` and pushed onto the free list
    /// for reuse by a later insert; the slot array never shrinks here. A
    /// missing key is reported as `None`, never as an error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Glossary;
    /// #
    /// let mut table: Glossary<u32> = Glossary::new();
    /// table.insert(5, 50).unwrap();
    /// assert_eq!(table.remove(5), Some(50));
    /// assert_eq!(table.remove(5), None);
    /// ```
    pub fn remove(&mut self, key: i32) -> Option<V> {
        if self.count == 0 {
            return None;
        }

        let bucket = self.bucket_of(key);
        let mut last: i32 = -1;
        let mut i = self.buckets[bucket] - 1;

        while i >= 0 {
            let next = self.entries[i as usize].next;
            if self.entries[i as usize].key == key {
                if last < 0 {
                    self.buckets[bucket] = next + 1;
                } else {
                    self.entries[last as usize].next = next;
                }

                let entry = &mut self.entries[i as usize];
                let value = mem::take(&mut entry.value);
                entry.next = START_OF_FREE_LIST - self.free_list;

                self.free_list = i;
                self.free_count += 1;
                return Some(value);
            }

            last = i;
            i = next;
        }

        None
    }

    /// Removes all entries, keeping the allocated capacity.
    ///
    /// O(capacity): every touched slot is reset to its default state.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Glossary;
    /// #
    /// let mut table: Glossary<u32> = Glossary::with_capacity(10);
    /// table.insert(1, 10).unwrap();
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 11);
    /// ```
    pub fn clear(&mut self) {
        if self.count == 0 {
            return;
        }

        self.buckets.fill(0);
        for entry in &mut self.entries {
            *entry = Entry::default();
        }

        self.count = 0;
        self.free_count = 0;
        self.free_list = 0;
    }

    /// Rebuilds the table at exactly its live entry count.
    ///
    /// Live slots are compacted in index order into fresh arrays and
    /// rechained against the smaller capacity; free slots are discarded.
    /// Afterwards no free slots remain, so the next insert past capacity
    /// grows the table. An empty table is shrunk to zero capacity.
    ///
    /// This is the only operation that renumbers surviving slots. Entries
    /// stay reachable by key, but any index-derived bookkeeping a caller
    /// kept is stale afterwards (borrows, as always, are statically ended).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use glossary::Glossary;
    /// #
    /// let mut table: Glossary<u32> = Glossary::with_capacity(100);
    /// for key in 0..10 {
    ///     table.insert(key, key as u32).unwrap();
    /// }
    /// table.remove(3);
    ///
    /// table.trim_excess();
    /// assert_eq!(table.capacity(), 9);
    /// assert_eq!(table.len(), 9);
    /// assert_eq!(table.get(7), Some(&7));
    /// ```
    pub fn trim_excess(&mut self) {
        let live = self.len();
        if live == 0 {
            self.buckets = Vec::new();
            self.entries = Vec::new();
            self.count = 0;
            self.free_count = 0;
            self.free_list = 0;
            return;
        }

        let old_entries = mem::take(&mut self.entries);
        let mut buckets = alloc::vec![0i32; live];
        let mut entries = Vec::with_capacity(live);

        for old in old_entries.into_iter().take(self.count) {
            if !old.is_live() {
                continue;
            }

            let bucket = (old.key as u32 as usize) % live;
            let index = entries.len();
            entries.push(Entry {
                next: buckets[bucket] - 1,
                key: old.key,
                value: old.value,
            });
            buckets[bucket] = index as i32 + 1;
        }

        debug_assert_eq!(entries.len(), live);
        self.buckets = buckets;
        self.entries = entries;
        self.count = live;
        self.free_count = 0;
        self.free_list = 0;
    }

    /// Grows to the next prime at or above `max(4, 2 * count)` and
    /// rechains every live slot against the new modulus.
    ///
    /// Slot indices are preserved, so chain links stay valid as written and
    /// only the bucket heads change. Free-list slots keep their encoded
    /// links and are skipped; free-list state survives growth untouched.
    fn resize(&mut self) {
        let new_size = primes::next_prime(if self.count == 0 { 4 } else { self.count * 2 });

        let mut buckets = alloc::vec![0i32; new_size];
        self.entries.resize_with(new_size, Entry::default);

        for i in 0..self.count {
            if !self.entries[i].is_live() {
                continue;
            }

            let bucket = (self.entries[i].key as u32 as usize) % new_size;
            self.entries[i].next = buckets[bucket] - 1;
            buckets[bucket] = i as i32 + 1;
        }

        self.buckets = buckets;
    }
}

impl<V> Default for Glossary<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Debug> Debug for Glossary<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V> IntoIterator for &'a Glossary<V> {
    type IntoIter = Iter<'a, V>;
    type Item = (i32, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut Glossary<V> {
    type IntoIter = IterMut<'a, V>;
    type Item = (i32, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// The result of a by-reference lookup via [`Glossary::value_ref`].
///
/// Carries either a borrow of the matched value or a recorded miss.
/// Accessors on a miss fail with [`Error::InvalidReference`] instead of
/// handing out a dangling default.
pub struct ValueRef<'a, V> {
    value: Option<&'a mut V>,
}

impl<'a, V> ValueRef<'a, V> {
    /// Returns `true` if the lookup matched a live entry.
    pub fn found(&self) -> bool {
        self.value.is_some()
    }

    /// Borrows the matched value.
    pub fn get(&self) -> Result<&V, Error> {
        self.value.as_deref().ok_or(Error::InvalidReference)
    }

    /// Mutably borrows the matched value.
    pub fn get_mut(&mut self) -> Result<&mut V, Error> {
        self.value.as_deref_mut().ok_or(Error::InvalidReference)
    }

    /// Consumes the reference, yielding the borrow for the rest of the
    /// table borrow's lifetime.
    pub fn into_mut(self) -> Result<&'a mut V, Error> {
        self.value.ok_or(Error::InvalidReference)
    }
}

/// Iterator over live entries of a [`Glossary`], yielding `(key, &value)`.
///
/// Created by [`Glossary::iter`]. Scans slots in increasing index order up
/// to the table's high-water mark, skipping free slots.
pub struct Iter<'a, V> {
    entries: &'a [Entry<V>],
    index: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (i32, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.entries.len() {
            let entry = &self.entries[self.index];
            self.index += 1;
            if entry.is_live() {
                return Some((entry.key, &entry.value));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.entries.len() - self.index))
    }
}

/// Iterator over live entries of a [`Glossary`], yielding
/// `(key, &mut value)`.
///
/// Created by [`Glossary::iter_mut`].
pub struct IterMut<'a, V> {
    entries: core::slice::IterMut<'a, Entry<V>>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (i32, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        for entry in self.entries.by_ref() {
            if entry.is_live() {
                let Entry { key, value, .. } = entry;
                return Some((*key, value));
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.entries.size_hint().1)
    }
}
