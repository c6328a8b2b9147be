// Copyright 2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A fixed-capacity binary min-heap of key/value pairs.
//!
//! A `MinHeap` is created with a capacity and never grows past it. Inserting into a full heap
//! is rejected and the pair is handed back to the caller; removing from an empty heap returns
//! `None`. The entry with the smallest key is always the next one removed. Entries with equal
//! keys come out in no particular order.
//!
//! Insertion and removal of the minimum are `O(log n)`. Peeking at the minimum is `O(1)`.

use std::fmt::{self, Debug, Display};
use std::iter;
use std::slice;

use compare::{natural, Compare};
use thiserror::Error;

// The heap is a complete binary tree stored level by level in a Vec whose
// capacity is fixed at construction. Here's the layout of a tree with 6
// entries, where the numbers are *offsets* in the array:
//
//            0
//          /   \
//         1     2
//        / \   /
//       3   4 5
//
// Every entry's key is greater than or equal to its parent's key, so the
// minimum sits at offset 0. Only the first `len()` slots are occupied.

/// Returns the index of the parent of `index`.
///
/// The root is its own parent: `parent(0) == 0`.
#[inline]
pub fn parent(index: usize) -> usize { index.saturating_sub(1) / 2 }

/// Returns the index of the left child of `index`.
///
/// The result may lie beyond the occupied part of the heap; callers check it against `len()`.
#[inline]
pub fn left_child(index: usize) -> usize { 2 * index + 1 }

/// Returns the index of the right child of `index`.
#[inline]
pub fn right_child(index: usize) -> usize { 2 * index + 2 }

/// Returns the number of parent hops from `index` to the root. The root is at level 0.
///
/// ```
/// use fixed_min_heap::level;
///
/// assert_eq!(level(0), 0);
/// assert_eq!(level(2), 1);
/// assert_eq!(level(3), 2);
/// assert_eq!(level(14), 3);
/// ```
pub fn level(mut index: usize) -> usize {
    let mut level = 0;
    while index > 0 {
        index = parent(index);
        level += 1;
    }
    level
}

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
}

/// The error returned by [`MinHeap::insert`] when the heap already holds `capacity` entries.
///
/// The rejected key and value are returned unchanged.
#[derive(Error, Clone, PartialEq, Eq)]
#[error("heap is at capacity ({capacity})")]
pub struct CapacityExceeded<K, V> {
    pub key: K,
    pub value: V,
    pub capacity: usize,
}

impl<K, V> CapacityExceeded<K, V> {
    /// Returns the key and value that could not be inserted.
    pub fn into_inner(self) -> (K, V) { (self.key, self.value) }
}

impl<K, V> Debug for CapacityExceeded<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CapacityExceeded").field("capacity", &self.capacity).finish_non_exhaustive()
    }
}

/// A binary min-heap with a capacity fixed at construction.
///
/// Keys are ordered by their natural order and the smallest key has the highest priority.
/// The heap owns its buffer and the values stored in it; both are released when the heap is
/// dropped.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative to
/// any other key changes while it is in the heap. This is normally only possible through
/// `Cell`, `RefCell`, global state, I/O, or unsafe code.
///
/// # Examples
///
/// ```
/// use fixed_min_heap::MinHeap;
///
/// let mut heap = MinHeap::with_capacity(2);
/// heap.insert(3, "c").unwrap();
/// heap.insert(1, "a").unwrap();
///
/// let rejected = heap.insert(2, "b").unwrap_err();
/// assert_eq!(rejected.into_inner(), (2, "b"));
///
/// assert_eq!(heap.remove_min(), Some("a"));
/// assert_eq!(heap.remove_min(), Some("c"));
/// assert_eq!(heap.remove_min(), None);
/// ```
#[derive(Clone)]
pub struct MinHeap<K: Ord, V> {
    data: Vec<Node<K, V>>,
    capacity: usize,
}

impl<K: Ord, V> MinHeap<K, V> {
    /// Returns an empty heap that holds at most `capacity` entries.
    ///
    /// The buffer is allocated here and never reallocated. A capacity of zero yields a heap
    /// that is always full.
    ///
    /// ```
    /// use fixed_min_heap::MinHeap;
    ///
    /// let heap = MinHeap::<u32, ()>::with_capacity(5);
    /// assert!(heap.is_empty());
    /// assert_eq!(heap.capacity(), 5);
    /// ```
    pub fn with_capacity(capacity: usize) -> MinHeap<K, V> {
        MinHeap { data: Vec::with_capacity(capacity), capacity }
    }

    /// Returns the number of entries in the heap.
    pub fn len(&self) -> usize { self.data.len() }

    /// Returns `true` if the heap contains no entries.
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Returns `true` if another insert would be rejected.
    pub fn is_full(&self) -> bool { self.data.len() == self.capacity }

    /// Returns the maximum number of entries the heap can hold.
    pub fn capacity(&self) -> usize { self.capacity }

    /// Returns the entry with the smallest key without removing it.
    ///
    /// Returns `None` if the heap is empty.
    pub fn peek_min(&self) -> Option<(&K, &V)> {
        debug_assert!(self.is_valid());
        self.data.first().map(|node| (&node.key, &node.value))
    }

    /// Inserts `value` with priority `key`.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` carrying `key` and `value` if the heap is full. The heap is
    /// left unchanged in that case.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), CapacityExceeded<K, V>> {
        debug_assert!(self.is_valid());
        if self.is_full() {
            let err = CapacityExceeded { key, value, capacity: self.capacity };
            log::trace!("rejecting insert: {}", err);
            return Err(err);
        }
        self.data.push(Node { key, value });
        let last = self.data.len() - 1;
        self.bubble_up(last);
        debug_assert!(self.is_valid());
        Ok(())
    }

    /// Removes the entry with the smallest key and returns its value.
    ///
    /// Returns `None` if the heap was empty.
    pub fn remove_min(&mut self) -> Option<V> {
        self.remove_min_entry().map(|(_, value)| value)
    }

    /// Removes the entry with the smallest key and returns both key and value.
    ///
    /// Returns `None` if the heap was empty.
    pub fn remove_min_entry(&mut self) -> Option<(K, V)> {
        debug_assert!(self.is_valid());
        if self.data.is_empty() {
            return None;
        }
        // The last entry takes the root's place, then sinks.
        let min = self.data.swap_remove(0);
        self.bubble_down(0);
        debug_assert!(self.is_valid());
        Some((min.key, min.value))
    }

    /// Removes all entries from the heap. The capacity is unchanged.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Returns an iterator visiting all entries in storage order.
    pub fn iter(&self) -> Iter<K, V> {
        debug_assert!(self.is_valid());
        Iter(self.data.iter())
    }

    /// Consumes the heap and returns its entries in ascending key order.
    pub fn into_sorted_vec(mut self) -> Vec<(K, V)> {
        let mut sorted = Vec::with_capacity(self.data.len());
        while let Some(entry) = self.remove_min_entry() {
            sorted.push(entry);
        }
        sorted
    }

    /// Returns a `Display` adaptor listing every entry as `level - index : key`.
    ///
    /// ```
    /// use fixed_min_heap::MinHeap;
    ///
    /// let mut heap = MinHeap::with_capacity(3);
    /// heap.insert(7, ()).unwrap();
    /// heap.insert(2, ()).unwrap();
    /// assert_eq!(heap.levels().to_string(), "  0 -   0 : 2\n  1 -   1 : 7\n\n");
    /// ```
    pub fn levels(&self) -> Levels<K, V> where K: Display {
        Levels(self)
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.data.swap(i, j);
    }

    fn key_lt(&self, a: usize, b: usize) -> bool {
        natural::<K>().compares_lt(&self.data[a].key, &self.data[b].key)
    }

    /// Moves the entry at `index` towards the root until its parent's key is no greater.
    fn bubble_up(&mut self, mut index: usize) {
        while index > 0 {
            let p = parent(index);
            if !self.key_lt(index, p) {
                break;
            }
            self.swap(p, index);
            index = p;
        }
    }

    /// Moves the entry at `index` towards the leaves until neither child has a smaller key.
    ///
    /// Ties keep the entry where it is; between equal children the left one wins.
    fn bubble_down(&mut self, mut index: usize) {
        let len = self.data.len();
        loop {
            let left = left_child(index);
            let right = right_child(index);
            let mut smallest = index;
            if left < len && self.key_lt(left, smallest) { smallest = left; }
            if right < len && self.key_lt(right, smallest) { smallest = right; }
            if smallest == index {
                return;
            }
            self.swap(index, smallest);
            index = smallest;
        }
    }

    /// Checks if the heap is valid.
    ///
    /// The heap is valid if it holds no more than `capacity` entries and every entry's key is
    /// greater than or equal to the key of its parent.
    fn is_valid(&self) -> bool {
        self.data.len() <= self.capacity &&
        (1..self.data.len()).all(|i| {
            natural::<K>().compares_le(&self.data[parent(i)].key, &self.data[i].key)
        })
    }
}

impl<K: Ord + Debug, V: Debug> Debug for MinHeap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self).finish()
    }
}

/// Diagnostic listing of a heap's entries with their tree level.
///
/// Acquire through [`MinHeap::levels`](struct.MinHeap.html#method.levels).
pub struct Levels<'a, K: 'a + Ord, V: 'a>(&'a MinHeap<K, V>);

impl<'a, K: Ord + Display, V> Display for Levels<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (ix, node) in self.0.data.iter().enumerate() {
            writeln!(f, "{:3} - {:3} : {}", level(ix), ix, node.key)?;
        }
        writeln!(f)
    }
}

/// An iterator over the entries of a `MinHeap` in storage order.
///
/// Acquire through [`MinHeap::iter`](struct.MinHeap.html#method.iter).
pub struct Iter<'a, K: 'a, V: 'a>(slice::Iter<'a, Node<K, V>>);

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Iter<'a, K, V> { Iter(self.0.clone()) }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline] fn next(&mut self) -> Option<(&'a K, &'a V)> {
        self.0.next().map(|node| (&node.key, &node.value))
    }
    #[inline] fn size_hint(&self) -> (usize, Option<usize>) { self.0.size_hint() }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        self.0.next_back().map(|node| (&node.key, &node.value))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> iter::FusedIterator for Iter<'a, K, V> {}

impl<'a, K: Ord, V> IntoIterator for &'a MinHeap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Iter<'a, K, V> { self.iter() }
}
