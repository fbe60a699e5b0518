//! Test-only containers that consume the allocator contract.
//!
//! Neither is part of the crate: they exist to drive allocators the way a
//! real container would.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::ptr::{self, NonNull};

use nebula_alloc::{AllocResult, ContainerAllocator, Rebind};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const NUMBERS: [i32; 100] = [
    18, 13, 57, 24, 93, 80, 5, 3, 36, 71, 65, 74, 90, 38, 7, 23, 55, 35, 13, 14, 71, 88, 22, 77,
    68, 100, 40, 9, 79, 30, 74, 69, 25, 98, 75, 20, 29, 14, 86, 14, 42, 16, 22, 90, 80, 36, 3, 73,
    72, 38, 60, 32, 93, 64, 84, 5, 41, 64, 10, 26, 82, 5, 91, 16, 51, 21, 17, 98, 23, 56, 70, 91,
    30, 23, 94, 88, 29, 24, 11, 64, 92, 68, 12, 54, 92, 65, 33, 75, 57, 59, 90, 68, 94, 46, 80, 82,
    30, 86, 51, 82,
];

pub const SORTED_NUMBERS: [i32; 100] = [
    3, 3, 5, 5, 5, 7, 9, 10, 11, 12, 13, 13, 14, 14, 14, 16, 16, 17, 18, 20, 21, 22, 22, 23, 23,
    23, 24, 24, 25, 26, 29, 29, 30, 30, 30, 32, 33, 35, 36, 36, 38, 38, 40, 41, 42, 46, 51, 51, 54,
    55, 56, 57, 57, 59, 60, 64, 64, 64, 65, 65, 68, 68, 68, 69, 70, 71, 71, 72, 73, 74, 74, 75, 75,
    77, 79, 80, 80, 80, 82, 82, 82, 84, 86, 86, 88, 88, 90, 90, 90, 91, 91, 92, 92, 93, 93, 94, 94,
    98, 98, 100,
];

pub const UNIQUE_SORTED_NUMBERS: [i32; 61] = [
    3, 5, 7, 9, 10, 11, 12, 13, 14, 16, 17, 18, 20, 21, 22, 23, 24, 25, 26, 29, 30, 32, 33, 35, 36,
    38, 40, 41, 42, 46, 51, 54, 55, 56, 57, 59, 60, 64, 65, 68, 69, 70, 71, 72, 73, 74, 75, 77, 79,
    80, 82, 84, 86, 88, 90, 91, 92, 93, 94, 98, 100,
];

// ---------------------------------------------------------------------------
// FixedVec: one allocation for the whole capacity
// ---------------------------------------------------------------------------

/// Vector with a capacity fixed at construction
pub struct FixedVec<T, A: ContainerAllocator<Value = T>> {
    ptr: NonNull<T>,
    len: usize,
    capacity: usize,
    alloc: A,
}

impl<T, A: ContainerAllocator<Value = T>> FixedVec<T, A> {
    pub fn with_capacity_in(capacity: usize, alloc: A) -> AllocResult<Self> {
        let ptr = alloc.allocate(capacity)?;
        Ok(Self {
            ptr,
            len: 0,
            capacity,
            alloc,
        })
    }

    /// Hands the value back when full
    pub fn push(&mut self, value: T) -> Result<(), T> {
        if self.len == self.capacity {
            return Err(value);
        }
        unsafe { self.ptr.add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }
}

impl<T, A: ContainerAllocator<Value = T>> Drop for FixedVec<T, A> {
    fn drop(&mut self) {
        unsafe {
            ptr::drop_in_place(self.as_mut_slice());
            self.alloc.deallocate(self.ptr, self.capacity);
        }
    }
}

// ---------------------------------------------------------------------------
// TreeSet: unbalanced binary search tree, one allocation per node
// ---------------------------------------------------------------------------

/// Tree node; what a set's allocator is rebound to
pub struct Node<T> {
    value: T,
    left: Link<T>,
    right: Link<T>,
}

type Link<T> = Option<NonNull<Node<T>>>;

/// Ordered set of distinct values
pub struct TreeSet<T: Ord, A: ContainerAllocator<Value = Node<T>>> {
    root: Link<T>,
    len: usize,
    alloc: A,
}

/// Set whose node allocator is `alloc` rebound to the node type
pub fn rebound_tree<T: Ord, B: Rebind>(alloc: &B) -> TreeSet<T, B::Rebound<Node<T>>> {
    TreeSet::new_in(alloc.for_type::<Node<T>>())
}

impl<T: Ord, A: ContainerAllocator<Value = Node<T>>> TreeSet<T, A> {
    pub fn new_in(alloc: A) -> Self {
        Self {
            root: None,
            len: 0,
            alloc,
        }
    }

    /// Returns whether the value was new
    pub fn insert(&mut self, value: T) -> AllocResult<bool> {
        let mut slot: *mut Link<T> = &raw mut self.root;
        unsafe {
            while let Some(node) = *slot {
                let node = node.as_ptr();
                slot = match value.cmp(&(*node).value) {
                    Ordering::Less => &raw mut (*node).left,
                    Ordering::Greater => &raw mut (*node).right,
                    Ordering::Equal => return Ok(false),
                };
            }

            let node = self.alloc.allocate(1)?;
            node.write(Node {
                value,
                left: None,
                right: None,
            });
            *slot = Some(node);
        }
        self.len += 1;
        Ok(true)
    }

    pub fn extend<I: IntoIterator<Item = T>>(&mut self, values: I) -> AllocResult<()> {
        for value in values {
            self.insert(value)?;
        }
        Ok(())
    }

    pub fn contains(&self, value: &T) -> bool {
        let mut link = self.root;
        while let Some(node) = link {
            let node = unsafe { node.as_ref() };
            link = match value.cmp(&node.value) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return true,
            };
        }
        false
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Values in ascending order
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter { stack: Vec::new() };
        iter.descend(self.root);
        iter
    }
}

impl<T: Ord, A: ContainerAllocator<Value = Node<T>>> Drop for TreeSet<T, A> {
    fn drop(&mut self) {
        let mut pending: Vec<NonNull<Node<T>>> = self.root.take().into_iter().collect();
        while let Some(node) = pending.pop() {
            unsafe {
                let Node { value, left, right } = node.read();
                pending.extend(left);
                pending.extend(right);
                drop(value);
                self.alloc.deallocate(node, 1);
            }
        }
    }
}

/// In-order iterator
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iter<'a, T> {
    fn descend(&mut self, mut link: Link<T>) {
        while let Some(node) = link {
            let node: &'a Node<T> = unsafe { node.as_ref() };
            self.stack.push(node);
            link = node.left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.stack.pop()?;
        self.descend(node.right);
        Some(&node.value)
    }
}
