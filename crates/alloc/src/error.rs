//! Error types for nebula-alloc
//!
//! One `thiserror` enum covers every failure an allocator or pool can report.
//! Deallocation never fails, so nothing here is produced on release paths.

use core::alloc::Layout;
use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::{error, warn};

// ============================================================================
// Main Error Type
// ============================================================================

/// Allocation errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    // --- Size Errors ---
    #[error("Array too long: {count} elements of {element_size} bytes overflow the address space")]
    ArrayTooLong { count: usize, element_size: usize },

    // --- Source Errors ---
    #[error("Out of memory: {size} bytes with {align} byte alignment")]
    OutOfMemory { size: usize, align: usize },

    // --- Pool Errors ---
    #[error(
        "Pool capacity exhausted: requested {requested} elements, {available} of {capacity} available"
    )]
    CapacityExhausted {
        requested: usize,
        available: usize,
        capacity: usize,
    },

    #[error("Empty request: pools serve at least one element per allocation")]
    EmptyRequest,

    #[error("Invalid pool capacity {capacity}: {reason}")]
    InvalidCapacity {
        capacity: usize,
        reason: &'static str,
    },
}

impl AllocError {
    /// Error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ArrayTooLong { .. } => "ALLOC:ARRAY_TOO_LONG",
            Self::OutOfMemory { .. } => "ALLOC:OUT_OF_MEMORY",
            Self::CapacityExhausted { .. } => "POOL:EXHAUSTED",
            Self::EmptyRequest => "POOL:EMPTY_REQUEST",
            Self::InvalidCapacity { .. } => "POOL:INVALID_CAPACITY",
        }
    }

    /// Whether the caller may reasonably recover, e.g. by shedding load
    ///
    /// Only source failures qualify; the rest indicate a broken precondition.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }

    /// Whether the error reports a violated pool or allocator precondition
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::CapacityExhausted { .. } | Self::EmptyRequest | Self::InvalidCapacity { .. }
        )
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create array too long error
    pub fn array_too_long(count: usize, element_size: usize) -> Self {
        #[cfg(feature = "logging")]
        warn!(count, element_size, "array allocation overflows the address space");

        Self::ArrayTooLong {
            count,
            element_size,
        }
    }

    /// Create out of memory error
    pub fn out_of_memory(size: usize, align: usize) -> Self {
        #[cfg(feature = "logging")]
        error!(size, align, "memory source could not satisfy request");

        Self::OutOfMemory { size, align }
    }

    /// Create out of memory error from layout
    pub fn out_of_memory_with_layout(layout: Layout) -> Self {
        Self::out_of_memory(layout.size(), layout.align())
    }

    /// Create capacity exhausted error
    pub fn capacity_exhausted(requested: usize, available: usize, capacity: usize) -> Self {
        #[cfg(feature = "logging")]
        warn!(requested, available, capacity, "pool capacity exhausted");

        Self::CapacityExhausted {
            requested,
            available,
            capacity,
        }
    }

    /// Create invalid capacity error
    pub fn invalid_capacity(capacity: usize, reason: &'static str) -> Self {
        Self::InvalidCapacity { capacity, reason }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for allocation operations
pub type AllocResult<T> = Result<T, AllocError>;

// ============================================================================
// Tests
// ============================================================================
