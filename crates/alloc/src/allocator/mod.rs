//! Allocator contract and the reference allocator

mod reference;
mod traits;

pub use reference::ReferenceAllocator;
pub use traits::{ContainerAllocator, MemoryUsage, Rebind};
