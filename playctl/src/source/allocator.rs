//! Fixed-size media buffer allocation
//!
//! Periods write loaded media into [`Allocation`]s obtained from an
//! [`Allocator`]. Released allocations are pooled for reuse; `trim` frees
//! pooled allocations above the target buffer size.

use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

/// Default size of one allocation
pub const DEFAULT_BUFFER_SEGMENT_SIZE: usize = 64 * 1024;

/// One fixed-size block of buffer memory
#[derive(Debug)]
pub struct Allocation {
    data: Box<[u8]>,
}

impl Allocation {
    fn new(length: usize) -> Self {
        Self {
            data: vec![0u8; length].into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Source of [`Allocation`]s
pub trait Allocator {
    /// Obtain an allocation of [`Allocator::individual_allocation_length`] bytes
    fn allocate(&mut self) -> Allocation;

    /// Return an allocation
    fn release(&mut self, allocation: Allocation);

    /// Return several allocations
    fn release_all(&mut self, allocations: Vec<Allocation>) {
        for allocation in allocations {
            self.release(allocation);
        }
    }

    /// Free pooled allocations above the target size
    fn trim(&mut self);

    /// Bytes currently handed out
    fn total_bytes_allocated(&self) -> usize;

    fn individual_allocation_length(&self) -> usize;
}

pub type SharedAllocator = Rc<RefCell<dyn Allocator>>;

/// Pooling allocator
#[derive(Debug)]
pub struct DefaultAllocator {
    trim_on_reset: bool,
    individual_allocation_length: usize,
    target_buffer_size: usize,
    allocated_count: usize,
    available: Vec<Allocation>,
}

impl DefaultAllocator {
    /// # Arguments
    /// * `trim_on_reset` - Whether [`DefaultAllocator::reset`] trims the pool
    /// * `individual_allocation_length` - Length of each allocation in bytes
    pub fn new(trim_on_reset: bool, individual_allocation_length: usize) -> Self {
        Self {
            trim_on_reset,
            individual_allocation_length: individual_allocation_length.max(1),
            target_buffer_size: 0,
            allocated_count: 0,
            available: Vec::new(),
        }
    }

    pub fn shared(trim_on_reset: bool, individual_allocation_length: usize) -> SharedAllocator {
        Rc::new(RefCell::new(Self::new(trim_on_reset, individual_allocation_length)))
    }

    /// Set the target buffer size; lowering it trims immediately
    pub fn set_target_buffer_size(&mut self, target_buffer_size: usize) {
        let lowered = target_buffer_size < self.target_buffer_size;
        self.target_buffer_size = target_buffer_size;
        if lowered {
            self.trim();
        }
    }

    pub fn reset(&mut self) {
        if self.trim_on_reset {
            self.set_target_buffer_size(0);
        }
    }

    /// Allocations sitting in the pool
    pub fn available_count(&self) -> usize {
        self.available.len()
    }
}

impl Allocator for DefaultAllocator {
    fn allocate(&mut self) -> Allocation {
        self.allocated_count += 1;
        self.available
            .pop()
            .unwrap_or_else(|| Allocation::new(self.individual_allocation_length))
    }

    fn release(&mut self, allocation: Allocation) {
        self.allocated_count = self.allocated_count.saturating_sub(1);
        self.available.push(allocation);
    }

    fn trim(&mut self) {
        let target_allocation_count = self
            .target_buffer_size
            .div_ceil(self.individual_allocation_length);
        let target_available_count = target_allocation_count.saturating_sub(self.allocated_count);
        if target_available_count >= self.available.len() {
            return;
        }
        debug!(
            "Trimming allocator pool from {} to {} allocations",
            self.available.len(),
            target_available_count
        );
        self.available.truncate(target_available_count);
    }

    fn total_bytes_allocated(&self) -> usize {
        self.allocated_count * self.individual_allocation_length
    }

    fn individual_allocation_length(&self) -> usize {
        self.individual_allocation_length
    }
}
