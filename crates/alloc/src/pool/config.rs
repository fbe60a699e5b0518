//! Pool configuration

/// Configuration for [`HeapPool`](crate::HeapPool) and
/// [`StackPool`](crate::StackPool)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Enable statistics tracking
    pub track_stats: bool,

    /// Fill pattern byte for newly allocated ranges (for debugging)
    pub alloc_pattern: Option<u8>,

    /// Label attached to log events
    pub name: Option<&'static str>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            track_stats: cfg!(debug_assertions),
            alloc_pattern: if cfg!(debug_assertions) {
                Some(0xBB)
            } else {
                None
            },
            name: None,
        }
    }
}

impl PoolConfig {
    /// Production configuration - no tracking, no fill
    #[must_use]
    pub fn production() -> Self {
        Self {
            track_stats: false,
            alloc_pattern: None,
            name: None,
        }
    }

    /// Debug configuration - stats and a recognisable fill
    #[must_use]
    pub fn debug() -> Self {
        Self {
            track_stats: true,
            alloc_pattern: Some(0xBB),
            name: None,
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_stats(mut self, track_stats: bool) -> Self {
        self.track_stats = track_stats;
        self
    }

    pub fn with_alloc_pattern(mut self, pattern: Option<u8>) -> Self {
        self.alloc_pattern = pattern;
        self
    }

    /// Name used in log events
    pub fn label(&self) -> &'static str {
        self.name.unwrap_or("unnamed")
    }
}
