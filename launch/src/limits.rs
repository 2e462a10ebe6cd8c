//! Device launch limits.

use bon::bon;
use serde::{Deserialize, Serialize};

/// Launch limits reported by a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLimits {
    /// Maximum threads per work-group.
    pub max_work_group_size: usize,
    /// Maximum local size per dimension; dimensions past the end are unchecked.
    pub max_work_item_sizes: Vec<usize>,
    /// Maximum local memory per work-group, in bytes.
    pub max_local_memory: usize,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self { max_work_group_size: 1024, max_work_item_sizes: vec![1024, 1024, 64], max_local_memory: 48 * 1024 }
    }
}

#[bon]
impl DeviceLimits {
    /// Create device limits with builder pattern.
    #[builder]
    pub fn new(
        #[builder(default = 1024)] max_work_group_size: usize,
        #[builder(default = vec![1024, 1024, 64])] max_work_item_sizes: Vec<usize>,
        #[builder(default = 48 * 1024)] max_local_memory: usize,
    ) -> Self {
        Self { max_work_group_size, max_work_item_sizes, max_local_memory }
    }

    /// Limits that accept any geometry.
    pub fn unlimited() -> Self {
        Self { max_work_group_size: usize::MAX, max_work_item_sizes: Vec::new(), max_local_memory: usize::MAX }
    }

    /// Create limits from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `TUNESMITH_MAX_WORK_GROUP_SIZE` - Threads per work-group (default: 1024)
    /// * `TUNESMITH_MAX_WORK_ITEM_SIZES` - Comma-separated per-dimension maxima (default: 1024,1024,64)
    /// * `TUNESMITH_MAX_LOCAL_MEMORY` - Local memory bytes (default: 49152)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_work_group_size = std::env::var("TUNESMITH_MAX_WORK_GROUP_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_work_group_size);
        let max_work_item_sizes = std::env::var("TUNESMITH_MAX_WORK_ITEM_SIZES")
            .ok()
            .and_then(|s| s.split(',').map(|part| part.trim().parse().ok()).collect::<Option<Vec<usize>>>())
            .unwrap_or(defaults.max_work_item_sizes);
        let max_local_memory = std::env::var("TUNESMITH_MAX_LOCAL_MEMORY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_local_memory);

        Self { max_work_group_size, max_work_item_sizes, max_local_memory }
    }
}
