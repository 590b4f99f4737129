// Licensed under the Apache-2.0 license

pub mod app_region;
pub mod hil;
pub use app_region::AppRegion;
pub use hil::{NvmError, NvmStorage};
