//! Prelude for convenient imports.
//!
//! ```rust
//! use strata_view::prelude::*;
//!
//! let options = ElementOptions::cached().ignore_missing();
//! assert!(options.ignore_missing);
//! ```

pub use crate::cache::{CacheOption, ElementOptions};
pub use crate::config::ViewConfig;
pub use crate::error::{Result, ViewError};
pub use crate::hooks::{HookError, HookPhase, ViewHooks};
pub use crate::template::Vars;
pub use crate::view::{LayoutSelection, View};
