//! Filesystem backend adapter for StrataKV.
//!
//! Stores every value as its own file under a common root directory and
//! registers itself with the StrataKV factory under the `fs` store type:
//!
//! ```rust,ignore
//! stratakv_fs_adapter::register();
//! let store = stratakv::get_store_from_url("fs:///var/data/store")?;
//! ```
//!
//! Keys map directly to file names, so they are restricted to the
//! filename-safe character set; compose with the `urlencode` decorator for
//! unrestricted keys (`fs:///var/data?wrap=urlencode`).

mod config;
mod module;
mod store;

pub use config::*;
pub use module::*;
pub use store::*;
