//! Common constants and key validation shared by stores, decorators, and
//! the factory.

mod constants;

pub use constants::*;
