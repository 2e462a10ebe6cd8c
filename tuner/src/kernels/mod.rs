//! Built-in kernel family declarations.

pub mod xgemm_direct;
