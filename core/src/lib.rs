//! Cinder Core Library
//!
//! Shared low-level pieces of the cinder boot stage: the collaborator
//! boundaries (storage, keys, power, hardware re-init), logical path
//! handling, and the boot log. Designed to be no_std compatible.

#![no_std]
#![allow(dead_code)]
#![allow(clippy::new_without_default)]

extern crate alloc;

pub mod keys;
pub mod logger;
pub mod path;
pub mod power;
pub mod reinit;
pub mod storage;
