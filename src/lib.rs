#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// An integer-keyed hash table with index-linked chains.
///
/// This module provides `Glossary`, a map from `i32` keys to by-value
/// payloads with free-list slot reuse and prime-sized bucket arrays.
pub mod glossary;

pub mod primes;

pub use glossary::Error;
pub use glossary::Glossary;
pub use glossary::ValueRef;
