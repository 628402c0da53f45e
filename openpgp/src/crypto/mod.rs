//! Cryptographic primitives' wire representations.
//!
//! This module contains the data types cryptographic values are
//! transported in: multiprecision integers and the per-algorithm
//! component sets built from them.  Evaluating these values (hashing,
//! verification, key generation) is the business of a cryptographic
//! provider and out of scope for this crate.

pub mod mpi;
