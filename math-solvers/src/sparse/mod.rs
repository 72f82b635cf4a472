//! Sparse matrix structures (CSR format)
//!
//! This module provides Compressed Sparse Row (CSR) format for efficient
//! storage, triplet assembly and matrix-vector operations.

mod csr;

pub use csr::{CsrMatrix, Triplet};
