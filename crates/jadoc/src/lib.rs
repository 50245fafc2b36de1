//! Joint approximate diagonalization of symmetric/Hermitian matrix batches.
//!
//! This is the facade crate: it re-exports the engine from `jadoc-core`
//! and the `nalgebra` types it operates on.
//!
//! # Example
//!
//! ```
//! use jadoc::prelude::*;
//! use jadoc::nalgebra::DMatrix;
//!
//! // Two symmetric matrices sharing an eigenbasis.
//! let c1 = DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 1.0, 3.0]);
//! let c2 = DMatrix::from_row_slice(2, 2, &[2.0, -1.0, -1.0, 2.0]);
//!
//! let config = JadocConfig::new().with_rank(2);
//! let result = joint_diagonalize(&[c1, c2], &config).unwrap();
//!
//! // B is orthogonal and B C_i B^T is approximately diagonal.
//! assert!(result.converged);
//! ```

pub use jadoc_core::callback;
pub use jadoc_core::diagonalizer;
pub use jadoc_core::engine;
pub use jadoc_core::error;
pub use jadoc_core::factor;
pub use jadoc_core::linesearch;
pub use jadoc_core::types;

pub use jadoc_core::{
    joint_diagonalize, joint_diagonalize_with_observer, JadocConfig, JadocError, JadocResult,
    Result, TerminationReason,
};

/// Re-export of the linear-algebra backend.
pub use nalgebra;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use jadoc_core::prelude::*;
}
