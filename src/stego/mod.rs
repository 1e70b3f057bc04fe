//! The pixel stream codec: bit level embedding, message frame reconciliation and the
//! coordinate permutation.

pub mod bits;
pub mod operation;
pub mod permute;
pub mod reconcile;

pub use bits::{from_bits, to_bits, BitString};
pub use operation::CipherOperation;
pub use permute::CoordinatePermuter;
pub use reconcile::FrameReconciler;
