//! Inference provider boundary and the send gate.

pub mod gate;
pub mod provider;

pub use gate::SendGate;
pub use provider::ChatProvider;
