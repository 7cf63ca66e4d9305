//! Component kinds executed by the engine each day.

pub mod allocate;
pub mod allocate_duration;
pub mod init_value;
pub mod ledger;
pub mod params;
pub mod pop_buffer;
pub mod presentation;
pub mod queue;
pub mod registry;
pub mod sum_vector;
pub mod transfer;
pub mod types;

pub use allocate::Allocate;
pub use allocate_duration::AllocateDuration;
pub use init_value::InitValue;
pub use ledger::{LedgerClaim, Ledgers, OccupancyLedger};
pub use params::{Operand, ParamValue, Params};
pub use pop_buffer::PopBuffer;
pub use presentation::Presentation;
pub use queue::Queue;
pub use registry::{ComponentRegistry, Factory};
pub use sum_vector::SumVector;
pub use transfer::Transfer;
pub use types::{BuildContext, Component};
