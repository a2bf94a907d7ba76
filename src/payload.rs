//! Device-status, capability and command payload codecs (§4.3).
//!
//! A frame's payload is opaque to [`crate::frame`]; everything here reads
//! or writes payload bytes by `(index, mask, shift)` via [`crate::bytes`],
//! the way `FrameData::m_getValue`/`m_setValue` did in the original
//! firmware, since these are fixed-layout bitfields rather than
//! self-describing variable-length records. The capability (`0xB5`) and
//! property (`0xB1`) bodies *are* repeated TLV records, so those two use
//! `winnow` combinators the way the teacher parses M-Bus's variable data
//! records.

pub mod capability;
pub mod command;
pub mod error;
pub mod message_id;
pub mod network;
pub mod power;
pub mod property;
pub mod status;
pub mod types;

pub use error::PayloadError;
