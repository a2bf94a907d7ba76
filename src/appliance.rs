//! Component F: the appliance-specific façade built on top of the
//! reusable dispatcher (§4.6). One appliance family today —
//! [`air_conditioner::AirConditioner`] — but the module boundary mirrors
//! the original firmware's split between a generic `ApplianceBase` and
//! per-product subtypes.

pub mod air_conditioner;

pub use air_conditioner::{AirConditioner, ApplianceConfig, Control, DeviceStatus};
