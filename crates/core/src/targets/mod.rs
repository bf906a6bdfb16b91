//! Emulator targets and the gate that exposes them

pub mod gate;
pub mod registry;

pub use gate::{AvailabilityGate, EMULATOR_BASENAME, emulator_name};
pub use registry::{
    DEBUG_TARGET_ID, RUN_TARGET_ID, TargetDescriptor, TargetRegistry, default_targets,
};
