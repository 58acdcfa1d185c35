//! Run-loop glue between AppKit and the orchestrator.

pub mod run_loop;

pub use run_loop::{install_pump_timer, install_termination_observer, with_orchestrator};
