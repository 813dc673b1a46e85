pub mod probe_loop;

pub use probe_loop::{probe_message, ProbeLoop, ProbeReport, ProbeState, DEFAULT_PROBE_INTERVAL};
