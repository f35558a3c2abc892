//! I/O modules for SAC waveform files

pub mod sac_header;
pub mod sac_reader;

pub use sac_header::{Iztype, SacHeader};
pub use sac_reader::{read_sac, read_time_series, write_sac, SacFile};
