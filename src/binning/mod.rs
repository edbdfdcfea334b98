//! Binned SAH scans shared by both builders (components C5 and C7).

pub mod object;
pub mod spatial;
