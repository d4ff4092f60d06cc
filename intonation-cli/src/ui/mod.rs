// intonation-cli/src/ui/mod.rs

//! Terminal presentation for the intonation front-end.

pub mod cent_meter;
pub mod main_display;
