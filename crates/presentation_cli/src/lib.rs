//! speechlab CLI argument definitions

pub mod cli;
