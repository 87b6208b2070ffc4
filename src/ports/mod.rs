//! Port traits connecting the domain to external collaborators.

pub mod config_port;
pub mod data_port;
pub mod report_port;
