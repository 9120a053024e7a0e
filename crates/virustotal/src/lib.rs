//! VirusTotal / Google Threat Intelligence gateway.
//!
//! Two binaries share this crate — `intelgate-virustotal` and
//! `intelgate-gti` — differing only in which environment variable carries
//! the API key. Both speak the v3 REST API: Livehunt hunting rulesets and
//! IOC collections.

pub mod catalog;
pub mod client;
pub mod serve;
