//! Automated opponents. The policy here is a simple strength-threshold
//! heuristic; it lives behind its own module so a smarter policy can slot
//! in without touching the table layer.

pub mod policy;

pub use policy::BotPolicy;
