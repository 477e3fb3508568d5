//! Workflow pipelines orchestrating the verification services.

pub mod inspect;
