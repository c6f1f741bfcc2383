//! Client-side data-access gateway for a portfolio/profile application.
//!
//! Wraps a Supabase-style backend (auth + tabular store) behind
//! [`gateway::ProfileGateway`] and serves it to a local UI over HTTP.

pub mod backend;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod render;
pub mod routes;
pub mod session;
pub mod state;
