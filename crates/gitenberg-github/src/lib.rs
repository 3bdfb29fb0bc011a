//! GitHub Contents API backend for gitenberg.
//!
//! Implements `gitenberg_core::ContentRemote` over `GET`/`PUT
//! /repos/{repo}/contents/{path}`, with base64 payloads and sha-guarded writes.

mod github;

pub use github::{GitHubContentClient, DEFAULT_API_URL, DEFAULT_READ_TIMEOUT};
