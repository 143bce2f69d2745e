//! Client for the Cecotec Mambo cloud REST API
//!
//! [`MamboApi`] is the seam the bridge talks through; [`HttpMamboClient`]
//! implements it over reqwest. Every call except login carries the session
//! token as a bearer `Authorization` header.

mod client;
mod error;
mod types;

pub use client::{endpoints, HttpMamboClient, MamboApi};
pub use error::{CloudError, CloudResult};
pub use types::{StatusSnapshot, DEFAULT_HUMIDITY, DEFAULT_PRESSURE, DEFAULT_TEMPERATURE, DEFAULT_WEIGHT};
