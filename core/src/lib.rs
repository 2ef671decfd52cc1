//! Client for the Microsoft MVP community activities API.
//!
//! # Overview
//! Submits, updates, lists and deletes the activities (blog posts, talks,
//! videos, podcasts, ...) an MVP reports, and marks them as high impact.
//! The client must be initialized once to fetch the user's profile. The
//! profile provides the ids that later requests need.
//!
//! # Design
//! - `MvpActivitiesClient` builds `HttpRequest` values and parses
//!   `HttpResponse` values. A `Transport` runs the round-trip in between,
//!   `UreqTransport` by default.
//! - Credentials come from explicit arguments first and `MVP_API_TOKEN` /
//!   `MVP_API_EMAIL` second.
//! - Activities are opaque JSON objects. `NewActivity` is an optional typed
//!   helper for the usual fields.
//! - Everything is sequential and blocking. Listing fetches one page at a
//!   time.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use client::{MvpActivitiesClient, PAGE_SIZE};
pub use config::{ClientConfig, Credentials};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use types::{Activity, ActivityFilter, ActivityPage, NewActivity, UserProfile};
