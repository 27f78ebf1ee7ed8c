//! Locus - a census of forge users in one location.
//!
//! This library collects the public profiles of users matching a location
//! and follower threshold from the GitHub REST API, lists their
//! repositories, stores both as CSV tables, and answers a fixed set of
//! questions about the result.
//!
//! # Example
//!
//! ```ignore
//! use locus::{ClientOptions, Pipeline, PipelineOptions, RateLimitedClient, Report};
//!
//! let client = RateLimitedClient::new(&token, ClientOptions::default())?;
//! let pipeline = Pipeline::new(&client, PipelineOptions::default());
//! let (users, repos) = pipeline.run().await?;
//!
//! println!("{}", Report::build(&users, &repos));
//! ```

pub mod analysis;
pub mod client;
pub mod collect;
pub mod convert;
pub mod http;
pub mod pipeline;
pub mod progress;
pub mod rate_limit;
pub mod record;
pub mod retry;
pub mod table;

pub use analysis::Report;
pub use client::{ApiError, ApiResponse, ClientOptions, GITHUB_API_URL, RateLimitedClient};
pub use collect::{RepositoryCollector, UserCollector, search_query};
pub use convert::normalize_company;
pub use http::{HttpError, HttpTransport, ReqwestTransport};
pub use pipeline::{Pipeline, PipelineError, PipelineOptions};
pub use progress::{CollectProgress, ProgressCallback};
pub use rate_limit::RequestPacer;
pub use record::{RepositoryRecord, RepositoryTable, UserRecord, UserTable};
pub use retry::RetryConfig;
pub use table::TableError;
