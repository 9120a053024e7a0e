//! OpenCTI gateway.
//!
//! Read-only query tools over the OpenCTI GraphQL API: every tool resolves
//! to `POST /graphql` with a static query document and the validated
//! arguments as variables. Responses come back verbatim, GraphQL `errors`
//! arrays included; the platform decides its own error shapes.

pub mod catalog;
pub mod client;
pub mod queries;
