//! Search-index access for discovered policies.
//!
//! The aggregator treats the cluster-wide search API as an opaque,
//! filterable data source: [`query`] builds the discovered-policy clauses
//! and [`client`] submits them over the API's GraphQL endpoint.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod client;
mod query;

pub use self::{
    client::{SearchApiClient, SearchItem, SearchPolicies, SearchRelated, SearchResults},
    query::{
        discovered_policy_queries, PolicyTarget, SearchFilter, SearchInput, DEFAULT_SEARCH_LIMIT,
        DO_NOT_RETURN,
    },
};
