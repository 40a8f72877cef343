//! Core library for jtm
//!
//! This crate implements the **Functional Core** of the jtm application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`jtm_core`** (this crate): Pure transformation functions with zero I/O
//! - **`jtm`**: HTTP, configuration, browser and terminal I/O (the Imperative Shell)
//!
//! Every function in this crate is deterministic over its inputs: the same
//! criteria always build the same JQL, the same issue always renders the same
//! table row or document. Nothing here reads configuration or global state;
//! the shell passes whatever options it resolved.
//!
//! # Module Organization
//!
//! - [`jql`]: Filter criteria to JQL query strings
//! - [`issue`]: Raw Jira issue payloads to normalized issues
//! - [`adf`]: Atlassian Document Format to plain text
//! - [`table`]: Tabular listing of normalized issues
//! - [`document`]: Markdown document for a single issue
//! - [`submission`]: Required-field validation for new issues
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use jtm_core::jql::{build_query, FilterCriteria};
//!
//! let criteria = FilterCriteria {
//!     project: Some("OPS".to_string()),
//!     include_statuses: vec!["To Do".to_string()],
//!     ..Default::default()
//! };
//!
//! assert_eq!(
//!     build_query(&criteria),
//!     "project = OPS AND status IN (\"To Do\") ORDER BY created DESC"
//! );
//! ```

pub mod adf;
pub mod document;
pub mod error;
pub mod issue;
pub mod jql;
pub mod submission;
pub mod table;

pub use error::Error;
