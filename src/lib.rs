//! Lead-to-Spreadsheet Append Service
//!
//! Accepts vehicle-lookup lead submissions over HTTP and appends each one as
//! a row to a Google Sheets spreadsheet, authenticating with a service
//! account (RS256 JWT -> OAuth2 bearer token -> values:append).
//!
//! # Modules
//!
//! - `auth`: Service-account JWT signing and token exchange.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Request/response data models.
//! - `row`: Lead-to-row column mapping.
//! - `sheets`: Google Sheets append client.

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod row;
pub mod sheets;
