//! # credvault-core
//!
//! Core of the credential accounts service.
//!
//! This crate provides:
//! - Tenant-scoped account storage (`SQLite`)
//! - Account validation
//! - The account service that mediates every operation for a tenant
//! - The transport-agnostic RPC surface and its status codes
//! - Configuration loading
//!
//! Every read and write is scoped by the caller's [`TenantId`]. The tenant is
//! resolved by the transport before the core is invoked and is passed down
//! explicitly through a [`Caller`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
pub mod api;
pub mod config;
mod error;
pub mod service;
pub mod tenant;

pub use account::{
    Account, AccountId, AccountStore, SqliteAccountStore, StoreError, StoreResult,
    ValidationError, validate_fields, validate_update,
};
pub use api::{AccountsHandler, CallContext, Code, Status};
pub use config::{Config, ConfigError, ServiceOptions, StoreConfig};
pub use error::{Cause, Error, ErrorKind, Result};
pub use service::AccountService;
pub use tenant::{Caller, TenantId};
