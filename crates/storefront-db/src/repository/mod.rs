//! # Repository Module
//!
//! Database repository implementations for Storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                           │
//! │       │                                                                 │
//! │       │  db.products().get_by_uuid(id)                                  │
//! │       ▼                                                                 │
//! │  ProductRepository / CategoryRepository   plain CRUD, soft delete      │
//! │  CheckoutRepository                       one ledger transaction       │
//! │  ReportRepository                         read-only aggregates         │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every repository owns a clone of the pool. Identifiers that come from
//! callers are UUID strings; a malformed one reads as "not found".
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD, search, stock lookup
//! - [`CategoryRepository`](category::CategoryRepository) - Category CRUD
//! - [`CheckoutRepository`](checkout::CheckoutRepository) - Checkout and transaction reads
//! - [`ReportRepository`](report::ReportRepository) - Sales aggregates

pub mod category;
pub mod checkout;
pub mod product;
pub mod report;
