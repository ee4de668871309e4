//! # Folio
//!
//! The content engine behind a DevOps portfolio site. Projects and knowledge
//! entries live as JSON documents; folio validates them on load, filters and
//! pages them in memory, and renders them into a static site.
//!
//! # Architecture: Load, Query, Render
//!
//! ```text
//! ContentSource  →  ContentStore  →  query  →  generate  →  dist/
//! (local dir or     (validate,        (filter,    (maud pages,
//!  remote export)    degrade on        paginate,   hashed assets,
//!                    failure)          featured)   content JSON)
//! ```
//!
//! A failed load never takes the site down: collection loads return an empty
//! list and single-entity lookups return `None`, with the cause logged through
//! `tracing`. The `try_*` variants expose the underlying [`load::LoadError`]
//! for the `check` tooling and tests.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `Project`, `KnowledgeEntry` and the related enums |
//! | [`validate`] | Record validators: raw JSON to typed records, first failure wins |
//! | [`schema`] | Strict content schema: every violation, for `folio check` |
//! | [`fetch`] | HTTP fetching with a fixed-delay retry policy |
//! | [`source`] | Where documents come from: a content directory or a deployed export |
//! | [`load`] | `ContentStore`: collection loads, lookups, related-project resolution |
//! | [`query`] | Filtering, pagination, featured selection, category/tag sets |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`metadata`] | Page `<head>` metadata and JSON-LD structured data |
//! | [`contact`] | Contact form state machine with simulated submission |
//! | [`generate`] | Static site rendering with Maud |
//! | [`check`] | Content directory validation report |
//! | [`verify`] | Export directory verification report |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Validate at the Boundary
//!
//! Raw JSON is turned into typed records in exactly one place
//! ([`validate`]). Everything past the loader works with `Project` and
//! `KnowledgeEntry` values and never re-checks shape.
//!
//! ## One Source Trait, Two Backends
//!
//! [`source::ContentSource`] reads an index document or a single entity
//! document. The local backend reads files; the remote backend fetches the
//! same paths from a previous export's `content/` directory. An export is
//! therefore itself a valid remote source.
//!
//! ## Static Output
//!
//! The generated site is plain HTML, one stylesheet, and two small scripts
//! (knowledge filters and the contact form). Asset names carry a content
//! hash, so they can be cached indefinitely.

pub mod check;
pub mod config;
pub mod contact;
pub mod fetch;
pub mod generate;
pub mod load;
pub mod metadata;
pub mod output;
pub mod query;
pub mod schema;
pub mod source;
pub mod types;
pub mod validate;
pub mod verify;

#[cfg(test)]
pub(crate) mod test_helpers;
