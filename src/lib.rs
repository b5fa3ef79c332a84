//! SOAP-style student record service, client, and file-backed archive.
//!
//! The wire protocol is a fixed two-operation XML envelope: fetch a record by
//! student number, or add one. Each module focuses on a concrete
//! responsibility:
//!
//! - [`cli`] parses the command-line interface for the service, client, and
//!   archive modes.
//! - [`record`] defines the student record shared by every component.
//! - [`envelope`] is the envelope codec: per-operation encode/decode for both
//!   sides of the wire.
//! - [`registry`] is the in-memory keyed table the service answers from.
//! - [`service`] dispatches decoded operations to the registry and is the
//!   boundary no parse failure crosses.
//! - [`server`] binds the dispatcher to HTTP and serves the WSDL asset.
//! - [`client`] builds requests, posts them, and decodes responses.
//! - [`archive`] is the independent file-backed document store with
//!   load/save/find/update-in-place semantics.
//!
//! Integration tests use this crate directly to run the service on an
//! ephemeral port and talk to it through the real client.

pub mod archive;
pub mod cli;
pub mod client;
pub mod envelope;
pub mod record;
pub mod registry;
pub mod server;
pub mod service;
