//! JSON REST API for Cadre.
//!
//! Exposes an axum [`Router`] backed by any
//! [`cadre_core::store::OrgStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cadre_api::api_router(store.clone()))
//! ```

pub mod assignments;
pub mod directory;
pub mod error;
pub mod workload;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use cadre_core::store::OrgStore;
use serde::Deserialize;

pub use error::ApiError;

/// Runtime server configuration, deserialised from `config.toml` (or the
/// `CADRE_*` environment).
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  #[serde(default = "default_store_path")]
  pub store_path:         String,
  /// Overrides for the engine's validation bounds; defaults apply when
  /// absent.
  pub max_percentage:     Option<f64>,
  pub overload_threshold: Option<f64>,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 4000 }
fn default_store_path() -> String { "cadre.db".to_string() }

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: OrgStore + 'static,
{
  Router::new()
    // Directory
    .route(
      "/people",
      get(directory::list_people::<S>).post(directory::create_person::<S>),
    )
    .route(
      "/people/{id}",
      get(directory::get_person::<S>).delete(directory::delete_person::<S>),
    )
    .route("/people/{id}/assignments", get(assignments::current_for_person::<S>))
    .route("/people/{id}/workload", get(workload::report::<S>))
    .route("/people/{id}/export", get(assignments::export_for_person::<S>))
    .route(
      "/units",
      get(directory::list_units::<S>).post(directory::create_unit::<S>),
    )
    .route(
      "/units/{id}",
      get(directory::get_unit::<S>).delete(directory::delete_unit::<S>),
    )
    .route(
      "/job-titles",
      get(directory::list_job_titles::<S>)
        .post(directory::create_job_title::<S>),
    )
    .route(
      "/job-titles/{id}",
      get(directory::get_job_title::<S>)
        .delete(directory::delete_job_title::<S>),
    )
    // Versioning engine
    .route("/assignments", post(assignments::create::<S>))
    .route("/assignments/current", get(assignments::current_for_slot::<S>))
    .route("/assignments/history", get(assignments::history_for_slot::<S>))
    .route("/assignments/import", post(assignments::import::<S>))
    .route("/assignments/purge", post(assignments::purge::<S>))
    .route("/assignments/{id}", get(assignments::get_one::<S>))
    .route("/assignments/{id}/modify", post(assignments::modify_one::<S>))
    .route(
      "/assignments/{id}/terminate",
      post(assignments::terminate_one::<S>),
    )
    // Whole-store export
    .route("/export", get(assignments::export_document::<S>))
    .with_state(store)
}
