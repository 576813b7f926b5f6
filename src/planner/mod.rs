//! Dietary constraint resolution and compliance-gated meal generation.

pub mod adapters;
pub mod badges;
pub mod constraints;
mod dto;
pub mod errors;
pub mod gate;
pub mod handlers;
pub mod meal;
pub mod staples;
pub mod strings;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::plan_routes())
}
