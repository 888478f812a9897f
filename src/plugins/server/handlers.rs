use axum::{Json, extract::State};
use serde::Serialize;

use crate::{
  prelude::*,
  scheduler::{TickRecord, Ticks},
  state::AppState,
};

#[derive(Debug, Serialize)]
pub struct HealthRes {
  pub status: &'static str,
  pub version: &'static str,
  /// Last completed tick per scheduler job
  pub ticks: HashMap<&'static str, TickRecord>,
}

impl HealthRes {
  pub fn from_ticks(ticks: &Ticks) -> Self {
    Self {
      status: "ok",
      version: env!("CARGO_PKG_VERSION"),
      ticks: ticks.iter().map(|entry| (*entry.key(), *entry.value())).collect(),
    }
  }
}

pub async fn health(State(app): State<Arc<AppState>>) -> Json<HealthRes> {
  Json(HealthRes::from_ticks(&app.ticks))
}
