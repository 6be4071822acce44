// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Usage ledger endpoint.

use crate::types::UsageResponse;
use crate::AppState;
use axum::{extract::State, Json};

/// GET /usage - Recorded catalog requests and the credit total.
pub async fn summary(State(state): State<AppState>) -> Json<UsageResponse> {
    Json(UsageResponse {
        entries: state.usage.entries(),
        total_credits: state.usage.total_credits(),
        ok: true,
    })
}
