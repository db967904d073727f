pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the resource routes, mounted at the server root.
///
/// ```text
/// /users                   GET (by ?email=), POST
/// /users/new               POST
/// /users/edit/{userId}     PUT
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(users::router())
}
