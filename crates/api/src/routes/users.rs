use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes for the `/users` resource.
///
/// `/users/new` is an alias of `POST /users`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(users::get_user_by_email).post(users::create_user),
        )
        .route("/users/new", post(users::create_user))
        .route("/users/edit/{userId}", put(users::edit_user))
}
