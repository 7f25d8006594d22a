use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/profiles", profile_routes())
        .nest("/coaches", coach_routes())
        .nest("/categories", category_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route(
            "/register-complete",
            post(handlers::auth::register_complete),
        )
        .route("/login", post(handlers::auth::login))
        .route("/verify", get(handlers::auth::verify))
        .route("/me", get(handlers::auth::me))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/{id}",
            get(handlers::users::get_user)
                .patch(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
}

fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::profiles::create_profile))
        .route(
            "/{id}",
            get(handlers::profiles::get_profile)
                .patch(handlers::profiles::update_profile)
                .delete(handlers::profiles::delete_profile),
        )
        .route(
            "/user/{user_id}",
            get(handlers::profiles::list_user_profiles),
        )
        .route("/player", post(handlers::profiles::create_player_profile))
        .route(
            "/player/{id}",
            get(handlers::profiles::get_player_profile)
                .patch(handlers::profiles::update_player_profile),
        )
        .route("/coach", post(handlers::profiles::create_coach_profile))
        .route(
            "/coach/{id}",
            get(handlers::profiles::get_coach_profile)
                .patch(handlers::profiles::update_coach_profile),
        )
}

fn coach_routes() -> Router<AppState> {
    Router::new().route("/", post(handlers::coaches::create_coach))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route("/{id}", get(handlers::categories::get_category))
}
