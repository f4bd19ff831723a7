use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;
use super::middleware::{admin_middleware, session_auth_middleware};

pub fn v1_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth/login", post(handlers::auth::login))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router());

    let auth = Router::new()
        .route("/refresh", post(handlers::auth::refresh))
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::me));

    let marketplace = Router::new()
        .route("/search", get(handlers::marketplace::search))
        .route("/items/{itemId}", get(handlers::marketplace::get_item));

    let favorites = Router::new()
        .route("/", post(handlers::favorites::create_favorite))
        .route(
            "/{favoriteId}",
            get(handlers::favorites::get_favorite)
                .patch(handlers::favorites::update_favorite)
                .delete(handlers::favorites::delete_favorite),
        )
        .route(
            "/user/{userId}",
            get(handlers::favorites::list_user_favorites),
        );

    let purchases = Router::new()
        .route(
            "/",
            get(handlers::purchases::list_purchases).post(handlers::purchases::create_purchase),
        )
        .route(
            "/{purchaseId}",
            get(handlers::purchases::get_purchase).delete(handlers::purchases::delete_purchase),
        )
        .route(
            "/user/{userId}",
            get(handlers::purchases::list_user_purchases),
        );

    let reports = Router::new()
        .route("/top-favorited", get(handlers::reports::top_favorited))
        .route("/top-selling", get(handlers::reports::top_selling))
        .route("/top-purchasers", get(handlers::reports::top_purchasers));

    let admin_routes = Router::new()
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/{userId}",
            get(handlers::users::get_user)
                .patch(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/roles", post(handlers::access::create_role))
        .route(
            "/roles/{roleId}",
            axum::routing::delete(handlers::access::delete_role),
        )
        .route("/permissions", post(handlers::access::create_permission))
        .route(
            "/permissions/{permissionId}",
            axum::routing::delete(handlers::access::delete_permission),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        ));

    let session_routes = Router::new()
        .nest("/auth", auth)
        .nest("/marketplace", marketplace)
        .nest("/favorites", favorites)
        .nest("/purchases", purchases)
        .nest("/reports", reports)
        .route("/roles", get(handlers::access::list_roles))
        .route("/roles/{roleId}", get(handlers::access::get_role))
        .route("/permissions", get(handlers::access::list_permissions));

    let protected_routes = session_routes
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state, session_auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
