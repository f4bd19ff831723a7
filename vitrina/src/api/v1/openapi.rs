use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vitrina API",
        version = "1.0.0",
        description = "Favorites and purchases over a live marketplace catalogue. Stored records are returned hydrated with current product data.",
    ),
    paths(
        handlers::health::health_check,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::marketplace::search,
        handlers::marketplace::get_item,
        handlers::favorites::create_favorite,
        handlers::favorites::get_favorite,
        handlers::favorites::list_user_favorites,
        handlers::favorites::update_favorite,
        handlers::favorites::delete_favorite,
        handlers::purchases::create_purchase,
        handlers::purchases::list_purchases,
        handlers::purchases::get_purchase,
        handlers::purchases::list_user_purchases,
        handlers::purchases::delete_purchase,
        handlers::reports::top_favorited,
        handlers::reports::top_selling,
        handlers::reports::top_purchasers,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::access::list_roles,
        handlers::access::get_role,
        handlers::access::create_role,
        handlers::access::delete_role,
        handlers::access::list_permissions,
        handlers::access::create_permission,
        handlers::access::delete_permission,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        response::ResponseMeta,
        // Requests
        dto::LoginRequest,
        dto::CreateFavoriteRequest,
        dto::UpdateFavoriteRequest,
        dto::CreatePurchaseRequest,
        dto::CreateUserRequest,
        dto::UpdateUserRequest,
        dto::CreateRoleRequest,
        dto::CreatePermissionRequest,
        // Responses
        dto::LoginResponse,
        dto::AckResponse,
        dto::DeletedResponse,
        models::EnrichedRecord,
        models::HydratedProduct,
        models::Picture,
        models::FavoriteRecord,
        models::PurchaseRecord,
        models::User,
        models::UserProfile,
        models::UserSummary,
        models::Role,
        models::Permission,
        models::FavoriteGroupEntry,
        models::TopFavoritedItem,
        models::TopSellingItem,
        models::TopPurchaser,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
        handlers::health::MarketplaceStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "auth", description = "Login sessions and marketplace credentials"),
        (name = "marketplace", description = "Live product search and lookup"),
        (name = "favorites", description = "Favorite items with ratings and comments"),
        (name = "purchases", description = "Purchase history"),
        (name = "reports", description = "Top-five rankings"),
        (name = "users", description = "User administration (admin role)"),
        (name = "access", description = "Roles and permissions"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
