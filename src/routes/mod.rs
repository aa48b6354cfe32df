use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
};
use sqlx::SqlitePool;

pub mod auth;
pub mod classes;
pub mod complexes;
pub mod exports;
pub mod health;
pub mod orders;
pub mod product_types;
pub mod products;
pub mod users;
pub mod weekdays;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub pool: SqlitePool,
}

/// Assemble the application router.
///
/// Three tiers sharing one path space: reads are open, identity-bound routes
/// require a bearer token, mutations and exports additionally require the
/// admin role. Methods stay disjoint per path so the tiers merge cleanly.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/users/{user_id}", get(users::get_user))
        .route("/classes", get(classes::list_classes))
        .route("/classes/{class_id}", get(classes::get_class))
        .route("/products", get(products::list_products))
        .route("/products/{product_id}", get(products::get_product))
        .route("/product-types", get(product_types::list_product_types))
        .route(
            "/product-types/{product_type_id}",
            get(product_types::get_product_type),
        )
        .route("/orders", get(orders::list_orders))
        .route("/orders/{order_id}", get(orders::get_order))
        .route("/weekdays", get(weekdays::list_weekdays))
        .route("/complexes/{complex_id}", get(complexes::get_complex));

    let authed = Router::new()
        .route("/auth/change-password", post(auth::change_password))
        .route("/users/{user_id}", put(users::update_user))
        .route(
            "/complexes/week/current",
            get(complexes::current_week_complexes),
        )
        .route("/complexes/week/next", get(complexes::next_week_complexes))
        .route(
            "/complexes/week/next/choices",
            post(complexes::set_next_week_choices).get(complexes::next_week_choices),
        )
        .route(
            "/complexes/week/current/choices",
            get(complexes::current_week_choices),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth_middleware,
        ));

    let admin = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/users", post(users::create_user).get(users::list_users))
        .route("/users/{user_id}", delete(users::delete_user))
        .route("/classes", post(classes::create_class))
        .route(
            "/classes/{class_id}",
            put(classes::update_class).delete(classes::delete_class),
        )
        .route("/classes/{class_id}/students", post(classes::add_students))
        .route(
            "/classes/{class_id}/students/{user_id}",
            delete(classes::remove_student),
        )
        .route("/products", post(products::create_product))
        .route(
            "/products/{product_id}",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/product-types", post(product_types::create_product_type))
        .route(
            "/product-types/{product_type_id}",
            put(product_types::update_product_type).delete(product_types::delete_product_type),
        )
        .route("/orders", post(orders::create_order))
        .route(
            "/orders/{order_id}",
            put(orders::update_order).delete(orders::delete_order),
        )
        .route("/complexes", post(complexes::create_complex))
        .route(
            "/complexes/{complex_id}",
            put(complexes::update_complex).delete(complexes::delete_complex),
        )
        .route(
            "/complexes/{complex_id}/close",
            patch(complexes::set_complex_closed),
        )
        .route(
            "/exports/choices/last-week.xlsx",
            get(exports::export_week_choices),
        )
        // Admin gate runs after authentication: the auth layer is added last
        // so it wraps the admin layer.
        .route_layer(axum_middleware::from_fn(
            crate::middleware::admin_middleware,
        ))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth_middleware,
        ));

    Router::new()
        // Health check endpoints (no auth required)
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(state.pool.clone())
        .merge(
            Router::new()
                .merge(public)
                .merge(authed)
                .merge(admin)
                .with_state(state),
        )
}
