//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod auth;
pub mod companies;
pub mod currencies;
pub mod customers;
pub mod financial_years;
pub mod geography;
pub mod health;
pub mod hsn;
pub mod invoices;
pub mod products;
pub mod receipts;
pub mod taxes;
pub mod uoms;

/// Creates the API router with protected routes that need state for
/// middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(companies::routes())
        .merge(currencies::routes())
        .merge(geography::routes())
        .merge(customers::routes())
        .merge(uoms::routes())
        .merge(products::routes())
        .merge(hsn::routes())
        .merge(taxes::routes())
        .merge(financial_years::routes())
        .merge(invoices::routes())
        .merge(receipts::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
