use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::naming::{Naming, Variant, BANK, TRADING_PLATFORM};
use crate::types::{Asset, Car, Vehicle};
use crate::views::{self, AppState};

/// Page a route leads to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageView {
    Home,
    Registrar,
    Trading,
    Bank,
}

/// Path of every page for the given deployment.
pub fn route_table(naming: &Naming) -> Vec<(String, PageView)> {
    vec![
        ("/".to_string(), PageView::Home),
        (format!("/{}", naming.role), PageView::Registrar),
        (format!("/{}", TRADING_PLATFORM), PageView::Trading),
        (format!("/{}", BANK), PageView::Bank),
    ]
}

fn page<A: Asset>(view: PageView) -> MethodRouter<AppState<A>> {
    match view {
        PageView::Home => get(views::home::<A>),
        PageView::Registrar => get(views::registrar::<A>),
        PageView::Trading => get(views::trading::<A>),
        PageView::Bank => get(views::bank::<A>),
    }
}

/// Pages and form actions shared by both deployments.
pub fn pages<A: Asset>(state: AppState<A>) -> Router {
    let naming = A::NAMING;
    let mut router = Router::new();
    for (path, view) in route_table(&naming) {
        router = router.route(&path, page::<A>(view));
    }
    router
        .route(&format!("/{}/create", naming.role), post(views::create_asset::<A>))
        .route(
            &format!("/{}/create", TRADING_PLATFORM),
            post(views::create_transaction::<A>),
        )
        .route(
            &format!("/{}/complete/:tx_id", BANK),
            post(views::complete_transaction::<A>),
        )
        .with_state(state)
}

/// Certificate pages, which only the car-dealer deployment offers. Uploads
/// may be up to `upload_limit` bytes.
pub fn certificate_pages(state: AppState<Car>, upload_limit: usize) -> Router {
    let role = Car::NAMING.role;
    Router::new()
        .route(&format!("/{role}/certificates"), get(views::certificates))
        .route(
            &format!("/{role}/certificates/:car_id"),
            post(views::upload_certificate),
        )
        .route(
            &format!("/{role}/certificates/verify/:cert_id"),
            post(views::verify_certificate),
        )
        .route(
            &format!("/{role}/certificates/verify-upload/:car_id"),
            post(views::verify_uploaded_certificate),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

/// Full application for the deployment named in `config`.
pub fn app(config: &Config) -> Result<Router, ApiError> {
    let client_config = config.client_config();
    let router = match config.variant {
        Variant::CarDealer => {
            let state = AppState::new(ApiClient::<Car>::new(&client_config)?, config.page_size);
            pages(state.clone()).merge(certificate_pages(state, config.upload_limit()))
        }
        Variant::VehicleAgency => {
            let client = ApiClient::<Vehicle>::new(&client_config)?;
            pages(AppState::new(client, config.page_size))
        }
    };
    Ok(with_assets(router, &config.assets))
}

fn with_assets(router: Router, assets: &Path) -> Router {
    router
        .nest_service("/assets", ServeDir::new(assets))
        .layer(TraceLayer::new_for_http())
}
