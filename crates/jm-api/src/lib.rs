use std::env;
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::connect_info::ConnectInfo,
    extract::DefaultBodyLimit,
    extract::State,
    http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue},
    http::Method,
    http::Request,
    middleware,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use clap::Parser;
use dotenvy::dotenv;
use governor::{
    clock::DefaultClock, middleware::NoOpMiddleware, state::keyed::DashMapStateStore, Quota,
    RateLimiter,
};
use jm_common::logging::{init_tracing_subscriber, install_tracing_panic_hook, log_store_layout};
use jm_common::notify::{HireNotifier, LogNotifier};
use jm_common::password::{DEFAULT_BCRYPT_COST, MIN_BCRYPT_COST};
use jm_common::store::{
    AvailabilityLedger, Collection, ContractorRepository, Document, RecordStore, StorageError,
    StoreConfig, WorkerRepository,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub mod auth;
pub mod error;
pub mod handlers;

use auth::SessionConfig;
use error::ApiError;
use handlers::{contractors, dashboard, health, missed_call, pages, workers};

const SHUTDOWN_DRAIN_GRACE: std::time::Duration = std::time::Duration::from_millis(200);
const MAX_BCRYPT_COST: u32 = 31;
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Parser)]
#[command(name = "jm-api", about = "Worker/contractor matching service")]
struct Cli {
    /// Directory holding workers.json, contractors.json and availability.json
    #[arg(long, env = "JM_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Server port
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// HMAC secret used to sign contractor session tokens
    #[arg(long, env = "JM_SESSION_SECRET")]
    session_secret: Option<String>,

    /// Session lifetime in hours
    #[arg(long, env = "JM_SESSION_TTL_HOURS", default_value_t = 12)]
    session_ttl_hours: i64,

    /// Mark the session cookie Secure (HTTPS deployments)
    #[arg(long, env = "JM_COOKIE_SECURE", default_value = "false")]
    cookie_secure: bool,

    /// bcrypt cost factor for contractor passwords
    #[arg(long, env = "JM_BCRYPT_COST", default_value_t = DEFAULT_BCRYPT_COST)]
    bcrypt_cost: u32,

    /// Comma separated list of allowed CORS origins
    #[arg(long, env = "JM_CORS_ORIGINS", default_value = "http://localhost:3000")]
    cors_origins: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub session: SessionConfig,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    fn from_cli(cli: Cli) -> Result<Self, ApiError> {
        let cors_origins = cli
            .cors_origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect::<Vec<_>>();

        if cors_origins.iter().any(|origin| origin == "*") {
            return Err(ApiError::Config(
                "JM_CORS_ORIGINS must list explicit origins when credentials are enabled".into(),
            ));
        }

        let secret = cli
            .session_secret
            .filter(|secret| !secret.trim().is_empty())
            .ok_or_else(|| ApiError::Config("JM_SESSION_SECRET is required".into()))?;

        if !(1..=MAX_SESSION_TTL_HOURS).contains(&cli.session_ttl_hours) {
            return Err(ApiError::Config(format!(
                "JM_SESSION_TTL_HOURS must be between 1 and {MAX_SESSION_TTL_HOURS}"
            )));
        }

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cli.bcrypt_cost) {
            return Err(ApiError::Config(format!(
                "JM_BCRYPT_COST must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}"
            )));
        }

        Ok(Self {
            data_dir: cli.data_dir,
            port: cli.port,
            cors_origins,
            session: SessionConfig {
                secret,
                ttl_hours: cli.session_ttl_hours,
                cookie_secure: cli.cookie_secure,
            },
            bcrypt_cost: cli.bcrypt_cost,
        })
    }

    pub fn for_tests(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            port: 5000,
            cors_origins: vec!["http://localhost:3000".into()],
            session: SessionConfig {
                secret: "test-session-secret".into(),
                ttl_hours: 1,
                cookie_secure: false,
            },
            bcrypt_cost: MIN_BCRYPT_COST,
        }
    }
}

type IpRateLimiter = RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock, NoOpMiddleware>;

#[derive(Clone)]
pub struct RateLimits {
    global: Arc<IpRateLimiter>,
    login: Arc<IpRateLimiter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub global_per_sec: u32,
    pub global_burst: u32,
    pub login_per_sec: u32,
    pub login_burst: u32,
}

impl RateLimitConfig {
    fn parse_env_u32(name: &str) -> Option<u32> {
        env::var(name)
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|value| *value > 0)
    }

    fn from_env() -> Self {
        Self {
            global_per_sec: Self::parse_env_u32("JM_RATE_LIMIT_GLOBAL_PER_SEC").unwrap_or(20),
            global_burst: Self::parse_env_u32("JM_RATE_LIMIT_GLOBAL_BURST").unwrap_or(40),
            login_per_sec: Self::parse_env_u32("JM_RATE_LIMIT_LOGIN_PER_SEC").unwrap_or(1),
            login_burst: Self::parse_env_u32("JM_RATE_LIMIT_LOGIN_BURST").unwrap_or(5),
        }
    }
}

fn build_ip_limiter(per_second: u32, burst_size: u32) -> Arc<IpRateLimiter> {
    let rate = NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN);
    let burst = NonZeroU32::new(burst_size).unwrap_or(rate);

    Arc::new(RateLimiter::keyed(Quota::per_second(rate).allow_burst(burst)))
}

pub fn default_rate_limits() -> RateLimits {
    let cfg = RateLimitConfig::from_env();
    RateLimits {
        global: build_ip_limiter(cfg.global_per_sec, cfg.global_burst),
        login: build_ip_limiter(cfg.login_per_sec, cfg.login_burst),
    }
}

pub struct AppState {
    pub config: AppConfig,
    pub workers: WorkerRepository,
    pub contractors: ContractorRepository,
    pub ledger: AvailabilityLedger,
    pub notifier: Arc<dyn HireNotifier>,
    pub(crate) rate_limits: RateLimits,
    pub readiness: Arc<AtomicBool>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: AppConfig, notifier: Arc<dyn HireNotifier>) -> Self {
        let store = Arc::new(RecordStore::new(StoreConfig::in_dir(&config.data_dir)));

        Self {
            workers: WorkerRepository::new(store.clone()),
            contractors: ContractorRepository::new(store.clone(), config.bcrypt_cost),
            ledger: AvailabilityLedger::new(store),
            notifier,
            rate_limits: default_rate_limits(),
            readiness: Arc::new(AtomicBool::new(true)),
            config,
        }
    }
}

impl axum::extract::FromRef<SharedState> for SessionConfig {
    fn from_ref(input: &SharedState) -> SessionConfig {
        input.config.session.clone()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

fn request_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
}

fn enforce_rate_limit(limiter: &IpRateLimiter, ip: Option<IpAddr>) -> Result<(), ApiError> {
    if let Some(client_ip) = ip {
        if limiter.check_key(&client_ip).is_err() {
            return Err(ApiError::TooManyRequests("rate limit exceeded".into()));
        }
    }

    Ok(())
}

async fn global_rate_limit(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    enforce_rate_limit(&state.rate_limits.global, request_ip(&req))?;
    Ok(next.run(req).await)
}

async fn login_rate_limit(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    enforce_rate_limit(&state.rate_limits.login, request_ip(&req))?;
    Ok(next.run(req).await)
}

async fn attach_request_id_context(req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    error::with_request_id(request_id, next.run(req)).await
}

pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_header = request_id_header.clone();

    let trace = TraceLayer::new_for_http().make_span_with(move |request: &Request<Body>| {
        let request_id = request
            .headers()
            .get(&trace_header)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        tracing::info_span!(
            "http_request",
            method = %request.method(),
            path = %request.uri().path(),
            request_id = %request_id,
        )
    });

    Router::new()
        .route("/", get(pages::index))
        .route(
            "/register",
            get(pages::worker_form).post(workers::register_worker),
        )
        .route(
            "/contractor-register",
            get(pages::contractor_form).post(contractors::register_contractor),
        )
        .route(
            "/login",
            post(contractors::login)
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    login_rate_limit,
                ))
                .get(pages::login_form),
        )
        .route("/logout", get(contractors::logout))
        .route(
            "/missed-call",
            get(missed_call::missed_call).post(missed_call::missed_call),
        )
        .route("/dashboard", get(dashboard::dashboard))
        .route("/hire/:worker_id", post(dashboard::hire))
        .route("/how-it-works", get(pages::how_it_works))
        .route("/favicon.ico", get(pages::favicon))
        .route("/livez", get(health::livez))
        .route("/readyz", get(health::readyz))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            global_rate_limit,
        ))
        .layer(middleware::from_fn(attach_request_id_context))
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(trace)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(
            request_id_header,
            MakeRequestUuid::default(),
        ))
        .layer(cors)
        .with_state(state)
}

/// State backed by `data_dir` with a fixed session secret and the cheapest
/// bcrypt cost.
pub fn test_state(data_dir: &Path) -> SharedState {
    Arc::new(AppState::new(
        AppConfig::for_tests(data_dir),
        Arc::new(LogNotifier),
    ))
}

/// Create a collection file that does not exist yet. A malformed file is
/// left for the repositories, which read it as empty.
async fn ensure_collection<T: Document>(
    store: &RecordStore,
    collection: Collection,
) -> Result<(), ApiError> {
    match store.try_load::<T>(collection).await {
        Ok(_) => Ok(()),
        Err(err @ StorageError::Parse { .. }) => {
            warn!(
                collection = collection.as_str(),
                error = %err,
                "malformed collection at startup; serving it as empty"
            );
            Ok(())
        }
        Err(err) => Err(ApiError::Storage(err.to_string())),
    }
}

/// Create the data directory and any missing collection files.
async fn prepare_data_dir(config: &AppConfig) -> Result<StoreConfig, ApiError> {
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .map_err(|err| {
            ApiError::Config(format!(
                "cannot create data dir {}: {err}",
                config.data_dir.display()
            ))
        })?;

    let store_config = StoreConfig::in_dir(&config.data_dir);
    let store = RecordStore::new(store_config.clone());
    ensure_collection::<Vec<jm_common::Worker>>(&store, Collection::Workers).await?;
    ensure_collection::<jm_common::api::contractor::ContractorTable>(
        &store,
        Collection::Contractors,
    )
    .await?;
    ensure_collection::<Vec<jm_common::AvailabilityEvent>>(&store, Collection::Availability)
        .await?;

    Ok(store_config)
}

pub async fn run() -> Result<(), ApiError> {
    dotenv().ok();
    let log_target = init_tracing_subscriber(env!("CARGO_PKG_NAME"));
    install_tracing_panic_hook(env!("CARGO_PKG_NAME"), &log_target);

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli)?;
    let store_config = prepare_data_dir(&config).await?;
    log_store_layout(&store_config);

    let state = Arc::new(AppState::new(config.clone(), Arc::new(LogNotifier)));

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let app = create_router(state.clone());

    info!(%addr, "jm-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let service = app.into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(())
}

async fn shutdown_signal(state: SharedState) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            let _ = sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    state.readiness.store(false, Ordering::SeqCst);

    // Let load balancers observe /readyz failing before the listener closes.
    tokio::time::sleep(SHUTDOWN_DRAIN_GRACE).await;
}
