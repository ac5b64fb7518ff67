#![allow(dead_code)]

use axum::Router;
use axum::extract::ConnectInfo;
use axum_test::TestServer;
use linkpulse::application::services::{CodePolicy, LinkService, StatsService};
use linkpulse::domain::click_pipeline::{ClickPipeline, PipelineConfig};
use linkpulse::domain::entities::{Link, NewLink};
use linkpulse::domain::repositories::LinkRepository;
use linkpulse::infrastructure::persistence::MemoryStore;
use linkpulse::routes::{app_router, routes};
use linkpulse::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::Layer;

pub const BASE_URL: &str = "http://short.test";

/// Inserts a fixed peer address, standing in for
/// `into_make_service_with_connect_info`.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// A running router over an in-memory store.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub pipeline: Arc<ClickPipeline>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_pipeline(PipelineConfig::new(100, 2))
    }

    pub fn with_pipeline(pipeline_config: PipelineConfig) -> Self {
        Self::build(pipeline_config, false, false)
    }

    pub fn behind_proxy() -> Self {
        Self::build(PipelineConfig::new(100, 2), true, false)
    }

    /// Serves the full application router, trailing-slash normalization included.
    pub fn with_app_router() -> Self {
        Self::build(PipelineConfig::new(100, 2), false, true)
    }

    fn build(pipeline_config: PipelineConfig, behind_proxy: bool, normalize_paths: bool) -> Self {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Arc::new(ClickPipeline::start(pipeline_config, store.clone()));

        let link_service = Arc::new(LinkService::new(
            store.clone() as Arc<dyn LinkRepository>,
            CodePolicy::default(),
        ));
        let stats_service = Arc::new(StatsService::new(
            store.clone() as Arc<dyn LinkRepository>,
            store.clone() as Arc<dyn linkpulse::domain::repositories::ClickRepository>,
        ));

        let state = AppState::new(
            link_service,
            stats_service,
            pipeline.clone(),
            BASE_URL,
            behind_proxy,
        );

        let app = if normalize_paths {
            Router::new()
                .fallback_service(app_router(state))
                .layer(MockConnectInfoLayer)
        } else {
            routes(state).layer(MockConnectInfoLayer)
        };
        let server = TestServer::new(app).unwrap();

        Self {
            server,
            store,
            pipeline,
        }
    }

    /// Inserts a link directly into the store.
    pub async fn insert_link(&self, code: &str, url: &str) -> Link {
        self.store
            .create(NewLink::now(code.to_string(), url.to_string()))
            .await
            .unwrap()
    }
}
