//! Shared builders for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use tokio::net::TcpListener;

use chain_router::config::{AppConfig, ModuleConfig, RouteConfig};
use chain_router::http::{Controllers, HttpServer};
use chain_router::lifecycle::{Application, Shutdown};

pub fn route(name: &str, path: &str, controller: &str) -> RouteConfig {
    RouteConfig {
        name: name.into(),
        path: path.into(),
        controller: controller.into(),
        ..Default::default()
    }
}

pub fn module(name: &str, engine: &str, routes: Vec<RouteConfig>) -> ModuleConfig {
    ModuleConfig {
        name: name.into(),
        engine: engine.into(),
        routes,
    }
}

/// Users (collection), Legacy (tree) and Framework (collection, owning
/// the not-found route), mounted under `/myapp/public`.
pub fn demo_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.app.debug = true;
    config.context.base_path = "/myapp/public".into();

    let mut show = route("user_show", "/users/{id}", "Users:User:show");
    show.requirements.insert("id".into(), r"\d+".into());
    show.methods = vec!["GET".into()];
    config.modules.push(module("Users", "collection", vec![show]));

    config.modules.push(module(
        "Legacy",
        "tree",
        vec![route("legacy_any", "/legacy/{*path}", "Legacy:Proxy:forward")],
    ));

    config.modules.push(module(
        "Framework",
        "collection",
        vec![route("error_404", "/404", "Framework:Error:notFound")],
    ));
    config
}

pub fn booted(config: AppConfig) -> Application {
    let mut app = Application::new(config);
    app.boot().expect("demo config boots");
    app
}

/// Serve `config` with the echo controllers on an ephemeral port.
pub async fn spawn_server(config: AppConfig, shutdown: &Shutdown) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(booted(config), Controllers::echo());
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });
    (addr, handle)
}
