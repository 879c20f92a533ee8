use super::*;

use clap::CommandFactory;
use client_core::DEFAULT_CACHE_KEY;

async fn offline_store(snapshot: &str) -> WordStore {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let api = HttpWordApi::new("http://127.0.0.1:9").expect("api");
    let cache = Arc::new(EphemeralCache::with_snapshot(DEFAULT_CACHE_KEY, snapshot));
    WordStore::open(Arc::new(api), cache, DEFAULT_CACHE_KEY).await
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn add_definition_defaults_to_blank() {
    let cli = Cli::try_parse_from(["vocab", "--no-cache", "add", "fox"]).expect("parse");
    assert!(cli.no_cache);
    match cli.command {
        Command::Add { word, definition } => {
            assert_eq!(word, "fox");
            assert_eq!(definition, "");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn open_defaults_to_root_path() {
    let cli = Cli::try_parse_from(["vocab", "--api-base", "http://words:1", "open"])
        .expect("parse");
    assert_eq!(cli.api_base.as_deref(), Some("http://words:1"));
    assert!(matches!(cli.command, Command::Open { path } if path == "/"));
}

#[tokio::test]
async fn unknown_route_is_an_error() {
    let store = offline_store("[]").await;
    let err = dispatch(
        &store,
        Command::Open {
            path: "/settings".to_string(),
        },
    )
    .await
    .expect_err("no view for path");
    assert!(err.to_string().contains("/settings"));
}

#[tokio::test]
async fn offline_commands_use_cached_pool() {
    let store = offline_store(r#"[{"word":"cat","definition":"a pet","reviewed":0}]"#).await;

    for command in [
        Command::List,
        Command::Random,
        Command::Open {
            path: "/review".to_string(),
        },
    ] {
        dispatch(&store, command).await.expect("dispatch");
    }
}

#[tokio::test]
async fn network_commands_surface_store_errors() {
    let store = offline_store("[]").await;

    let err = dispatch(
        &store,
        Command::Delete {
            word: "cat".to_string(),
        },
    )
    .await
    .expect_err("service is unreachable");
    assert!(err.downcast_ref::<client_core::StoreError>().is_some());
    assert!(store.is_empty());
}
