//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tokio::net::TcpListener;

use config_cache::cache::ConfigCache;
use config_cache::config::ServerConfig;
use config_cache::http::HttpServer;
use config_cache::lifecycle::Shutdown;

/// Longer than the modification-time granularity of common filesystems.
pub const MTIME_SETTLE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectT {
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigNameT {
    pub integer: i64,
    pub float: f64,
    pub string: String,
    pub boolean: bool,
    pub object: ObjectT,
}

pub fn expected_config_name() -> ConfigNameT {
    ConfigNameT {
        integer: 1,
        float: 0.5,
        string: "hello".to_string(),
        boolean: true,
        object: ObjectT {
            key: "value".to_string(),
        },
    }
}

pub fn testdata_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Copy the fixture documents into a scratch directory.
pub fn scratch_testdata() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for entry in std::fs::read_dir(testdata_dir()).unwrap() {
        let entry = entry.unwrap();
        std::fs::copy(entry.path(), dir.path().join(entry.file_name())).unwrap();
    }
    dir
}

/// A running server bound to an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub cache: Arc<ConfigCache>,
    pub shutdown: Shutdown,
    pub dir: TempDir,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server over a scratch copy of the fixtures.
pub async fn start_server(sync_timeout: Duration, mut config: ServerConfig) -> TestServer {
    let dir = scratch_testdata();
    let cache = Arc::new(ConfigCache::new(dir.path()).with_sync_timeout(sync_timeout));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, cache.clone(), shutdown.subscribe());
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    TestServer {
        addr,
        cache,
        shutdown,
        dir,
    }
}
