pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::JwtAuth;
use crate::store::{ObjectStore, PgStore, StorageClient, Store};
use crate::utils::shuffle::{QuestionShuffler, SeededShuffler, ThreadRngShuffler};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub objects: Arc<dyn ObjectStore>,
    pub shuffler: Arc<dyn QuestionShuffler>,
    pub auth: JwtAuth,
    pub avatar_bucket: String,
    pub max_avatar_bytes: usize,
}

impl AppState {
    pub fn new(pool: PgPool) -> Result<Self> {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let store = Arc::new(PgStore::new(pool));
        let objects = Arc::new(StorageClient::new(
            &config.storage_url,
            config.storage_service_key.clone(),
            http_client,
        )?);
        let shuffler: Arc<dyn QuestionShuffler> = match config.shuffle_seed {
            Some(seed) => {
                tracing::warn!(seed, "Question shuffling is seeded; random tests are reproducible");
                Arc::new(SeededShuffler::new(seed))
            }
            None => Arc::new(ThreadRngShuffler),
        };

        Ok(Self {
            store,
            objects,
            shuffler,
            auth: JwtAuth::new(&config.jwt_secret),
            avatar_bucket: config.avatar_bucket.clone(),
            max_avatar_bytes: config.max_avatar_bytes,
        })
    }
}
