//! Service wiring: storage adapters, the lifecycle service and the auth gate.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use claimdesk_auth::{AuthGate, TokenService, UserDirectory};
use claimdesk_infra::{
    ClaimLifecycleService, InMemoryClaimStore, InMemoryDirectory, PostgresClaimStore,
    PostgresDirectory, schema,
};

use crate::config::{AppConfig, StorageConfig};

/// Everything a request handler needs, shared across requests.
#[derive(Clone)]
pub struct AppServices {
    pub claims: ClaimLifecycleService,
    pub users: Arc<dyn UserDirectory>,
    pub gate: Arc<AuthGate>,
    pub tokens: Arc<TokenService>,
}

impl AppServices {
    /// In-memory stores joined against `directory`.
    pub fn in_memory(directory: Arc<InMemoryDirectory>, tokens: TokenService) -> Self {
        let store = Arc::new(InMemoryClaimStore::new(directory.clone()));
        let claims = ClaimLifecycleService::new(store.clone(), store, directory.clone(), directory.clone());
        Self::assemble(claims, directory, tokens)
    }

    pub fn postgres(pool: sqlx::PgPool, tokens: TokenService) -> Self {
        let store = Arc::new(PostgresClaimStore::new(pool.clone()));
        let directory = Arc::new(PostgresDirectory::new(pool));
        let claims = ClaimLifecycleService::new(store.clone(), store, directory.clone(), directory.clone());
        Self::assemble(claims, directory, tokens)
    }

    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl);

        match &config.storage {
            StorageConfig::InMemory => {
                info!("using in-memory stores");
                Ok(Self::in_memory(Arc::new(InMemoryDirectory::new()), tokens))
            }
            StorageConfig::Postgres {
                database_url,
                max_connections,
            } => {
                info!(max_connections, "using Postgres stores");
                let pool = PgPoolOptions::new()
                    .max_connections(*max_connections)
                    .connect(database_url)
                    .await
                    .context("failed to connect to Postgres")?;
                schema::migrate(&pool)
                    .await
                    .context("failed to apply schema")?;
                Ok(Self::postgres(pool, tokens))
            }
        }
    }

    fn assemble(
        claims: ClaimLifecycleService,
        users: Arc<dyn UserDirectory>,
        tokens: TokenService,
    ) -> Self {
        let tokens = Arc::new(tokens);
        let gate = Arc::new(AuthGate::new(tokens.clone(), users.clone()));
        Self {
            claims,
            users,
            gate,
            tokens,
        }
    }
}
