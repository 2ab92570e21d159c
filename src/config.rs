// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{OrganizationRepository, ScopedEntityRepository, UserRepository},
    registry::EntityRegistry,
    services::{
        auth::AuthService, directory::DirectoryService, gateway::GatewayService,
        scope::ScopePolicy,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub directory_service: DirectoryService,
    pub gateway_service: GatewayService,
}

impl AppState {
    // A assinatura retorna um Result: se a configuração falhar,
    // a aplicação não deve iniciar.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // O registro de entidades valida os mapeamentos de campo AQUI,
        // no boot: um campo de referência sem alvo derruba o processo
        // em vez de estourar (ou vazar dados) no meio de uma requisição.
        let registry = EntityRegistry::load()?;
        tracing::info!(
            "✅ Registro de entidades validado: {:?}",
            registry.slugs()
        );

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let policy = ScopePolicy::new(registry);
        let org_repo = OrganizationRepository::new(db_pool.clone());
        let user_repo = UserRepository::new(db_pool.clone());
        let scoped_repo = ScopedEntityRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret);
        let directory_service = DirectoryService::new(
            org_repo.clone(),
            user_repo.clone(),
            policy.clone(),
            db_pool.clone(),
        );
        let gateway_service = GatewayService::new(policy, org_repo, user_repo, scoped_repo);

        Ok(Self {
            db_pool,
            auth_service,
            directory_service,
            gateway_service,
        })
    }
}
