//! Customer service entry point.
//!
//! Serves `/customers` over the pool configured from the environment.

use directory_service::domain::Entity;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    directory_service::server::run(Entity::Customer).await
}
