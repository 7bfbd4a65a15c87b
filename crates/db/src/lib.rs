//! Persistence layer for posts, likes and comments.
//!
//! The services only see the traits in [`store`]. [`repositories`] implements
//! them on top of sea-orm; [`memory`] implements them over in-process maps.

pub mod entities;
pub mod memory;
pub mod migrations;
pub mod repositories;
pub mod store;
pub mod test_utils;

use posts_common::{AppError, Config};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::log::LevelFilter;

pub use memory::InMemoryStore;
pub use repositories::{CommentRepository, LikeRepository, PostRepository};
pub use store::{
    CommentStore, CommentStoreRef, LikeStore, LikeStoreRef, NewComment, NewLike, NewPost,
    PostStore, PostStoreRef,
};

/// Open the connection pool.
pub async fn init(config: &Config) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(&config.database.url);

    opt.max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    use sea_orm_migration::MigratorTrait;
    migrations::Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))
}
