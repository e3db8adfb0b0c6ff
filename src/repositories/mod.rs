use sqlx::PgPool;

pub mod hits_repo;
pub mod posts_repo;
pub mod user_repo;

#[cfg(test)]
pub mod memory;

#[derive(Clone)]
pub struct PostgresRepo {
    pool: PgPool,
}

impl PostgresRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
