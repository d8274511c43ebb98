use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use marquee_domain::repository::{ShowtimeRepository, StoreError};

/// Showtimes are owned by the catalog subsystem; the booking core only
/// checks that a referenced showtime exists and is still active.
pub struct PgShowtimeRepository {
    pub pool: PgPool,
}

#[async_trait]
impl ShowtimeRepository for PgShowtimeRepository {
    async fn exists_active(&self, showtime_id: Uuid) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM showtimes WHERE id = $1 AND is_active)",
        )
        .bind(showtime_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
