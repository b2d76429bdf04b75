//! Contact message repository.

use sqlx::PgPool;
use tracing::instrument;

use afrah_core::MessageId;

use crate::RepositoryError;
use crate::models::{ContactMessage, NewContactMessage};

pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, message), fields(subject = %message.subject))]
    pub async fn create(
        &self,
        message: &NewContactMessage,
    ) -> Result<ContactMessage, RepositoryError> {
        let saved = sqlx::query_as::<_, ContactMessage>(
            "INSERT INTO shop.contact_message (name, email, phone, subject, message) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, email, phone, subject, message, created_at",
        )
        .bind(&message.name)
        .bind(message.email.as_str())
        .bind(message.phone.as_ref().map(afrah_core::Phone::as_str))
        .bind(&message.subject)
        .bind(&message.message)
        .fetch_one(self.pool)
        .await?;
        Ok(saved)
    }

    /// All messages, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ContactMessage>, RepositoryError> {
        let messages = sqlx::query_as::<_, ContactMessage>(
            "SELECT id, name, email, phone, subject, message, created_at \
             FROM shop.contact_message ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(messages)
    }

    /// Delete a message, returning it so the caller can name the sender.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message does not exist.
    #[instrument(skip(self), fields(message_id = %id))]
    pub async fn delete(&self, id: MessageId) -> Result<ContactMessage, RepositoryError> {
        sqlx::query_as::<_, ContactMessage>(
            "DELETE FROM shop.contact_message WHERE id = $1 \
             RETURNING id, name, email, phone, subject, message, created_at",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
