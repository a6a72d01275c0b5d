//! PostgreSQL-backed `ProfileRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProfileRepository, ProfileRepositoryError, StoredCredential};
use crate::domain::{EmailAddress, PasswordDigest, Profile, ProfileId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, map_corrupt_row, unique_violation,
};
use super::models::{CredentialRow, NewProfileRow, ProfileRow, ProfileUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::profiles;

/// Diesel-backed implementation of the `ProfileRepository` port.
#[derive(Clone)]
pub struct DieselProfileRepository {
    pool: DbPool,
}

impl DieselProfileRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProfileRepositoryError {
    map_basic_pool_error(error, ProfileRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProfileRepositoryError {
    map_basic_diesel_error(
        error,
        ProfileRepositoryError::query,
        ProfileRepositoryError::connection,
    )
}

fn to_profile(row: ProfileRow) -> Result<Profile, ProfileRepositoryError> {
    Profile::try_from(row).map_err(|err| map_corrupt_row(err, ProfileRepositoryError::query))
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn create(
        &self,
        profile: &Profile,
        digest: &PasswordDigest,
    ) -> Result<(), ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(profiles::table)
            .values(&NewProfileRow::new(profile, digest))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| match unique_violation(&err) {
                Some(_) => ProfileRepositoryError::duplicate_email(profile.email().as_ref()),
                None => map_diesel_error(err),
            })
    }

    async fn find_by_id(&self, id: &ProfileId) -> Result<Option<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProfileRow> = profiles::table
            .filter(profiles::id.eq(id.as_uuid()))
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(to_profile).transpose()
    }

    async fn find_credential(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredential>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<CredentialRow> = profiles::table
            .filter(profiles::email.eq(email.as_ref()))
            .select(CredentialRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(|row| StoredCredential {
            profile_id: ProfileId::from_uuid(row.id),
            digest: row.digest(),
        }))
    }

    async fn update(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(profiles::table.filter(profiles::id.eq(profile.id().as_uuid())))
            .set(&ProfileUpdate::from(profile))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(&self) -> Result<Vec<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ProfileRow> = profiles::table
            .order((profiles::created_at.asc(), profiles::email.asc()))
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(to_profile).collect()
    }
}
