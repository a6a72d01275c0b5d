//! PostgreSQL-backed `DoctorRepository` implementation using Diesel ORM.
//!
//! Directory listings join `doctors` with `profiles` so the public name and
//! avatar travel with each record.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DoctorRepository, DoctorRepositoryError};
use crate::domain::{
    AvatarUrl, Doctor, DoctorFilter, DoctorId, DoctorListing, FullName, ProfileId,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, map_corrupt_row, unique_violation,
};
use super::models::{CorruptRow, DoctorRow};
use super::pool::{DbPool, PoolError};
use super::schema::{doctors, profiles};

diesel::define_sql_function!(fn lower(value: Text) -> Text);

/// Diesel-backed implementation of the `DoctorRepository` port.
#[derive(Clone)]
pub struct DieselDoctorRepository {
    pool: DbPool,
}

impl DieselDoctorRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

type ListingRow = (DoctorRow, String, Option<String>);

fn map_pool_error(error: PoolError) -> DoctorRepositoryError {
    map_basic_pool_error(error, DoctorRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> DoctorRepositoryError {
    map_basic_diesel_error(
        error,
        DoctorRepositoryError::query,
        DoctorRepositoryError::connection,
    )
}

fn map_corrupt(error: CorruptRow) -> DoctorRepositoryError {
    map_corrupt_row(error, DoctorRepositoryError::query)
}

fn to_doctor(row: DoctorRow) -> Result<Doctor, DoctorRepositoryError> {
    Doctor::try_from(row).map_err(map_corrupt)
}

fn to_listing((row, full_name, avatar_url): ListingRow) -> Result<DoctorListing, DoctorRepositoryError> {
    let profile_id = row.profile_id;
    let invalid = |err: crate::domain::ProfileValidationError| {
        map_corrupt(CorruptRow {
            table: "profiles",
            id: profile_id,
            message: err.to_string(),
        })
    };
    Ok(DoctorListing {
        doctor: to_doctor(row)?,
        full_name: FullName::new(&full_name).map_err(invalid)?,
        avatar_url: avatar_url.map(AvatarUrl::new).transpose().map_err(invalid)?,
    })
}

#[async_trait]
impl DoctorRepository for DieselDoctorRepository {
    async fn create(&self, doctor: &Doctor) -> Result<(), DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(doctors::table)
            .values(&DoctorRow::from(doctor))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| match unique_violation(&err) {
                Some(_) => DoctorRepositoryError::duplicate_profile(doctor.profile_id().to_string()),
                None => map_diesel_error(err),
            })
    }

    async fn find_by_id(&self, id: &DoctorId) -> Result<Option<Doctor>, DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<DoctorRow> = doctors::table
            .filter(doctors::id.eq(id.as_uuid()))
            .select(DoctorRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(to_doctor).transpose()
    }

    async fn find_by_profile(
        &self,
        profile_id: &ProfileId,
    ) -> Result<Option<Doctor>, DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<DoctorRow> = doctors::table
            .filter(doctors::profile_id.eq(profile_id.as_uuid()))
            .select(DoctorRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(to_doctor).transpose()
    }

    async fn find_listing(
        &self,
        id: &DoctorId,
    ) -> Result<Option<DoctorListing>, DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ListingRow> = doctors::table
            .inner_join(profiles::table)
            .filter(doctors::id.eq(id.as_uuid()))
            .select((
                DoctorRow::as_select(),
                profiles::full_name,
                profiles::avatar_url,
            ))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(to_listing).transpose()
    }

    async fn list(
        &self,
        filter: &DoctorFilter,
    ) -> Result<Vec<DoctorListing>, DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = doctors::table
            .inner_join(profiles::table)
            .select((
                DoctorRow::as_select(),
                profiles::full_name,
                profiles::avatar_url,
            ))
            .into_boxed();
        if let Some(specialization) = &filter.specialization {
            query = query.filter(
                lower(doctors::specialization).eq(specialization.as_ref().to_lowercase()),
            );
        }
        if filter.discoverable_only {
            query = query
                .filter(doctors::is_verified.eq(true))
                .filter(doctors::is_available.eq(true));
        }

        let rows: Vec<ListingRow> = query
            .order((profiles::full_name.asc(), doctors::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(to_listing).collect()
    }

    async fn update(&self, doctor: &Doctor) -> Result<(), DoctorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(doctors::table.filter(doctors::id.eq(doctor.id().as_uuid())))
            .set(&DoctorRow::from(doctor))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
