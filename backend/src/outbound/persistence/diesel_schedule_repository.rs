//! PostgreSQL-backed `ScheduleRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ScheduleRepository, ScheduleRepositoryError};
use crate::domain::{DayOfWeek, DoctorId, ScheduleEntry, ScheduleEntryId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, map_corrupt_row, unique_violation,
};
use super::models::ScheduleRow;
use super::pool::{DbPool, PoolError};
use super::schema::doctor_schedules;

/// Diesel-backed implementation of the `ScheduleRepository` port.
#[derive(Clone)]
pub struct DieselScheduleRepository {
    pool: DbPool,
}

impl DieselScheduleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ScheduleRepositoryError {
    map_basic_pool_error(error, ScheduleRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ScheduleRepositoryError {
    match unique_violation(&error) {
        Some(constraint) => ScheduleRepositoryError::duplicate_entry(constraint),
        None => map_basic_diesel_error(
            error,
            ScheduleRepositoryError::query,
            ScheduleRepositoryError::connection,
        ),
    }
}

fn to_entry(row: ScheduleRow) -> Result<ScheduleEntry, ScheduleRepositoryError> {
    ScheduleEntry::try_from(row).map_err(|err| map_corrupt_row(err, ScheduleRepositoryError::query))
}

#[async_trait]
impl ScheduleRepository for DieselScheduleRepository {
    async fn insert(&self, entry: &ScheduleEntry) -> Result<(), ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(doctor_schedules::table)
            .values(&ScheduleRow::from(entry))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &ScheduleEntryId,
    ) -> Result<Option<ScheduleEntry>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ScheduleRow> = doctor_schedules::table
            .filter(doctor_schedules::id.eq(id.as_uuid()))
            .select(ScheduleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(to_entry).transpose()
    }

    async fn list_for_doctor(
        &self,
        doctor_id: &DoctorId,
        day: Option<DayOfWeek>,
    ) -> Result<Vec<ScheduleEntry>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = doctor_schedules::table
            .filter(doctor_schedules::doctor_id.eq(*doctor_id.as_uuid()))
            .select(ScheduleRow::as_select())
            .into_boxed();
        if let Some(day) = day {
            query = query.filter(doctor_schedules::day_of_week.eq(i16::from(day.index())));
        }

        let rows: Vec<ScheduleRow> = query
            .order((
                doctor_schedules::day_of_week.asc(),
                doctor_schedules::start_time.asc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(to_entry).collect()
    }

    async fn update(&self, entry: &ScheduleEntry) -> Result<(), ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(doctor_schedules::table.filter(doctor_schedules::id.eq(entry.id().as_uuid())))
            .set(&ScheduleRow::from(entry))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &ScheduleEntryId) -> Result<bool, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(doctor_schedules::table.filter(doctor_schedules::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|deleted| deleted > 0)
            .map_err(map_diesel_error)
    }
}
