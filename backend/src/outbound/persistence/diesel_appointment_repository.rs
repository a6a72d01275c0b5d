//! PostgreSQL-backed `AppointmentRepository` implementation using Diesel ORM.
//!
//! The partial unique index `appointments_active_slot_key` guarantees at
//! most one pending or confirmed booking per doctor, date and time; losing
//! that race surfaces as [`AppointmentRepositoryError::SlotTaken`]. Status
//! changes are compare-and-set on the previous status.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AppointmentRepository, AppointmentRepositoryError, AppointmentScope};
use crate::domain::{Appointment, AppointmentId, AppointmentStatus, DoctorId};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, map_corrupt_row, unique_violation,
};
use super::models::{AppointmentNotesUpdate, AppointmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::appointments;

/// Statuses that occupy a slot.
const ACTIVE_STATUSES: [&str; 2] = ["pending", "confirmed"];

/// Diesel-backed implementation of the `AppointmentRepository` port.
#[derive(Clone)]
pub struct DieselAppointmentRepository {
    pool: DbPool,
}

impl DieselAppointmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AppointmentRepositoryError {
    map_basic_pool_error(error, AppointmentRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AppointmentRepositoryError {
    match unique_violation(&error) {
        Some(constraint) => AppointmentRepositoryError::slot_taken(constraint),
        None => map_basic_diesel_error(
            error,
            AppointmentRepositoryError::query,
            AppointmentRepositoryError::connection,
        ),
    }
}

fn to_appointment(row: AppointmentRow) -> Result<Appointment, AppointmentRepositoryError> {
    Appointment::try_from(row)
        .map_err(|err| map_corrupt_row(err, AppointmentRepositoryError::query))
}

#[async_trait]
impl AppointmentRepository for DieselAppointmentRepository {
    async fn insert(&self, appointment: &Appointment) -> Result<(), AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(appointments::table)
            .values(&AppointmentRow::from(appointment))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &AppointmentId,
    ) -> Result<Option<Appointment>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AppointmentRow> = appointments::table
            .filter(appointments::id.eq(id.as_uuid()))
            .select(AppointmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(to_appointment).transpose()
    }

    async fn list(
        &self,
        scope: AppointmentScope,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Appointment>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = appointments::table
            .select(AppointmentRow::as_select())
            .into_boxed();
        query = match scope {
            AppointmentScope::Patient(patient_id) => {
                query.filter(appointments::patient_id.eq(*patient_id.as_uuid()))
            }
            AppointmentScope::Doctor(doctor_id) => {
                query.filter(appointments::doctor_id.eq(*doctor_id.as_uuid()))
            }
            AppointmentScope::All => query,
        };
        if let Some(date) = date {
            query = query.filter(appointments::appointment_date.eq(date));
        }

        let rows: Vec<AppointmentRow> = query
            .order((
                appointments::appointment_date.asc(),
                appointments::appointment_time.asc(),
                appointments::created_at.asc(),
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(to_appointment).collect()
    }

    async fn booked_times(
        &self,
        doctor_id: &DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        appointments::table
            .filter(appointments::doctor_id.eq(doctor_id.as_uuid()))
            .filter(appointments::appointment_date.eq(date))
            .filter(appointments::status.eq_any(ACTIVE_STATUSES))
            .select(appointments::appointment_time)
            .order(appointments::appointment_time.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn update_status(
        &self,
        appointment: &Appointment,
        expected: AppointmentStatus,
    ) -> Result<(), AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            appointments::table
                .filter(appointments::id.eq(appointment.id().as_uuid()))
                .filter(appointments::status.eq(expected.as_str())),
        )
        .set((
            appointments::status.eq(appointment.status().as_str()),
            appointments::updated_at.eq(appointment.updated_at()),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(AppointmentRepositoryError::status_changed(expected.as_str()));
        }
        Ok(())
    }

    async fn update_notes(
        &self,
        appointment: &Appointment,
    ) -> Result<(), AppointmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(appointments::table.filter(appointments::id.eq(appointment.id().as_uuid())))
            .set(&AppointmentNotesUpdate::from(appointment))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Error classification for booking writes.
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[rstest]
    fn unique_violations_mean_the_slot_is_taken() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value".to_owned()),
        );
        assert!(matches!(
            map_diesel_error(error),
            AppointmentRepositoryError::SlotTaken { .. }
        ));
    }

    #[rstest]
    fn closed_connections_are_connection_errors() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("gone".to_owned()),
        );
        assert!(matches!(
            map_diesel_error(error),
            AppointmentRepositoryError::Connection { .. }
        ));
    }
}
