//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AppointmentCommand, AppointmentQuery, AppointmentRepository, DoctorCommand,
    DoctorQuery, DoctorRepository, PasswordHasher, ProfileCommand, ProfileQuery,
    ProfileRepository, ScheduleCommand, ScheduleQuery, ScheduleRepository, SlotQuery,
};
use crate::domain::{
    AccountService, Actor, AppointmentService, ClinicClock, DoctorService, Error, ProfileService,
    ScheduleService, SlotService,
};
use crate::inbound::http::session::SessionContext;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub profiles: Arc<dyn ProfileQuery>,
    pub profile_commands: Arc<dyn ProfileCommand>,
    pub doctors: Arc<dyn DoctorQuery>,
    pub doctor_commands: Arc<dyn DoctorCommand>,
    pub schedules: Arc<dyn ScheduleQuery>,
    pub schedule_commands: Arc<dyn ScheduleCommand>,
    pub slots: Arc<dyn SlotQuery>,
    pub appointments: Arc<dyn AppointmentQuery>,
    pub appointment_commands: Arc<dyn AppointmentCommand>,
}

/// Driven adapters the domain services are assembled from.
pub struct StateRepositories<P, D, S, A, H> {
    pub profiles: Arc<P>,
    pub doctors: Arc<D>,
    pub schedules: Arc<S>,
    pub appointments: Arc<A>,
    pub hasher: Arc<H>,
    pub clock: ClinicClock,
}

impl HttpState {
    /// Assemble every driving port from one set of repositories.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use chrono::FixedOffset;
    /// use clinic_backend::domain::ClinicClock;
    /// use clinic_backend::inbound::http::state::{HttpState, StateRepositories};
    /// use clinic_backend::outbound::memory::MemoryStore;
    /// use clinic_backend::outbound::security::Pbkdf2PasswordHasher;
    /// use mockable::DefaultClock;
    ///
    /// let store = Arc::new(MemoryStore::new());
    /// let offset = FixedOffset::east_opt(0).expect("offset");
    /// let state = HttpState::from_repositories(StateRepositories {
    ///     profiles: store.clone(),
    ///     doctors: store.clone(),
    ///     schedules: store.clone(),
    ///     appointments: store,
    ///     hasher: Arc::new(Pbkdf2PasswordHasher::default()),
    ///     clock: ClinicClock::new(Arc::new(DefaultClock), offset),
    /// });
    /// let _accounts = state.accounts.clone();
    /// ```
    pub fn from_repositories<P, D, S, A, H>(repos: StateRepositories<P, D, S, A, H>) -> Self
    where
        P: ProfileRepository + 'static,
        D: DoctorRepository + 'static,
        S: ScheduleRepository + 'static,
        A: AppointmentRepository + 'static,
        H: PasswordHasher + 'static,
    {
        let StateRepositories {
            profiles,
            doctors,
            schedules,
            appointments,
            hasher,
            clock,
        } = repos;
        let utc = clock.utc_clock().clone();

        let profile_service = Arc::new(ProfileService::new(
            profiles.clone(),
            doctors.clone(),
            utc.clone(),
        ));
        let doctor_service = Arc::new(DoctorService::new(
            doctors.clone(),
            profiles.clone(),
            utc.clone(),
        ));
        let schedule_service = Arc::new(ScheduleService::new(schedules.clone(), doctors.clone()));
        let slot_service = Arc::new(SlotService::new(
            schedules,
            doctors.clone(),
            appointments.clone(),
            clock.clone(),
        ));
        let appointment_service = Arc::new(AppointmentService::new(
            appointments,
            doctors,
            profiles.clone(),
            slot_service.clone(),
            clock,
        ));

        Self {
            accounts: Arc::new(AccountService::new(profiles, hasher, utc)),
            profiles: profile_service.clone(),
            profile_commands: profile_service,
            doctors: doctor_service.clone(),
            doctor_commands: doctor_service,
            schedules: schedule_service.clone(),
            schedule_commands: schedule_service,
            slots: slot_service,
            appointments: appointment_service.clone(),
            appointment_commands: appointment_service,
        }
    }

    /// Resolve the signed-in caller into a policy [`Actor`].
    ///
    /// Fails with `unauthorized` when the session is empty or names a
    /// profile that no longer exists.
    pub async fn actor(&self, session: &SessionContext) -> Result<Actor, Error> {
        let profile_id = session.require_profile_id()?;
        self.profiles.resolve_actor(&profile_id).await
    }
}
