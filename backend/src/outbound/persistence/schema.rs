//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`
//! exactly. Regenerate with `diesel print-schema` after a schema change.

diesel::table! {
    /// Accounts with their credentials and role.
    profiles (id) {
        id -> Uuid,
        /// Normalised (lower-case) email; unique.
        email -> Varchar,
        /// Encoded PBKDF2 digest.
        password_digest -> Text,
        full_name -> Varchar,
        /// One of `patient`, `doctor` or `admin`.
        role -> Varchar,
        phone -> Nullable<Varchar>,
        avatar_url -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Doctor records; at most one per profile.
    doctors (id) {
        id -> Uuid,
        profile_id -> Uuid,
        specialization -> Varchar,
        experience_years -> Int4,
        /// Minor currency units.
        consultation_fee -> Int8,
        qualification -> Nullable<Varchar>,
        bio -> Nullable<Text>,
        is_verified -> Bool,
        is_available -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Weekly availability windows.
    doctor_schedules (id) {
        id -> Uuid,
        doctor_id -> Uuid,
        /// 0 is Sunday.
        day_of_week -> Int2,
        start_time -> Time,
        end_time -> Time,
        is_available -> Bool,
    }
}

diesel::table! {
    /// Bookings. Pending and confirmed rows hold their slot exclusively.
    appointments (id) {
        id -> Uuid,
        patient_id -> Uuid,
        doctor_id -> Uuid,
        appointment_date -> Date,
        appointment_time -> Time,
        status -> Varchar,
        patient_notes -> Nullable<Text>,
        doctor_notes -> Nullable<Text>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(doctors -> profiles (profile_id));
diesel::joinable!(doctor_schedules -> doctors (doctor_id));
diesel::joinable!(appointments -> doctors (doctor_id));

diesel::allow_tables_to_appear_in_same_query!(profiles, doctors, doctor_schedules, appointments);
