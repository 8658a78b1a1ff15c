use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

/// Constraint names the adapter translates into domain errors.
pub mod constraints {
    pub const USERS_EMAIL: &str = "users_email_key";
    pub const MEMBERS_USER_UNIQUE: &str = "members_user_id_key";
    pub const BOOKINGS_ACTIVE_UNIQUE: &str = "bookings_active_member_session_key";
    pub const ATTENDANCE_UNIQUE: &str = "attendance_member_session_key";

    pub const MEMBERS_USER_FK: &str = "members_user_id_fkey";
    pub const MEMBERSHIPS_MEMBER_FK: &str = "memberships_member_id_fkey";
    pub const MEMBERSHIPS_PLAN_FK: &str = "memberships_plan_id_fkey";
    pub const CLASSES_GYM_FK: &str = "classes_gym_id_fkey";
    pub const CLASSES_TRAINER_FK: &str = "classes_trainer_id_fkey";
    pub const SESSIONS_CLASS_FK: &str = "class_sessions_class_id_fkey";
    pub const BOOKINGS_SESSION_FK: &str = "bookings_session_id_fkey";
    pub const BOOKINGS_MEMBER_FK: &str = "bookings_member_id_fkey";
    pub const ATTENDANCE_SESSION_FK: &str = "attendance_session_id_fkey";
    pub const ATTENDANCE_MEMBER_FK: &str = "attendance_member_id_fkey";
    pub const PAYMENTS_MEMBER_FK: &str = "payments_member_id_fkey";
}

const TABLES: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            phone_number TEXT NULL,
            date_of_birth DATE NULL,
            gender TEXT NULL,
            fitness_goals TEXT NULL,
            emergency_contact_name TEXT NULL,
            emergency_contact_phone TEXT NULL,
            role TEXT NOT NULL CHECK (role IN ('member', 'trainer', 'admin')),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT users_email_key UNIQUE (email)
        );
        "#,
    ),
    (
        "members",
        r#"
        CREATE TABLE IF NOT EXISTS members (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            date_of_birth DATE NULL,
            gender TEXT NULL,
            emergency_contact JSONB NOT NULL DEFAULT '{}'::jsonb,
            notes TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT members_user_id_key UNIQUE (user_id),
            CONSTRAINT members_user_id_fkey FOREIGN KEY (user_id)
                REFERENCES users(id) ON DELETE CASCADE
        );
        "#,
    ),
    (
        "plans",
        r#"
        CREATE TABLE IF NOT EXISTS plans (
            id UUID PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NULL,
            price_cents BIGINT NOT NULL CHECK (price_cents >= 0),
            billing_cycle TEXT NOT NULL
                CHECK (billing_cycle IN ('weekly', 'monthly', 'quarterly', 'annual')),
            session_quota INTEGER NULL CHECK (session_quota IS NULL OR session_quota > 0),
            access TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    ),
    (
        "memberships",
        r#"
        CREATE TABLE IF NOT EXISTS memberships (
            id UUID PRIMARY KEY,
            member_id UUID NOT NULL,
            plan_id UUID NOT NULL,
            start_date TIMESTAMP WITH TIME ZONE NOT NULL,
            end_date TIMESTAMP WITH TIME ZONE NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('active', 'expired', 'cancelled')),
            auto_renew BOOLEAN NOT NULL DEFAULT TRUE,
            payment_method_id TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT memberships_valid_window CHECK (end_date > start_date),
            CONSTRAINT memberships_member_id_fkey FOREIGN KEY (member_id)
                REFERENCES members(id) ON DELETE CASCADE,
            CONSTRAINT memberships_plan_id_fkey FOREIGN KEY (plan_id)
                REFERENCES plans(id)
        );
        "#,
    ),
    (
        "gyms",
        r#"
        CREATE TABLE IF NOT EXISTS gyms (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            address TEXT NULL,
            phone TEXT NULL,
            timezone TEXT NULL,
            opening_hours JSONB NOT NULL DEFAULT 'null'::jsonb,
            settings JSONB NOT NULL DEFAULT 'null'::jsonb,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    ),
    (
        "classes",
        r#"
        CREATE TABLE IF NOT EXISTS classes (
            id UUID PRIMARY KEY,
            gym_id UUID NOT NULL,
            title TEXT NOT NULL,
            description TEXT NULL,
            trainer_id UUID NOT NULL,
            capacity INTEGER NOT NULL CHECK (capacity > 0),
            recurring_rule JSONB NULL,
            duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT classes_gym_id_fkey FOREIGN KEY (gym_id)
                REFERENCES gyms(id),
            CONSTRAINT classes_trainer_id_fkey FOREIGN KEY (trainer_id)
                REFERENCES users(id)
        );
        "#,
    ),
    (
        "class_sessions",
        r#"
        CREATE TABLE IF NOT EXISTS class_sessions (
            id UUID PRIMARY KEY,
            class_id UUID NOT NULL,
            starts_at TIMESTAMP WITH TIME ZONE NOT NULL,
            ends_at TIMESTAMP WITH TIME ZONE NOT NULL,
            capacity INTEGER NOT NULL CHECK (capacity > 0),
            status TEXT NOT NULL DEFAULT 'scheduled'
                CHECK (status IN ('scheduled', 'cancelled', 'completed')),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT class_sessions_valid_window CHECK (ends_at > starts_at),
            CONSTRAINT class_sessions_class_id_fkey FOREIGN KEY (class_id)
                REFERENCES classes(id) ON DELETE CASCADE
        );
        "#,
    ),
    (
        "bookings",
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY,
            session_id UUID NOT NULL,
            member_id UUID NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('booked', 'cancelled', 'attended')),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT bookings_session_id_fkey FOREIGN KEY (session_id)
                REFERENCES class_sessions(id) ON DELETE CASCADE,
            CONSTRAINT bookings_member_id_fkey FOREIGN KEY (member_id)
                REFERENCES members(id) ON DELETE CASCADE
        );
        "#,
    ),
    (
        "attendance",
        r#"
        CREATE TABLE IF NOT EXISTS attendance (
            id UUID PRIMARY KEY,
            session_id UUID NOT NULL,
            member_id UUID NOT NULL,
            checkin_method TEXT NOT NULL CHECK (checkin_method IN ('qr', 'staff')),
            checked_in_at TIMESTAMP WITH TIME ZONE NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT attendance_member_session_key UNIQUE (member_id, session_id),
            CONSTRAINT attendance_session_id_fkey FOREIGN KEY (session_id)
                REFERENCES class_sessions(id) ON DELETE CASCADE,
            CONSTRAINT attendance_member_id_fkey FOREIGN KEY (member_id)
                REFERENCES members(id) ON DELETE CASCADE
        );
        "#,
    ),
    (
        "payments",
        r#"
        CREATE TABLE IF NOT EXISTS payments (
            id UUID PRIMARY KEY,
            member_id UUID NOT NULL,
            amount_cents BIGINT NOT NULL CHECK (amount_cents > 0),
            currency TEXT NOT NULL DEFAULT 'ETB',
            method TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'completed', 'failed', 'refunded')),
            reference TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT payments_member_id_fkey FOREIGN KEY (member_id)
                REFERENCES members(id) ON DELETE CASCADE
        );
        "#,
    ),
];

const INDEXES: &[&str] = &[
    // At most one seat-holding booking per member and session.
    "CREATE UNIQUE INDEX IF NOT EXISTS bookings_active_member_session_key
        ON bookings(member_id, session_id) WHERE status <> 'cancelled'",
    "CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)",
    "CREATE INDEX IF NOT EXISTS idx_memberships_member_id ON memberships(member_id)",
    "CREATE INDEX IF NOT EXISTS idx_memberships_due ON memberships(end_date) WHERE status = 'active'",
    "CREATE INDEX IF NOT EXISTS idx_classes_gym_id ON classes(gym_id)",
    "CREATE INDEX IF NOT EXISTS idx_class_sessions_class_id ON class_sessions(class_id)",
    "CREATE INDEX IF NOT EXISTS idx_class_sessions_starts_at ON class_sessions(starts_at)",
    "CREATE INDEX IF NOT EXISTS idx_bookings_session_id ON bookings(session_id)",
    "CREATE INDEX IF NOT EXISTS idx_bookings_member_id ON bookings(member_id)",
    "CREATE INDEX IF NOT EXISTS idx_attendance_member_id ON attendance(member_id)",
    "CREATE INDEX IF NOT EXISTS idx_payments_member_id ON payments(member_id)",
];

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    for (table, ddl) in TABLES {
        sqlx::query(ddl).execute(pool).await?;
        tracing::debug!(table, "table ready");
    }

    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
