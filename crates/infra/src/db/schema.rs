use sqlx::PgPool;
use tracing::info;

/// Idempotent table and index creation, in dependency order.
const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(255) UNIQUE NOT NULL,
        password VARCHAR(255) NOT NULL,
        role VARCHAR(20) NOT NULL,
        status VARCHAR(20) NOT NULL,
        address TEXT,
        phone VARCHAR(50),
        documents JSONB,
        created TIMESTAMPTZ NOT NULL,
        updated TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
    "CREATE INDEX IF NOT EXISTS idx_users_status ON users(status)",
    r#"
    CREATE TABLE IF NOT EXISTS pets (
        id UUID PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        species VARCHAR(50) NOT NULL,
        breed VARCHAR(100),
        age INT NOT NULL CHECK (age >= 0),
        description TEXT,
        status VARCHAR(50) NOT NULL,
        images JSONB,
        created TIMESTAMPTZ NOT NULL,
        updated TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_pets_status ON pets(status)",
    "CREATE INDEX IF NOT EXISTS idx_pets_species ON pets(species)",
    "CREATE INDEX IF NOT EXISTS idx_pets_breed ON pets(breed)",
    r#"
    CREATE TABLE IF NOT EXISTS adoptions (
        id UUID PRIMARY KEY,
        pet_id UUID NOT NULL,
        user_id UUID NOT NULL,
        status VARCHAR(50) NOT NULL,
        documents JSONB,
        created TIMESTAMPTZ NOT NULL,
        updated TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_adoptions_pet_id ON adoptions(pet_id)",
    "CREATE INDEX IF NOT EXISTS idx_adoptions_user_id ON adoptions(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_adoptions_status ON adoptions(status)",
    r#"
    CREATE TABLE IF NOT EXISTS donations (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL,
        amount DOUBLE PRECISION NOT NULL CHECK (amount > 0),
        status VARCHAR(20) NOT NULL,
        comment TEXT,
        anonymous BOOLEAN NOT NULL DEFAULT FALSE,
        created TIMESTAMPTZ NOT NULL,
        updated TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_donations_user_id ON donations(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_donations_status ON donations(status)",
    "CREATE INDEX IF NOT EXISTS idx_donations_created ON donations(created)",
];

/// Create missing tables and indexes.
pub async fn bootstrap(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!(statements = STATEMENTS.len(), "database schema ready");
    Ok(())
}
