use rusqlite::Connection;
use tracing::{debug, info};

/// Table definitions in creation order
const TABLES: &[(&str, &str)] = &[
    (
        "users",
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            auth_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            age INTEGER,
            blood_group TEXT,
            phone_no TEXT,
            created_at TEXT NOT NULL
        )",
    ),
    (
        "health_records",
        "CREATE TABLE IF NOT EXISTS health_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            record_type TEXT NOT NULL,
            description TEXT,
            date TEXT,
            created_at TEXT NOT NULL
        )",
    ),
    (
        "medicines",
        "CREATE TABLE IF NOT EXISTS medicines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            dosage TEXT,
            frequency TEXT,
            start_date TEXT,
            end_date TEXT,
            created_at TEXT NOT NULL
        )",
    ),
    (
        "appointments",
        "CREATE TABLE IF NOT EXISTS appointments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            doctor_name TEXT NOT NULL,
            hospital_name TEXT NOT NULL,
            appointment_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL
        )",
    ),
    (
        "reports",
        "CREATE TABLE IF NOT EXISTS reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            file_url TEXT,
            description TEXT,
            report_type TEXT,
            text_content TEXT,
            ai_summary TEXT,
            uploaded_at TEXT NOT NULL
        )",
    ),
    (
        "blood_requests",
        "CREATE TABLE IF NOT EXISTS blood_requests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            blood_group TEXT NOT NULL,
            hospital_name TEXT NOT NULL,
            contact TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'open',
            created_at TEXT NOT NULL
        )",
    ),
    (
        "emergencies",
        "CREATE TABLE IF NOT EXISTS emergencies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            location TEXT,
            critical_info TEXT,
            status TEXT NOT NULL DEFAULT 'active',
            triggered_at TEXT NOT NULL
        )",
    ),
];

/// Every owned table is filtered by user_id on each query
const OWNED_TABLES: &[&str] = &[
    "health_records",
    "medicines",
    "appointments",
    "reports",
    "blood_requests",
    "emergencies",
];

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    for (name, ddl) in TABLES {
        debug!("Creating {} table if not exists", name);
        conn.execute(ddl, [])
            .map_err(|e| format!("Failed to create table {}: {}", name, e))?;
    }

    for table in OWNED_TABLES {
        create_owner_index(conn, table)?;
    }

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create index on user_id for owner-scoped queries
fn create_owner_index(conn: &Connection, table: &str) -> Result<(), String> {
    conn.execute(
        &format!("CREATE INDEX IF NOT EXISTS idx_{table}_user_id ON {table} (user_id)"),
        [],
    ).map_err(|e| format!("Failed to create index on {}: {}", table, e))?;

    Ok(())
}
