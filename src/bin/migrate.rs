use anyhow::{anyhow, Result};
use rental_booking_bot::config::Config;
use rental_booking_bot::database::connection::DatabaseManager;
use std::env;
use std::io;
use std::path::Path;

const EXPECTED_TABLES: [&str; 9] = [
    "work_days",
    "service_locations",
    "service_location_work_days",
    "rental_objects",
    "rental_object_locations",
    "rental_object_images",
    "telegram_users",
    "telegram_user_profile_photos",
    "registration_books",
];

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("migrate");

    match command {
        "migrate" | "up" => run_migrations().await,
        "check" => check_database().await,
        "reset" => reset_database().await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_help();
            std::process::exit(1);
        }
    }
}

fn load_config() -> Result<Config> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    println!("📊 Database URL: {}", mask_url(&config.database_url));
    Ok(config)
}

fn sqlite_path(url: &str) -> Option<&str> {
    url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:"))
}

async fn run_migrations() -> Result<()> {
    println!("🔧 Rental Booking Bot - Database Migration Tool");
    println!("===============================================");

    let config = load_config()?;

    if let Some(db_path) = sqlite_path(&config.database_url) {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                println!("📁 Creating directory: {}", parent.display());
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    println!("🚀 Running database migrations...");

    let db_manager = DatabaseManager::new(&config.database_url)
        .await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

    match db_manager.run_migrations().await {
        Ok(_) => {
            println!("✅ Migrations completed successfully!");
            println!("🚗 Rental catalog schema is ready.");
        }
        Err(e) => {
            eprintln!("❌ Migration failed: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn check_database() -> Result<()> {
    println!("🔍 Checking database connection and schema...");

    let config = load_config()?;

    let db_manager = DatabaseManager::new(&config.database_url)
        .await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

    match check_tables(&db_manager).await {
        Ok(tables) => {
            println!("✅ Database connection successful!");
            println!("📋 Tables:");
            for table in EXPECTED_TABLES {
                if tables.iter().any(|t| t == table) {
                    println!("  • {table}");
                } else {
                    println!("  ✗ {table} (missing)");
                }
            }
            if EXPECTED_TABLES.iter().any(|t| !tables.iter().any(|found| found == t)) {
                println!("💡 Run 'migrate up' to create the missing tables");
            }
        }
        Err(e) => {
            println!("⚠️  Database check failed: {e}");
            println!("💡 Try running 'migrate up' to create the schema");
        }
    }

    Ok(())
}

async fn reset_database() -> Result<()> {
    println!("⚠️  WARNING: This will delete ALL locations, rental objects and bookings!");
    println!("🤔 Are you sure you want to continue? (yes/no)");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    if input.trim().to_lowercase() != "yes" {
        println!("❌ Reset cancelled.");
        return Ok(());
    }

    let config = load_config()?;

    match sqlite_path(&config.database_url) {
        Some(db_path) => {
            if Path::new(db_path).exists() {
                std::fs::remove_file(db_path)?;
                println!("🗑️  Deleted database file: {db_path}");
            }
        }
        None => return Err(anyhow!("Reset is only supported for SQLite databases")),
    }

    println!("🔄 Recreating database schema...");
    run_migrations().await?;

    println!("✅ Database reset completed!");

    Ok(())
}

async fn check_tables(db_manager: &DatabaseManager) -> Result<Vec<String>> {
    let tables = sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name"
    )
    .fetch_all(&db_manager.pool)
    .await?;

    Ok(tables)
}

fn mask_url(url: &str) -> String {
    match sqlite_path(url) {
        Some(path) => match Path::new(path).file_name() {
            Some(filename) => format!("sqlite:.../{}", filename.to_string_lossy()),
            None => url.to_string(),
        },
        None => url.to_string(),
    }
}

fn print_help() {
    println!("🚗 Rental Booking Bot - Database Migration Tool");
    println!();
    println!("USAGE:");
    println!("    migrate [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    migrate, up    Run database migrations (default)");
    println!("    check          Check database connection and schema");
    println!("    reset          Reset database (SQLite only) - DESTRUCTIVE!");
    println!("    help           Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    DATABASE_URL             Database connection string (default: sqlite:./data/rental.db)");
    println!("    BOOKING_BLOCKING_POLICY  confirmed-only (default) or all");
    println!();
    println!("EXAMPLES:");
    println!("    migrate                    # Run migrations");
    println!("    migrate check              # Check database status");
    println!("    migrate reset              # Reset database (careful!)");
    println!();
}
