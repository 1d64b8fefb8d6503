use dbpeek::core::db::registry::ConnectionRegistry;
use dbpeek::core::db::schema;
use tracing::info;

fn main() {
    // Initialize the logging system using tracing subscriber
    tracing_subscriber::fmt::init();

    info!("Starting dbpeek...");

    let args: Vec<String> = std::env::args().collect();
    let Some(db_path) = args.get(1) else {
        eprintln!("Usage: dbpeek <database-path>");
        std::process::exit(1);
    };

    let registry = ConnectionRegistry::global();
    let shared = match registry.open(db_path) {
        Ok(shared) => shared,
        Err(e) => {
            eprintln!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    {
        let conn = match shared.lock() {
            Ok(conn) => conn,
            Err(_) => {
                eprintln!("Connection lock poisoned");
                std::process::exit(1);
            }
        };

        match schema::list_tables(&conn) {
            Ok(tables) => match serde_json::to_string_pretty(&tables) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to render table list: {}", e),
            },
            Err(e) => eprintln!("Failed to list tables: {}", e),
        }

        let db_info = schema::database_info(&conn, db_path);
        match serde_json::to_string_pretty(&db_info) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to render database info: {}", e),
        }
    }

    drop(shared);
    registry.close_all();
}
