use potluck_common::db;

use actix_web::web::Data;
use actix_web::{App, HttpServer};
use flexi_logger::{
    Age, Cleanup, Criterion, Duplicate, FileSpec, LogSpecification, Logger, Naming, WriteMode,
};

mod env;
mod handlers;
mod middleware;
mod services;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let mut port = 9000u16;
    let mut reset_db = false;

    let mut args = std::env::args();

    // Eat the first argument, which is the relative path to the executable
    args.next();

    while let Some(arg) = args.next() {
        match arg.to_lowercase().as_str() {
            "--port" => {
                let port_str = match args.next() {
                    Some(s) => s,
                    None => {
                        eprintln!("ERROR: --port option specified but no port was given");
                        std::process::exit(1);
                    }
                };

                port = match port_str.parse::<u16>() {
                    Ok(p) => p,
                    Err(_) => {
                        eprintln!("ERROR: Incorrect format for port. Integer expected");
                        std::process::exit(1);
                    }
                };
            }
            "--reset-db" => reset_db = true,
            a => {
                eprintln!("ERROR: Invalid argument: {}", &a);
                std::process::exit(1);
            }
        }
    }

    let log_spec = match LogSpecification::parse(&env::CONF.log_level) {
        Ok(s) => s,
        Err(_) => {
            eprintln!(
                "ERROR: Invalid log level '{}'. Falling back to 'info'",
                env::CONF.log_level,
            );
            LogSpecification::info()
        }
    };

    let _logger = Logger::with(log_spec)
        .log_to_file(FileSpec::default().directory("./logs"))
        .rotate(
            Criterion::Age(Age::Day),
            Naming::Timestamps,
            Cleanup::KeepLogAndCompressedFiles(60, 365),
        )
        .cleanup_in_background_thread(true)
        .duplicate_to_stdout(Duplicate::All)
        .write_mode(WriteMode::Async)
        .format(|writer, now, record| {
            write!(
                writer,
                "{:5} | {} | {}:{} | {}",
                record.level(),
                now.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
                record.module_path().unwrap_or("<unknown>"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .use_utc()
        .start()
        .expect("Failed to start logger");

    let actix_workers = env::CONF.actix_worker_count;

    // Each worker may hold a connection while it blocks, so the pool must be at
    // least as large as the worker count
    let db_max_connections = env::CONF.db_max_connections.max(actix_workers as u32);

    log::info!("Opening database at {}...", env::CONF.database_path);

    let db_thread_pool = match db::create_db_thread_pool(
        &env::CONF.database_path,
        db_max_connections,
        env::CONF.db_idle_timeout,
        env::CONF.db_busy_timeout,
    ) {
        Ok(p) => p,
        Err(e) => {
            log::error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    let migration_result = if reset_db {
        log::warn!("Resetting database. All existing data will be dropped");
        db::reset_database(&db_thread_pool)
    } else {
        db::run_migrations(&db_thread_pool)
    };

    if let Err(e) = migration_result {
        log::error!("{e}");
        std::process::exit(1);
    }

    log::info!("Database is ready");

    let base_addr = format!("127.0.0.1:{}", &port);
    log::info!("Listening on {base_addr} with {actix_workers} workers");

    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(db_thread_pool.clone()))
            .configure(services::api::configure)
            .wrap(actix_web::middleware::Logger::default())
    })
    .workers(actix_workers)
    .bind(base_addr)?
    .run()
    .await?;

    // No requests are in flight once the server has stopped
    unsafe {
        env::CONF.zeroize();
    }

    Ok(())
}
