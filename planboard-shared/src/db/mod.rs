/// Database layer for Planboard
///
/// - `pool`: PostgreSQL connection pool lifecycle and health checks
/// - `migrations`: embedded schema migrations
///
/// Entity structs and their queries live in the `models` module.

pub mod migrations;
pub mod pool;
