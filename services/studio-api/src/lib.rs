mod backend;
mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use audit_studio::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
