mod cli;
mod infra;
mod inspect;
mod routes;
mod server;

use mortgage_rules::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
