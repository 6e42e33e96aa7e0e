use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match likesign_client::cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
