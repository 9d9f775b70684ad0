use std::process;

#[tokio::main]
async fn main() {
    let code = livery_cli::run().await;
    process::exit(code);
}
