#[tokio::main]
async fn main() {
    if let Err(e) = intake_lib::run().await {
        eprintln!("intake-flow: {e}");
        std::process::exit(1);
    }
}
