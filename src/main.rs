#[tokio::main]
async fn main() {
    if let Err(e) = tasktrack::run().await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}
