#[tokio::main]
async fn main() {
    if let Err(e) = vibe::cli::run().await {
        eprintln!(
            "Whoops. There was an error while executing your command '{}'",
            e
        );
        std::process::exit(1);
    }
}
