use std::process;

#[tokio::main]
async fn main() {
    match autoplay_next::cli::run().await {
        Ok(()) => {}
        Err(err) => {
            println!("{err}");
            process::exit(1);
        }
    }
}
