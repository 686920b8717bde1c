//! Fetches every URL given on the command line concurrently on one thread and prints the
//! results in the order they complete.
//!
//! ```sh
//! cargo run --example fan_in -- http://example.com/ http://example.org/
//! ```

use micro_fiber::channel::Channel;
use micro_fiber::client::Client;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        urls = vec!["http://example.com/".to_string(), "http://example.org/".to_string(), "http://example.net/".to_string()];
    }

    let client = Client::builder()
        .default_header("user-agent", "micro-fiber/fan_in")
        .decode_content(true)
        .build()
        .expect("static client settings are valid");
    let channel = Channel::new();

    for url in &urls {
        let client = client.clone();
        let channel = channel.clone();
        let url = url.clone();
        tokio::spawn(async move {
            let result = match client.get(&url).send().await {
                Ok(mut response) => match response.body_mut().bytes().await {
                    Ok(body) => Ok((response.status(), body.len())),
                    Err(e) => Err(e.to_string()),
                },
                Err(e) => Err(e.to_string()),
            };
            channel.write((url, result));
        });
    }

    for _ in 0..urls.len() {
        match channel.read().await {
            (url, Ok((status, length))) => info!(url, %status, length, "fetched"),
            (url, Err(cause)) => error!(url, cause, "fetch failed"),
        }
    }
}
