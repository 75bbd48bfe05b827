//! Streaming example: print an assistant reply as it arrives.
//!
//! Works against any OpenAI-compatible chat endpoint:
//!   HAVEN_CHAT_URL=https://api.openai.com/v1/chat/completions \
//!   HAVEN_API_KEY=sk-... \
//!   RUST_LOG=haven_stream=debug \
//!   cargo run --example stream_reply -p haven-stream-http -- "What should I do if I feel followed?"

use std::io::Write;

use futures::StreamExt;
use haven_stream::Reply;
use haven_stream_http::{CancellationToken, DecoderConfig, ReplyEvent, send};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let url = std::env::var("HAVEN_CHAT_URL")?;
    let api_key = std::env::var("HAVEN_API_KEY")?;
    let model = std::env::var("HAVEN_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Give me three quick personal safety tips.".into());

    let request = reqwest::Client::new()
        .post(url)
        .bearer_auth(api_key)
        .json(&serde_json::json!({
            "model": model,
            "stream": true,
            "messages": [{ "role": "user", "content": prompt }],
        }));

    // Ctrl-C cancels the reply but keeps whatever already arrived.
    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut stream = send(request, DecoderConfig::default(), token).await;
    let mut reply = Reply::new();
    let mut stdout = std::io::stdout();

    while let Some(event) = stream.next().await {
        match event {
            ReplyEvent::Fragment(text) => {
                print!("{text}");
                stdout.flush()?;
                reply = reply.push(&text);
            }
            ReplyEvent::Finished { outcome, stats } => {
                if reply.is_empty() {
                    print!("{}", reply.display_text(&outcome));
                }
                println!();
                eprintln!(
                    "-- {outcome:?}: {} fragments, {} bytes, {} malformed payloads skipped",
                    stats.fragments_extracted, stats.bytes_read, stats.malformed_payloads
                );
            }
        }
    }

    Ok(())
}
