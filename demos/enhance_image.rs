//! End-to-end demo - removes a watermark from an image.
//!
//! Run with: `cargo run --example enhance_image -- <input_image.png>`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use nitid::{GeminiClient, Operation, Session};

#[tokio::main]
async fn main() -> nitid::Result<()> {
    let input_path = std::env::args()
        .nth(1)
        .expect("Usage: enhance_image <input_image.png>");

    let mut session = Session::new(GeminiClient::builder().build());

    session.load_image(&input_path);
    session.run_operation(Operation::RemoveWatermark).await;

    if let Some(err) = session.error() {
        eprintln!("enhancement failed: {err}");
        std::process::exit(1);
    }

    let saved = session.save_processed(None)?;
    let size = session.processed().map(|image| image.size()).unwrap_or(0);
    println!("Saved {} ({} bytes)", saved.display(), size);

    Ok(())
}
