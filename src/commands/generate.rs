//! Generate static files

use anyhow::Result;
use notify::Watcher;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::content::loader::ContentLoader;
use crate::generator::Generator;
use crate::Blog;

/// Run the whole pipeline once
pub fn run(blog: &Blog) -> Result<()> {
    let start = Instant::now();

    let (documents, entries) = ContentLoader::new(blog).load_entries()?;
    tracing::info!(
        "Loaded {} documents, {} listed as blog entries",
        documents.len(),
        entries.len()
    );

    let generator = Generator::new(blog)?;
    let listings = generator.generate(&documents, &entries)?;

    let duration = start.elapsed();
    tracing::info!(
        "Generated {} listings in {:.2}s",
        listings.categories.len() + 1,
        duration.as_secs_f64()
    );

    Ok(())
}

/// Watch for file changes and regenerate
///
/// `_config.yml` is read again before every rebuild.
pub async fn watch(blog: &Blog) -> Result<()> {
    let (tx, rx) = channel();

    let mut watcher = notify::recommended_watcher(move |res| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    watcher.watch(&blog.source_dir, notify::RecursiveMode::Recursive)?;

    if blog.static_dir.exists() {
        watcher.watch(&blog.static_dir, notify::RecursiveMode::Recursive)?;
    }

    let config_path = blog.base_dir.join("_config.yml");
    if config_path.exists() {
        watcher.watch(&config_path, notify::RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    // Debounce events
    let mut last_rebuild = Instant::now();

    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(_event) => {
                if last_rebuild.elapsed() > Duration::from_millis(500) {
                    tracing::info!("File changed, regenerating...");
                    let result = Blog::new(&blog.base_dir).and_then(|blog| run(&blog));
                    if let Err(e) = result {
                        tracing::error!("Generation failed: {:#}", e);
                    }
                    last_rebuild = Instant::now();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    Ok(())
}
