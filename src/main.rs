use clap::{Parser, Subcommand};
use rayon::prelude::*;
use photoroll::config::{self, GalleryConfig};
use photoroll::gallery::Gallery;
use photoroll::imaging::CancelToken;
use photoroll::index::FsMediaSource;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "photoroll")]
#[command(about = "Photo gallery engine over a directory of images")]
#[command(long_about = "\
Photo gallery engine over a directory of images

The directory is the media index: supported images anywhere under it are
listed newest-first, rotated per their EXIF orientation, and rendered as
fixed-size thumbnails.

Configuration is read from photoroll.toml in the source directory when
present; every option has a stock default.")]
#[command(version)]
struct Cli {
    /// Directory of photos
    source: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the photo index, newest first
    Index {
        /// Emit the index as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Decode thumbnails for every indexed photo
    Thumbs {
        /// Directory for the generated thumbnails
        #[arg(long)]
        out: PathBuf,
    },
}

/// Configure rayon before any parallel work runs.
fn init_thread_pool(config: &GalleryConfig) {
    let workers = config::effective_workers(&config.decoding);
    // build_global fails only if a pool already exists, which is fine
    let _ = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let config = config::load_config(&cli.source)?;
    init_thread_pool(&config);

    let source = Arc::new(FsMediaSource::new(&cli.source));
    let gallery = Arc::new(Gallery::new(config, source, None));
    gallery.set_permission(true);
    gallery.load_blocking();

    let snapshot = gallery.state().snapshot();

    match cli.command {
        Command::Index { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&*snapshot.photos)?);
            } else {
                println!("{} photos", snapshot.photos.len());
                for photo in snapshot.photos.iter() {
                    println!(
                        "  {}  {}x{}  {}°",
                        photo.id,
                        photo.width,
                        photo.height,
                        photo.orientation.degrees()
                    );
                }
            }
        }
        Command::Thumbs { out } => {
            std::fs::create_dir_all(&out)?;

            // Decode on the rayon pool; write sequentially afterwards so
            // I/O errors surface through the normal return path.
            let decoded: Vec<_> = snapshot
                .photos
                .par_iter()
                .map(|photo| (photo, gallery.thumbnail(photo, &CancelToken::new())))
                .collect();

            let mut written = 0usize;
            let mut failed = 0usize;
            for (photo, thumb) in decoded {
                match thumb {
                    Some(thumb) => {
                        let name = photo.id.replace(['/', '\\'], "_");
                        thumb.save(out.join(format!("{}.png", name)))?;
                        written += 1;
                    }
                    None => {
                        eprintln!("skipped {}: not decodable", photo.id);
                        failed += 1;
                    }
                }
            }
            println!("{} thumbnails written, {} skipped", written, failed);
        }
    }

    Ok(())
}
