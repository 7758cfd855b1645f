//! Background texture decoding
//!
//! Decoding every JPEG of the catalog on the render thread would stall the
//! first frame, so the loader hands the whole list to one worker thread and
//! streams decoded images back over a `futures` channel. The render loop polls
//! between frames and uploads whatever has arrived; materials keep their
//! neutral default textures until then.

use std::path::Path;

use futures::channel::mpsc::{self, UnboundedReceiver};

use super::{AssetCatalog, TextureId};
use crate::error::AssetError;

/// RGBA8 pixels decoded from one catalog entry
#[derive(Debug, Clone)]
pub struct DecodedTexture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

enum LoadEvent {
    Loaded(DecodedTexture),
    Failed(AssetError),
}

/// Fire-and-forget loader for every texture in a catalog
pub struct TextureLoader {
    receiver: UnboundedReceiver<LoadEvent>,
    pending: usize,
    failed: usize,
}

impl TextureLoader {
    /// Starts decoding every texture of `catalog` on a worker thread
    pub fn spawn(catalog: &AssetCatalog) -> Self {
        let (sender, receiver) = mpsc::unbounded();
        let jobs: Vec<_> = catalog
            .iter()
            .map(|(id, asset)| (id, asset.path.clone()))
            .collect();
        let mut pending = jobs.len();

        let worker = std::thread::Builder::new()
            .name("texture-loader".to_string())
            .spawn(move || {
                for (id, path) in jobs {
                    let event = match decode_texture(&path) {
                        Ok((width, height, rgba)) => LoadEvent::Loaded(DecodedTexture {
                            id,
                            width,
                            height,
                            rgba,
                        }),
                        Err(error) => LoadEvent::Failed(error),
                    };
                    if sender.unbounded_send(event).is_err() {
                        break;
                    }
                }
            });

        if let Err(e) = worker {
            log::error!("Could not start texture loader thread: {}", e);
            pending = 0;
        }

        Self {
            receiver,
            pending,
            failed: 0,
        }
    }

    /// Drains every texture decoded since the last call
    ///
    /// Failures are logged and counted; they never surface as errors because a
    /// missing map only means the material renders without it.
    pub fn poll(&mut self) -> Vec<DecodedTexture> {
        let mut ready = Vec::new();

        while self.pending > 0 {
            match self.receiver.try_next() {
                Ok(Some(LoadEvent::Loaded(texture))) => {
                    self.pending -= 1;
                    ready.push(texture);
                }
                Ok(Some(LoadEvent::Failed(error))) => {
                    self.pending -= 1;
                    self.failed += 1;
                    log::warn!("{}", error);
                }
                // Worker exited early; nothing more will arrive
                Ok(None) => {
                    self.pending = 0;
                }
                Err(_) => break,
            }
        }

        ready
    }

    /// Number of textures still being decoded
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Number of textures that failed to load so far
    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn is_finished(&self) -> bool {
        self.pending == 0
    }
}

/// Decodes an image file into tightly packed RGBA8 pixels
pub fn decode_texture(path: &Path) -> Result<(u32, u32, Vec<u8>), AssetError> {
    let image = image::open(path)
        .map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok((width, height, image.into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn drain(loader: &mut TextureLoader) -> Vec<DecodedTexture> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut all = Vec::new();
        while !loader.is_finished() && Instant::now() < deadline {
            all.extend(loader.poll());
            std::thread::sleep(Duration::from_millis(5));
        }
        all
    }

    #[test]
    fn test_missing_files_are_absorbed() {
        let catalog = AssetCatalog::haunted_house("/nonexistent/haunted-house-assets");
        let mut loader = TextureLoader::spawn(&catalog);
        let loaded = drain(&mut loader);

        assert!(loaded.is_empty());
        assert!(loader.is_finished());
        assert_eq!(loader.failed(), catalog.len());
    }

    #[test]
    fn test_decodes_existing_image() {
        let dir = std::env::temp_dir().join(format!("haunted-house-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut pixels = image::RgbaImage::new(2, 3);
        pixels.put_pixel(1, 2, image::Rgba([10, 20, 30, 255]));
        pixels.save(dir.join("moss.png")).unwrap();

        let mut catalog = AssetCatalog::new(&dir);
        let moss = catalog.register("moss", "moss.png");
        catalog.register("missing", "missing.png");

        let mut loader = TextureLoader::spawn(&catalog);
        let loaded = drain(&mut loader);

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, moss);
        assert_eq!((loaded[0].width, loaded[0].height), (2, 3));
        assert_eq!(loaded[0].rgba.len(), 2 * 3 * 4);
        assert_eq!(&loaded[0].rgba[(2 * 2 + 1) * 4..(2 * 2 + 1) * 4 + 4], &[10, 20, 30, 255]);
        assert_eq!(loader.failed(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
