//! Texture loading.
//!
//! Images are decoded off the main thread and handed back as RGBA pixels.
//! Uploading to the GPU happens on the main thread, before the scene exists.
//!
//! # Invariants
//! - A load either yields every configured texture or an error; never a partial set.
//! - Loaded textures are identified by a content hash of their pixels.

use cubescape_common::TextureConfig;
use cubescape_render::{GpuContext, TextureHandle, TextureImage};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Content-addressed id of decoded texture pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u64);

impl AssetId {
    /// SHA-256 of the dimensions and pixels, truncated to 64 bits.
    pub fn of_image(image: &TextureImage) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(image.width.to_le_bytes());
        hasher.update(image.height.to_le_bytes());
        hasher.update(&image.rgba);
        let result = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&result[..8]);
        AssetId(u64::from_le_bytes(bytes))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode texture `{name}`: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error("texture `{0}` has no pixels")]
    Empty(String),
    #[error("texture loader stopped before finishing")]
    Disconnected,
}

/// A decoded texture ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTexture {
    pub name: String,
    pub id: AssetId,
    pub image: TextureImage,
}

/// Decodes single textures from disk or memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextureLoader;

impl TextureLoader {
    /// Read and decode the file a texture source points at.
    pub fn load(&self, source: &TextureConfig) -> Result<LoadedTexture, AssetError> {
        let bytes = std::fs::read(&source.path).map_err(|e| AssetError::Io {
            path: source.path.clone(),
            source: e,
        })?;
        self.decode(&source.name, &bytes, source.flip_y)
    }

    /// Decode encoded image bytes (PNG or JPEG) into RGBA8.
    pub fn decode(
        &self,
        name: &str,
        bytes: &[u8],
        flip_y: bool,
    ) -> Result<LoadedTexture, AssetError> {
        let decoded = image::load_from_memory(bytes).map_err(|e| AssetError::Decode {
            name: name.to_string(),
            source: e,
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut image = TextureImage::new(width, height, rgba.into_raw())
            .ok_or_else(|| AssetError::Empty(name.to_string()))?;
        if flip_y {
            image.flip_rows();
        }

        let id = AssetId::of_image(&image);
        tracing::debug!(texture = name, width, height, id = id.0, "texture decoded");
        Ok(LoadedTexture {
            name: name.to_string(),
            id,
            image,
        })
    }
}

/// Every texture a scene needs, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resources {
    pub textures: BTreeMap<String, LoadedTexture>,
}

impl Resources {
    /// Create a GPU texture for each loaded texture.
    pub fn upload(&self, gpu: &mut dyn GpuContext) -> BTreeMap<String, TextureHandle> {
        self.textures
            .iter()
            .map(|(name, texture)| {
                let handle = gpu.create_texture(&texture.image);
                tracing::info!(texture = %name, handle = handle.0, "texture uploaded");
                (name.clone(), handle)
            })
            .collect()
    }
}

/// Loads a configured set of texture sources.
#[derive(Debug, Clone, Default)]
pub struct ResourceLoader {
    sources: Vec<TextureConfig>,
    loader: TextureLoader,
}

impl ResourceLoader {
    /// Loader for `sources`, in the given order.
    pub fn new(sources: Vec<TextureConfig>) -> Self {
        Self {
            sources,
            loader: TextureLoader,
        }
    }

    pub fn sources(&self) -> &[TextureConfig] {
        &self.sources
    }

    /// Load every source on the calling thread. Stops at the first failure.
    pub fn load_all(&self) -> Result<Resources, AssetError> {
        let textures = self
            .sources
            .iter()
            .map(|source| {
                self.loader
                    .load(source)
                    .map(|texture| (source.name.clone(), texture))
            })
            .collect::<Result<_, _>>()?;
        Ok(Resources { textures })
    }

    /// Load every source on a worker thread.
    pub fn spawn(self) -> PendingResources {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = self.load_all();
            if let Err(e) = &result {
                tracing::error!("texture load failed: {e}");
            }
            // The receiver may be gone if the host shut down mid-load.
            let _ = tx.send(result);
        });
        PendingResources { rx, done: false }
    }
}

/// A load running in the background.
#[derive(Debug)]
pub struct PendingResources {
    rx: Receiver<Result<Resources, AssetError>>,
    done: bool,
}

impl PendingResources {
    /// The load result once it is ready. Yields a value at most once.
    pub fn try_take(&mut self) -> Option<Result<Resources, AssetError>> {
        if self.done {
            return None;
        }
        let result = match self.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(AssetError::Disconnected),
        };
        self.done = true;
        Some(result)
    }

    /// Block until the load finishes.
    pub fn wait(self) -> Result<Resources, AssetError> {
        self.rx.recv().map_err(|_| AssetError::Disconnected)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubescape_render::HeadlessContext;
    use std::path::Path;

    fn write_png(dir: &Path, name: &str) -> TextureConfig {
        let path = dir.join(format!("{name}.png"));
        let mut img = image::RgbaImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        img.save(&path).unwrap();
        TextureConfig {
            name: name.into(),
            path,
            flip_y: false,
        }
    }

    #[test]
    fn loads_png_as_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_png(dir.path(), "wood");
        let texture = TextureLoader.load(&source).unwrap();
        assert_eq!((texture.image.width, texture.image.height), (2, 2));
        assert_eq!(&texture.image.rgba[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn flip_y_moves_last_row_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = write_png(dir.path(), "wood");
        source.flip_y = true;
        let texture = TextureLoader.load(&source).unwrap();
        assert_eq!(&texture.image.rgba[..4], &[0, 0, 255, 255]);
    }

    #[test]
    fn ids_are_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let a = TextureLoader.load(&write_png(dir.path(), "a")).unwrap();
        let b = TextureLoader.load(&write_png(dir.path(), "b")).unwrap();
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, AssetId::of_image(&TextureImage::white()));
    }

    #[test]
    fn missing_file_is_io_error() {
        let source = TextureConfig {
            path: "/no/such/texture.png".into(),
            ..TextureConfig::default()
        };
        assert!(matches!(TextureLoader.load(&source), Err(AssetError::Io { .. })));
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = TextureLoader.decode("junk", b"not an image", false).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn background_load_delivers_once() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ResourceLoader::new(vec![
            write_png(dir.path(), "one"),
            write_png(dir.path(), "two"),
        ]);
        let mut pending = loader.spawn();
        let resources = loop {
            if let Some(result) = pending.try_take() {
                break result.unwrap();
            }
            std::thread::yield_now();
        };
        assert_eq!(resources.textures.len(), 2);
        assert!(pending.try_take().is_none());

        let mut gpu = HeadlessContext::new(1, 1);
        let handles = resources.upload(&mut gpu);
        assert!(gpu.is_texture(handles["one"]));
    }

    #[test]
    fn one_failure_fails_the_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ResourceLoader::new(vec![
            write_png(dir.path(), "good"),
            TextureConfig {
                name: "bad".into(),
                path: dir.path().join("missing.png"),
                flip_y: true,
            },
        ]);
        assert!(loader.spawn().wait().is_err());
    }
}
