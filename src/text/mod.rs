//! 3D text from typeface JSON fonts.
//!
//! Fonts are loaded off the render thread: [`TextLoader::spawn`] parses the
//! font and builds the mesh on a worker thread, and the render loop picks the
//! result up with [`TextLoader::poll`] whenever it is ready. The scene keeps
//! animating while the text is still on its way.

pub mod font;
pub mod geometry;
pub mod triangulate;

pub use font::{Contour, Glyph, PathCommand, Typeface};
pub use geometry::{extrude_shape, text_mesh, Bevel, TextStyle};
pub use triangulate::{group_contours, triangulate, Shape};

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use tracing::{debug, warn};

use crate::error::FontError;
use crate::mesh::MeshData;

/// Load a font file and build the mesh for `text`.
pub fn load_text_mesh(path: &Path, text: &str, style: &TextStyle) -> Result<MeshData, FontError> {
    let font = Typeface::from_file(path)?;
    debug!("Loaded font {} ({} glyphs)", font.family_name, font.glyphs.len());
    text_mesh(&font, text, style)
}

/// Handle to a text mesh being built in the background.
pub struct TextLoader {
    receiver: Option<Receiver<Result<MeshData, FontError>>>,
}

impl TextLoader {
    pub fn spawn(path: PathBuf, text: String, style: TextStyle) -> Self {
        let (sender, receiver) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("text-loader".into())
            .spawn(move || {
                let result = load_text_mesh(&path, &text, &style);
                // receiver gone means the scene was torn down first
                let _ = sender.send(result);
            });

        match spawned {
            Ok(_) => Self {
                receiver: Some(receiver),
            },
            Err(e) => {
                warn!("Failed to start text loader thread: {}", e);
                Self { receiver: None }
            }
        }
    }

    /// The finished mesh, exactly once. Returns `None` while loading and
    /// after the result has been taken.
    pub fn poll(&mut self) -> Option<Result<MeshData, FontError>> {
        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(result) => {
                self.receiver = None;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!("Text loader exited without a result");
                self.receiver = None;
                None
            }
        }
    }

    /// Whether a result is still expected.
    pub fn is_pending(&self) -> bool {
        self.receiver.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait(loader: &mut TextLoader) -> Result<MeshData, FontError> {
        let start = Instant::now();
        loop {
            if let Some(result) = loader.poll() {
                return result;
            }
            assert!(start.elapsed() < Duration::from_secs(10), "loader timed out");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_loader_delivers_mesh_once() {
        let path = std::env::temp_dir().join(format!("driftfield-font-{}.json", std::process::id()));
        std::fs::write(&path, font::TEST_FONT).unwrap();

        let mut loader = TextLoader::spawn(path.clone(), "lo".into(), TextStyle::default());
        let mesh = wait(&mut loader).unwrap();
        assert!(mesh.triangle_count() > 0);
        assert!(!loader.is_pending());
        assert!(loader.poll().is_none());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_loader_reports_missing_font() {
        let mut loader = TextLoader::spawn(
            PathBuf::from("/definitely/not/a/font.json"),
            "hi".into(),
            TextStyle::default(),
        );
        assert!(matches!(wait(&mut loader), Err(FontError::Io(_))));
    }
}
