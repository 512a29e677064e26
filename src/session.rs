//! Session state and the transitions driven by user actions.

use crate::client::Enhancer;
use crate::error::{EnhanceError, Result};
use crate::image::EncodedImage;
use crate::operation::Operation;
use std::path::{Path, PathBuf};

/// File name used when saving a result without an explicit path.
pub const DEFAULT_OUTPUT_NAME: &str = "enhanced-image.png";

/// Whether a remote call is currently outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionStatus {
    /// No call in flight; the session accepts new operations.
    #[default]
    Idle,
    /// A remote call is outstanding; new operations are ignored.
    Processing,
}

/// One editing session: the loaded image, the result of the last
/// operation, and the in-flight guard.
///
/// At steady state `processed` and `error` are never both set; a new
/// operation clears both before its call starts. At most one remote call
/// is in flight at a time, guarded by [`SessionStatus`].
pub struct Session<E> {
    client: E,
    original: Option<EncodedImage>,
    processed: Option<EncodedImage>,
    status: SessionStatus,
    error: Option<String>,
    active: Option<Operation>,
}

impl<E: Enhancer> Session<E> {
    /// Creates an empty session backed by `client`.
    pub fn new(client: E) -> Self {
        Self {
            client,
            original: None,
            processed: None,
            status: SessionStatus::Idle,
            error: None,
            active: None,
        }
    }

    /// Loads a new image, replacing the whole session.
    ///
    /// A file that cannot be read, or whose extension falls outside the
    /// supported formats, becomes the session error; the rest of the state
    /// is left as it was.
    pub fn load_image(&mut self, path: impl AsRef<Path>) {
        match EncodedImage::from_file(path) {
            Ok(image) => {
                self.reset();
                self.original = Some(image);
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Runs `op` against the loaded image.
    ///
    /// Does nothing when no image is loaded or another call is still
    /// outstanding. Otherwise the previous result and error are cleared,
    /// exactly one remote call is made, and its outcome lands in either
    /// the processed image or the session error. The session returns to
    /// idle when the call settles, whatever the outcome.
    pub async fn run_operation(&mut self, op: Operation) {
        if self.status == SessionStatus::Processing {
            return;
        }
        let Some(image) = self.original.as_ref() else {
            return;
        };

        self.processed = None;
        self.error = None;
        self.active = Some(op);
        self.status = SessionStatus::Processing;

        let outcome = self.client.enhance(image, op.instruction()).await;

        self.status = SessionStatus::Idle;
        match outcome {
            Ok(result) => self.processed = Some(result),
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Clears every field unconditionally, returning the session to its
    /// initial state.
    pub fn reset(&mut self) {
        self.original = None;
        self.processed = None;
        self.status = SessionStatus::Idle;
        self.error = None;
        self.active = None;
    }

    /// Writes the processed image to `path`, or to [`DEFAULT_OUTPUT_NAME`]
    /// in the current directory when no path is given.
    pub fn save_processed(&self, path: Option<&Path>) -> Result<PathBuf> {
        let image = self
            .processed
            .as_ref()
            .ok_or_else(|| EnhanceError::InvalidInput("no processed image to save".into()))?;
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_NAME));
        image.save(&path)?;
        Ok(path)
    }

    /// Returns the loaded image, if any.
    pub fn original(&self) -> Option<&EncodedImage> {
        self.original.as_ref()
    }

    /// Returns the result of the last successful operation, if any.
    pub fn processed(&self) -> Option<&EncodedImage> {
        self.processed.as_ref()
    }

    /// Returns the current session error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the operation the user last selected, if any.
    pub fn active_operation(&self) -> Option<Operation> {
        self.active
    }

    /// Returns true while a remote call is outstanding.
    pub fn is_processing(&self) -> bool {
        self.status == SessionStatus::Processing
    }

    /// Returns the backing client.
    pub fn client(&self) -> &E {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageFormat;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::io::Write;
    use std::sync::Mutex;

    /// A genuine 10x10 red PNG.
    const RED_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAoAAAAKCAIAAAACUFjqAAAAEklEQVR4nGP4z8CAB+GTG8HSALfKY52fTcuYAAAAAElFTkSuQmCC";

    type MockReply = std::result::Result<EncodedImage, String>;

    /// Scripted backend: records every instruction it receives and replays
    /// queued outcomes.
    struct MockEnhancer {
        calls: Mutex<Vec<String>>,
        replies: Mutex<VecDeque<MockReply>>,
    }

    impl MockEnhancer {
        fn with_replies(replies: Vec<MockReply>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                replies: Mutex::new(replies.into()),
            }
        }

        fn returning(image: EncodedImage) -> Self {
            Self::with_replies(vec![Ok(image)])
        }

        fn failing(message: &str) -> Self {
            Self::with_replies(vec![Err(message.to_string())])
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn last_instruction(&self) -> Option<String> {
            self.calls.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl Enhancer for MockEnhancer {
        async fn enhance(
            &self,
            _image: &EncodedImage,
            instruction: &str,
        ) -> crate::error::Result<EncodedImage> {
            self.calls.lock().unwrap().push(instruction.to_string());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected enhance call");
            reply.map_err(|message| EnhanceError::Api {
                status: 429,
                message,
            })
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn red_png_bytes() -> Vec<u8> {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(RED_PNG_BASE64)
            .unwrap()
    }

    fn write_temp_image(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&red_png_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_then_run_sends_fixed_instruction() {
        let dir = tempfile::tempdir().unwrap();

        for name in ["a.png", "b.jpg", "c.webp"] {
            let path = write_temp_image(&dir, name);
            let mock = MockEnhancer::returning(EncodedImage::new(vec![1], ImageFormat::Png));
            let mut session = Session::new(mock);

            session.load_image(&path);
            assert!(session.error().is_none());
            session.run_operation(Operation::RemoveWatermark).await;

            assert_eq!(session.client().call_count(), 1);
            assert_eq!(
                session.client().last_instruction().as_deref(),
                Some(Operation::RemoveWatermark.instruction())
            );
        }
    }

    #[tokio::test]
    async fn test_run_without_image_is_noop() {
        let mock = MockEnhancer::with_replies(vec![]);
        let mut session = Session::new(mock);

        session.run_operation(Operation::Upscale).await;

        assert_eq!(session.client().call_count(), 0);
        assert!(session.error().is_none());
        assert!(session.active_operation().is_none());
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn test_run_while_processing_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_image(&dir, "in.png");

        let mock = MockEnhancer::with_replies(vec![]);
        let mut session = Session::new(mock);
        session.load_image(&path);

        session.status = SessionStatus::Processing;
        session.run_operation(Operation::EnhanceQuality).await;

        assert_eq!(session.client().call_count(), 0);
        assert!(session.is_processing());
        assert!(session.error().is_none());
        assert!(session.active_operation().is_none());
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_image(&dir, "in.png");

        let mock = MockEnhancer::returning(EncodedImage::new(vec![7], ImageFormat::Png));
        let mut session = Session::new(mock);
        session.load_image(&path);
        session.run_operation(Operation::Upscale).await;
        assert!(session.processed().is_some());

        session.reset();

        assert!(session.original().is_none());
        assert!(session.processed().is_none());
        assert!(session.error().is_none());
        assert!(session.active_operation().is_none());
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn test_enhance_quality_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_image(&dir, "red.png");

        let payload = red_png_bytes();
        let mock = MockEnhancer::returning(EncodedImage::new(payload, ImageFormat::Png));
        let mut session = Session::new(mock);

        session.load_image(&path);
        session.run_operation(Operation::EnhanceQuality).await;

        assert!(!session.is_processing());
        assert!(session.error().is_none());
        assert_eq!(session.active_operation(), Some(Operation::EnhanceQuality));
        assert_eq!(
            session.processed().unwrap().to_data_url(),
            format!("data:image/png;base64,{RED_PNG_BASE64}")
        );
    }

    #[tokio::test]
    async fn test_failed_call_sets_error_and_clears_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_image(&dir, "in.png");

        let mock = MockEnhancer::failing("quota exceeded");
        let mut session = Session::new(mock);
        session.load_image(&path);
        session.run_operation(Operation::EnhanceQuality).await;

        assert!(session.processed().is_none());
        assert!(session.error().unwrap().contains("quota exceeded"));
        assert!(!session.is_processing());
    }

    #[tokio::test]
    async fn test_new_run_supersedes_previous_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp_image(&dir, "in.png");

        let mock = MockEnhancer::with_replies(vec![
            Ok(EncodedImage::new(vec![1], ImageFormat::Png)),
            Err("service unavailable".to_string()),
        ]);
        let mut session = Session::new(mock);
        session.load_image(&path);

        session.run_operation(Operation::EnhanceQuality).await;
        assert!(session.processed().is_some());
        assert!(session.error().is_none());

        session.run_operation(Operation::Upscale).await;
        assert!(session.processed().is_none());
        assert!(session.error().unwrap().contains("service unavailable"));
        assert_eq!(session.active_operation(), Some(Operation::Upscale));
    }

    #[tokio::test]
    async fn test_load_unreadable_file_sets_error() {
        let mock = MockEnhancer::with_replies(vec![]);
        let mut session = Session::new(mock);

        session.load_image("does-not-exist.png");

        assert!(session.original().is_none());
        assert!(session.error().is_some());
    }

    #[tokio::test]
    async fn test_load_unsupported_type_sets_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let mock = MockEnhancer::with_replies(vec![]);
        let mut session = Session::new(mock);
        session.load_image(&path);

        assert!(session.original().is_none());
        assert!(session.error().unwrap().contains("unsupported file type"));
    }

    #[tokio::test]
    async fn test_load_replaces_previous_session() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_temp_image(&dir, "first.png");
        let second = write_temp_image(&dir, "second.png");

        let mock = MockEnhancer::returning(EncodedImage::new(vec![5], ImageFormat::Png));
        let mut session = Session::new(mock);

        session.load_image(&first);
        session.run_operation(Operation::Upscale).await;
        assert!(session.processed().is_some());

        session.load_image(&second);

        assert!(session.original().is_some());
        assert!(session.processed().is_none());
        assert!(session.error().is_none());
        assert!(session.active_operation().is_none());
    }

    #[tokio::test]
    async fn test_save_processed_to_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_temp_image(&dir, "in.png");
        let output = dir.path().join("result.png");

        let mock = MockEnhancer::returning(EncodedImage::new(vec![1, 2], ImageFormat::Png));
        let mut session = Session::new(mock);
        session.load_image(&input);
        session.run_operation(Operation::EnhanceQuality).await;

        let saved = session.save_processed(Some(&output)).unwrap();
        assert_eq!(saved, output);
        assert_eq!(std::fs::read(&output).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_save_without_result_errors() {
        let mock = MockEnhancer::with_replies(vec![]);
        let session = Session::new(mock);

        let result = session.save_processed(None);
        assert!(matches!(result, Err(EnhanceError::InvalidInput(_))));
    }

    #[test]
    fn test_default_output_name() {
        assert_eq!(DEFAULT_OUTPUT_NAME, "enhanced-image.png");
    }
}
