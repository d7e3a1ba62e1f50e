//! View controller.
//!
//! `App` owns the application state, the backend, storage and devices. User
//! intents come in as method calls; every state change goes through
//! [`AppState::apply`] and the affected collection is written back to storage
//! right after.
//!
//! Methods take `&mut self`, so only one controller operation runs at a time.
//! Long operations accept a [`CancellationToken`]: once it fires the
//! operation returns [`Completion::Cancelled`]. A cancelled generation has
//! already cleared the shown recipe and any notice when it started; it only
//! drops the loading flag and discards the late result.

mod state;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use state::{Action, AppState, CAMERA_FAILED, GENERATION_FAILED, Notice, View};

use crate::audio::AudioSink;
use crate::capture::{CaptureError, CaptureSession, FrameSource};
use crate::library::RecipeStore;
use crate::narration::{NarrationResult, narrate};
use crate::provider::{GenerationError, GenerationRequest, RecipeBackend};
use crate::recipe::{Recipe, RecipeDraft};
use crate::storage::KeyValueStore;

/// How a cancellable operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Done,
    Cancelled,
}

/// Outcome of asking for the current step to be read aloud
#[derive(Debug)]
pub enum NarrationStart {
    /// Playback task spawned; await the handle to know when it ends
    Started(JoinHandle<NarrationResult>),
    /// Another narration is active
    Rejected,
    /// Not in cooking mode
    NotCooking,
}

pub struct App {
    state: AppState,
    backend: Arc<dyn RecipeBackend>,
    storage: Box<dyn KeyValueStore>,
    sink: Arc<dyn AudioSink>,
    camera: Option<CaptureSession>,
    cooking_cancel: Option<CancellationToken>,
    narration_export: Option<PathBuf>,
}

impl App {
    /// Build the controller, loading both collections from `storage`
    pub fn new(
        backend: Arc<dyn RecipeBackend>,
        storage: Box<dyn KeyValueStore>,
        sink: Arc<dyn AudioSink>,
    ) -> Self {
        let library = RecipeStore::load(storage.as_ref());
        crate::verbose!("Using {} backend", backend.name());
        Self {
            state: AppState::new(library),
            backend,
            storage,
            sink,
            camera: None,
            cooking_cancel: None,
            narration_export: None,
        }
    }

    /// Attach a camera (or image file) for ingredient photos
    pub fn with_camera(mut self, source: Box<dyn FrameSource>) -> Self {
        self.camera = Some(CaptureSession::new(source));
        self
    }

    /// Also write each narration to `<dir>/step-<n>.wav`
    pub fn with_narration_export(mut self, dir: impl Into<PathBuf>) -> Self {
        self.narration_export = Some(dir.into());
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply an action and persist whatever it changed.
    ///
    /// Storage errors are logged, not surfaced.
    pub fn dispatch(&mut self, action: Action) {
        if let Some(which) = self.state.apply(action) {
            if let Err(e) = self.state.library.persist(which, self.storage.as_ref()) {
                crate::verbose!("Failed to persist {which:?}: {e:#}");
            }
        }
    }

    // ── Generation ─────────────────────────────────────────────────────

    /// Generate a recipe from a craving plus the pending photo, if any.
    ///
    /// On failure the generic notice is set and the error returned for logs.
    pub async fn generate(
        &mut self,
        craving: &str,
        cancel: &CancellationToken,
    ) -> Result<Completion, GenerationError> {
        let request = match self.state.pending_image.clone() {
            Some(image) => GenerationRequest::with_image(craving, image),
            None => GenerationRequest::text(craving),
        };
        if request.is_empty() {
            return Err(GenerationError::EmptyRequest);
        }

        self.dispatch(Action::GenerationStarted);
        let backend = self.backend.clone();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.dispatch(Action::GenerationCancelled);
                return Ok(Completion::Cancelled);
            }
            result = backend.generate_recipe(&request) => result,
        };

        if let Some(camera) = self.camera.as_mut() {
            camera.close();
        }

        match result {
            Ok(recipe) => {
                crate::verbose!("Generated '{}' ({} steps)", recipe.title, recipe.step_count());
                self.dispatch(Action::GenerationSucceeded(recipe));
                Ok(Completion::Done)
            }
            Err(e) => {
                crate::verbose!("Recipe generation failed: {e}");
                self.dispatch(Action::GenerationFailed);
                Err(e)
            }
        }
    }

    /// Illustrate the current recipe. Failure leaves it without an image.
    ///
    /// Returns whether an image was attached.
    pub async fn illustrate_current(&mut self, cancel: &CancellationToken) -> bool {
        let Some((recipe_id, title)) = self
            .state
            .current
            .as_ref()
            .map(|r| (r.id.clone(), r.title.clone()))
        else {
            return false;
        };

        self.dispatch(Action::IllustrationStarted);
        let backend = self.backend.clone();

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.dispatch(Action::IllustrationFailed);
                return false;
            }
            result = backend.illustrate(&title) => result,
        };

        match result {
            Ok(illustration) => {
                self.dispatch(Action::IllustrationSucceeded {
                    recipe_id,
                    illustration,
                });
                self.state
                    .current
                    .as_ref()
                    .is_some_and(|r| r.image.is_some())
            }
            Err(e) => {
                crate::verbose!("Illustration failed: {e:#}");
                self.dispatch(Action::IllustrationFailed);
                false
            }
        }
    }

    // ── Library & shopping ─────────────────────────────────────────────

    pub fn save_current(&mut self) {
        self.dispatch(Action::SaveCurrent);
    }

    /// Add a hand-entered dish straight to the library
    pub fn add_manual(&mut self, draft: RecipeDraft) -> anyhow::Result<Recipe> {
        let recipe = draft.into_recipe()?;
        self.dispatch(Action::AddManualRecipe(recipe.clone()));
        Ok(recipe)
    }

    pub fn remove_recipe(&mut self, id: &str) {
        self.dispatch(Action::RemoveRecipe(id.to_string()));
    }

    pub fn add_shopping_item(&mut self, text: &str) {
        self.dispatch(Action::AddShoppingItem(text.to_string()));
    }

    pub fn remove_shopping_item(&mut self, index: usize) {
        self.dispatch(Action::RemoveShoppingItem(index));
    }

    // ── Camera ─────────────────────────────────────────────────────────

    /// Show the capture surface and start the camera stream
    pub fn open_camera(&mut self) -> Result<(), CaptureError> {
        let result = match self.camera.as_mut() {
            Some(camera) => camera.activate(),
            None => Err(CaptureError::Device("No camera configured".into())),
        };

        match result {
            Ok(()) => {
                self.dispatch(Action::CameraOpened);
                Ok(())
            }
            Err(e) => {
                crate::verbose!("Camera unavailable: {e}");
                self.dispatch(Action::CameraFailed);
                Err(e)
            }
        }
    }

    /// Take the still that will accompany the next generation
    pub fn capture_still(&mut self) -> Result<(), CaptureError> {
        let camera = self.camera.as_mut().ok_or(CaptureError::NotStreaming)?;
        let snapshot = camera.snapshot().map(|still| still.clone());
        match snapshot {
            Ok(still) => {
                self.dispatch(Action::StillCaptured(still));
                Ok(())
            }
            Err(CaptureError::NotStreaming) => Err(CaptureError::NotStreaming),
            Err(e) => {
                crate::verbose!("Snapshot failed: {e}");
                self.dispatch(Action::CameraFailed);
                Err(e)
            }
        }
    }

    /// Discard the still. The stream is not restarted; call `open_camera`.
    pub fn retake(&mut self) {
        if let Some(camera) = self.camera.as_mut() {
            camera.retake();
        }
        self.dispatch(Action::DiscardStill);
    }

    /// Close the capture surface. A still already taken is kept.
    pub fn close_camera(&mut self) {
        if let Some(camera) = self.camera.as_mut() {
            camera.close();
        }
        self.dispatch(Action::CameraClosed);
    }

    /// Drop the photo queued for the next generation
    pub fn clear_photo(&mut self) {
        self.dispatch(Action::DiscardStill);
    }

    // ── Cooking mode ───────────────────────────────────────────────────

    /// Enter cooking mode for a saved recipe, or the current one when `id` is None
    pub fn start_cooking(&mut self, id: Option<&str>) -> bool {
        let recipe = match id {
            Some(id) => self.state.library.find(id).cloned(),
            None => self.state.current.clone(),
        };
        let Some(recipe) = recipe else {
            return false;
        };

        self.exit_cooking();
        self.dispatch(Action::StartCooking(recipe));
        if self.state.cooking.is_some() {
            self.cooking_cancel = Some(CancellationToken::new());
            true
        } else {
            false
        }
    }

    pub fn next_step(&mut self) {
        self.dispatch(Action::NextStep);
    }

    pub fn previous_step(&mut self) {
        self.dispatch(Action::PreviousStep);
    }

    /// Leave cooking mode; pending narration requests are cancelled
    pub fn exit_cooking(&mut self) {
        if let Some(token) = self.cooking_cancel.take() {
            token.cancel();
        }
        if self.state.cooking.is_some() {
            self.dispatch(Action::ExitCooking);
        }
    }

    /// Read the current step aloud in the background
    pub fn narrate_step(&mut self) -> NarrationStart {
        let Some(session) = self.state.cooking.as_ref() else {
            return NarrationStart::NotCooking;
        };
        let Some(guard) = self.state.narrator.try_begin() else {
            crate::verbose!("Narration already active, ignoring request");
            return NarrationStart::Rejected;
        };

        let text = session.current_instruction().to_string();
        let export = self
            .narration_export
            .as_ref()
            .map(|dir| dir.join(format!("step-{}.wav", session.step() + 1)));
        let cancel = self
            .cooking_cancel
            .get_or_insert_with(CancellationToken::new)
            .child_token();
        let backend = self.backend.clone();
        let sink = self.sink.clone();

        NarrationStart::Started(tokio::spawn(async move {
            let _guard = guard;
            narrate(backend, sink, text, cancel, export).await
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullSink;
    use crate::capture::tests::FakeCamera;
    use crate::provider::gemini::parse_recipe_payload;
    use crate::recipe::Illustration;
    use crate::storage::{self, MemoryStore};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const RAMEN: &str = r#"{
        "title": "Spicy Ramen",
        "description": "Quick chili ramen.",
        "prepTime": "20 mins",
        "servings": "2",
        "nutrition": {"calories": "550 kcal", "protein": "20g", "carbs": "65g", "fat": "18g"},
        "ingredients": ["ramen noodles", "chili oil", "scallions"],
        "instructions": ["Boil water", "Cook noodles", "Add chili oil"]
    }"#;

    #[derive(Default)]
    struct FakeBackend {
        fail_generation: bool,
        fail_illustration: bool,
        fail_speech: bool,
        speech_delay: Option<Duration>,
        prompts: Mutex<Vec<(String, bool)>>,
        illustrations: AtomicUsize,
        speech_calls: AtomicUsize,
    }

    #[async_trait]
    impl RecipeBackend for FakeBackend {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn generate_recipe(
            &self,
            request: &GenerationRequest,
        ) -> Result<Recipe, GenerationError> {
            self.prompts
                .lock()
                .unwrap()
                .push((request.prompt(), request.image.is_some()));
            if self.fail_generation {
                return Err(GenerationError::MissingField("instructions"));
            }
            parse_recipe_payload(RAMEN)
        }

        async fn illustrate(&self, _title: &str) -> anyhow::Result<Illustration> {
            if self.fail_illustration {
                anyhow::bail!("quota exceeded");
            }
            let n = self.illustrations.fetch_add(1, Ordering::SeqCst);
            Ok(Illustration {
                mime_type: "image/png".into(),
                data: format!("iVBORw0K{n}"),
            })
        }

        async fn synthesize_speech(&self, _text: &str) -> anyhow::Result<Vec<u8>> {
            self.speech_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.speech_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_speech {
                anyhow::bail!("API error (500): voice unavailable");
            }
            Ok(vec![0x00, 0x40, 0x00, 0xC0])
        }
    }

    fn app_with(backend: FakeBackend) -> (App, MemoryStore, Arc<FakeBackend>) {
        let store = MemoryStore::new();
        let backend = Arc::new(backend);
        let app = App::new(backend.clone(), Box::new(store.clone()), Arc::new(NullSink));
        (app, store, backend)
    }

    #[tokio::test]
    async fn spicy_ramen_text_only() {
        let (mut app, _, backend) = app_with(FakeBackend::default());
        let before = crate::recipe::now_millis();

        let done = app
            .generate("spicy ramen", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(done, Completion::Done);

        let recipe = app.state().current.as_ref().unwrap();
        assert!(!recipe.ingredients.is_empty());
        assert!(!recipe.instructions.is_empty());
        assert!(!recipe.id.is_empty());
        assert!(recipe.created_at >= before);
        assert!(!app.state().loading);

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(
            prompts[0],
            ("Create a recipe for: spicy ramen".to_string(), false)
        );
    }

    #[tokio::test]
    async fn failed_generation_keeps_nothing() {
        let (mut app, _, _) = app_with(FakeBackend {
            fail_generation: true,
            ..Default::default()
        });

        assert!(app.generate("soup", &CancellationToken::new()).await.is_err());
        assert!(app.state().current.is_none());
        assert!(!app.state().loading);
        assert_eq!(
            app.state().notice.as_ref().unwrap().message,
            GENERATION_FAILED
        );
    }

    #[tokio::test]
    async fn cancelled_generation_clears_previous_recipe() {
        let (mut app, _, _) = app_with(FakeBackend::default());
        app.generate("ramen", &CancellationToken::new()).await.unwrap();
        assert!(app.state().current.is_some());

        let cancel = CancellationToken::new();
        cancel.cancel();
        let done = app.generate("pasta", &cancel).await.unwrap();
        assert_eq!(done, Completion::Cancelled);
        assert!(app.state().current.is_none());
        assert!(!app.state().loading);
        assert!(app.state().notice.is_none());
    }

    #[tokio::test]
    async fn photo_is_sent_then_cleared() {
        let (app, _, backend) = app_with(FakeBackend::default());
        let mut app = app.with_camera(Box::new(FakeCamera::default()));

        app.open_camera().unwrap();
        assert!(app.state().camera_open);
        app.capture_still().unwrap();
        assert!(app.state().pending_image.is_some());

        app.generate("", &CancellationToken::new()).await.unwrap();
        assert!(backend.prompts.lock().unwrap()[0].1);
        assert!(app.state().pending_image.is_none());
        assert!(!app.state().camera_open);
    }

    #[tokio::test]
    async fn empty_request_is_refused_without_state_change() {
        let (mut app, _, backend) = app_with(FakeBackend::default());
        assert!(matches!(
            app.generate("  ", &CancellationToken::new()).await,
            Err(GenerationError::EmptyRequest)
        ));
        assert!(backend.prompts.lock().unwrap().is_empty());
        assert!(app.state().notice.is_none());
    }

    #[test]
    fn camera_denied_sets_notice() {
        let (app, _, _) = app_with(FakeBackend::default());
        let mut app = app.with_camera(Box::new(FakeCamera {
            deny: true,
            ..Default::default()
        }));

        assert!(app.open_camera().is_err());
        assert!(!app.state().camera_open);
        assert_eq!(app.state().notice.as_ref().unwrap().message, CAMERA_FAILED);
    }

    #[tokio::test]
    async fn illustration_attaches_and_failure_is_silent() {
        let (mut app, _, _) = app_with(FakeBackend::default());
        let cancel = CancellationToken::new();
        app.generate("tacos", &cancel).await.unwrap();
        assert!(app.illustrate_current(&cancel).await);
        assert!(
            app.state()
                .current
                .as_ref()
                .unwrap()
                .image
                .as_deref()
                .unwrap()
                .starts_with("data:image/png;base64,")
        );

        let (mut app, _, _) = app_with(FakeBackend {
            fail_illustration: true,
            ..Default::default()
        });
        app.generate("tacos", &cancel).await.unwrap();
        assert!(!app.illustrate_current(&cancel).await);
        assert!(!app.state().illustrating);
        assert!(app.state().notice.is_none());
        assert!(app.state().current.as_ref().unwrap().image.is_none());
    }

    #[tokio::test]
    async fn illustrating_again_replaces_the_image() {
        let (mut app, _, _) = app_with(FakeBackend::default());
        let cancel = CancellationToken::new();
        app.generate("tacos", &cancel).await.unwrap();

        assert!(app.illustrate_current(&cancel).await);
        let first = app.state().current.as_ref().unwrap().image.clone().unwrap();
        assert!(app.illustrate_current(&cancel).await);
        let second = app.state().current.as_ref().unwrap().image.clone().unwrap();

        assert_ne!(first, second);
        assert_eq!(second, "data:image/png;base64,iVBORw0K1");
        assert!(!app.state().illustrating);
    }

    #[tokio::test]
    async fn save_and_remove_are_persisted() {
        let (mut app, store, _) = app_with(FakeBackend::default());
        app.generate("ramen", &CancellationToken::new()).await.unwrap();
        app.save_current();
        app.save_current();
        assert_eq!(storage::load_recipes(&store).len(), 1);

        let id = app.state().library.recipes()[0].id.clone();
        app.remove_recipe("not-an-id");
        assert_eq!(storage::load_recipes(&store).len(), 1);
        app.remove_recipe(&id);
        assert!(storage::load_recipes(&store).is_empty());
    }

    #[test]
    fn shopping_list_is_persisted() {
        let (mut app, store, _) = app_with(FakeBackend::default());
        app.add_shopping_item("Milk");
        app.add_shopping_item("Eggs");
        app.remove_shopping_item(0);
        assert_eq!(storage::load_shopping_list(&store), vec!["Eggs"]);

        // a fresh controller on the same storage sees the same data
        let reloaded = App::new(
            Arc::new(FakeBackend::default()),
            Box::new(store.clone()),
            Arc::new(NullSink),
        );
        assert_eq!(reloaded.state().library.shopping_items(), ["Eggs".to_string()]);
    }

    #[tokio::test]
    async fn narration_is_exclusive_until_step_change() {
        let (mut app, _, backend) = app_with(FakeBackend {
            speech_delay: Some(Duration::from_millis(200)),
            ..Default::default()
        });
        app.generate("ramen", &CancellationToken::new()).await.unwrap();
        assert!(app.start_cooking(None));

        let NarrationStart::Started(first) = app.narrate_step() else {
            panic!("first narration should start");
        };
        assert!(app.state().speaking());
        assert!(matches!(app.narrate_step(), NarrationStart::Rejected));

        // step change frees the flag without stopping the first narration
        app.next_step();
        assert!(!app.state().speaking());
        let NarrationStart::Started(second) = app.narrate_step() else {
            panic!("narration after step change should start");
        };

        assert!(matches!(first.await.unwrap(), NarrationResult::Played { .. }));
        assert!(matches!(second.await.unwrap(), NarrationResult::Played { .. }));
        assert_eq!(backend.speech_calls.load(Ordering::SeqCst), 2);
        assert!(!app.state().speaking());
    }

    #[tokio::test]
    async fn failed_narration_clears_speaking_without_notice() {
        let (mut app, _, backend) = app_with(FakeBackend {
            fail_speech: true,
            ..Default::default()
        });
        app.generate("ramen", &CancellationToken::new()).await.unwrap();
        assert!(app.start_cooking(None));

        let NarrationStart::Started(handle) = app.narrate_step() else {
            panic!("narration should start");
        };
        assert!(matches!(handle.await.unwrap(), NarrationResult::Failed(_)));
        assert!(!app.state().speaking());
        assert!(app.state().notice.is_none());

        // the same step can be requested again
        let NarrationStart::Started(retry) = app.narrate_step() else {
            panic!("narration should start again after a failure");
        };
        assert!(matches!(retry.await.unwrap(), NarrationResult::Failed(_)));
        assert_eq!(backend.speech_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exiting_cooking_cancels_pending_narration() {
        let (mut app, _, _) = app_with(FakeBackend {
            speech_delay: Some(Duration::from_secs(5)),
            ..Default::default()
        });
        app.generate("ramen", &CancellationToken::new()).await.unwrap();
        app.start_cooking(None);

        let NarrationStart::Started(handle) = app.narrate_step() else {
            panic!("narration should start");
        };
        app.exit_cooking();

        assert_eq!(handle.await.unwrap(), NarrationResult::Cancelled);
        assert!(app.state().cooking.is_none());
        assert!(matches!(app.narrate_step(), NarrationStart::NotCooking));
    }

    #[tokio::test]
    async fn cooking_a_saved_recipe_by_prefix() {
        let (mut app, _, _) = app_with(FakeBackend::default());
        let recipe = app
            .add_manual(RecipeDraft {
                title: "Toast".into(),
                ..Default::default()
            })
            .unwrap();

        assert!(app.start_cooking(Some(&recipe.id[..6])));
        let session = app.state().cooking.as_ref().unwrap();
        assert_eq!(session.step_count(), 1);
        assert!(!app.start_cooking(Some("zzzz")));
    }
}
