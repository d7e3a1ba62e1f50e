//! Application state and the actions that change it.
//!
//! `AppState::apply` is the only way state changes. It is synchronous and
//! side-effect free apart from the narrator flag, and reports which persisted
//! collection (if any) needs writing back.

use crate::capture::StillImage;
use crate::cooking::CookingSession;
use crate::library::{Persist, RecipeStore};
use crate::narration::Narrator;
use crate::recipe::{Illustration, Recipe};

/// Generic notice shown when recipe generation fails
pub const GENERATION_FAILED: &str = "Failed to generate recipe. Please try again.";

/// Generic notice shown when the camera cannot be used
pub const CAMERA_FAILED: &str = "Could not access the camera. Please check permissions.";

/// The three top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Generate,
    Library,
    Shopping,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Generate => "Create",
            View::Library => "Pantry",
            View::Shopping => "Shopping list",
        }
    }

    pub fn all() -> &'static [View] {
        &[View::Generate, View::Library, View::Shopping]
    }
}

/// A blocking message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

#[derive(Debug, Clone)]
pub enum Action {
    SetView(View),
    SetFilter(String),
    DismissNotice,

    GenerationStarted,
    GenerationSucceeded(Recipe),
    GenerationFailed,
    GenerationCancelled,

    IllustrationStarted,
    IllustrationSucceeded {
        recipe_id: String,
        illustration: Illustration,
    },
    IllustrationFailed,

    /// Show a saved recipe in the primary view
    SelectRecipe(String),
    SaveCurrent,
    AddManualRecipe(Recipe),
    RemoveRecipe(String),

    AddShoppingItem(String),
    RemoveShoppingItem(usize),

    CameraOpened,
    CameraFailed,
    StillCaptured(StillImage),
    DiscardStill,
    CameraClosed,

    StartCooking(Recipe),
    NextStep,
    PreviousStep,
    ExitCooking,
}

#[derive(Debug, Default)]
pub struct AppState {
    pub view: View,
    /// Recipe shown in the primary view; not necessarily saved
    pub current: Option<Recipe>,
    pub library: RecipeStore,
    /// Library search box
    pub filter: String,
    pub loading: bool,
    pub illustrating: bool,
    pub camera_open: bool,
    /// Still waiting to be sent with the next generation
    pub pending_image: Option<StillImage>,
    pub cooking: Option<CookingSession>,
    pub narrator: Narrator,
    pub notice: Option<Notice>,
}

impl AppState {
    pub fn new(library: RecipeStore) -> Self {
        Self {
            library,
            ..Default::default()
        }
    }

    pub fn speaking(&self) -> bool {
        self.narrator.is_speaking()
    }

    /// Whether the current recipe is already in the library
    pub fn current_is_saved(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|r| self.library.contains_title(&r.title))
    }

    /// Library entries matching the filter box
    pub fn visible_recipes(&self) -> Vec<&Recipe> {
        self.library.filter(&self.filter)
    }

    pub fn apply(&mut self, action: Action) -> Option<Persist> {
        match action {
            Action::SetView(view) => {
                self.view = view;
                None
            }
            Action::SetFilter(query) => {
                self.filter = query;
                None
            }
            Action::DismissNotice => {
                self.notice = None;
                None
            }

            Action::GenerationStarted => {
                self.loading = true;
                self.current = None;
                self.notice = None;
                None
            }
            Action::GenerationSucceeded(recipe) => {
                self.loading = false;
                self.current = Some(recipe);
                self.finish_capture();
                None
            }
            Action::GenerationFailed => {
                self.loading = false;
                self.current = None;
                self.notice = Some(Notice {
                    message: GENERATION_FAILED.to_string(),
                });
                self.finish_capture();
                None
            }
            Action::GenerationCancelled => {
                self.loading = false;
                None
            }

            Action::IllustrationStarted => {
                self.illustrating = true;
                None
            }
            Action::IllustrationSucceeded {
                recipe_id,
                illustration,
            } => {
                self.illustrating = false;
                if let Some(current) = self.current.as_mut().filter(|r| r.id == recipe_id) {
                    current.image = Some(illustration.to_data_url());
                }
                None
            }
            Action::IllustrationFailed => {
                self.illustrating = false;
                None
            }

            Action::SelectRecipe(id) => {
                if let Some(recipe) = self.library.get(&id) {
                    self.current = Some(recipe.clone());
                    self.view = View::Generate;
                }
                None
            }
            Action::SaveCurrent => {
                let recipe = self.current.clone()?;
                self.library.add_recipe(recipe)
            }
            Action::AddManualRecipe(recipe) => self.library.append_recipe(recipe),
            Action::RemoveRecipe(id) => self.library.remove_recipe(&id),

            Action::AddShoppingItem(text) => self.library.add_shopping_item(&text),
            Action::RemoveShoppingItem(index) => self.library.remove_shopping_item(index),

            Action::CameraOpened => {
                self.camera_open = true;
                self.pending_image = None;
                None
            }
            Action::CameraFailed => {
                self.camera_open = false;
                self.notice = Some(Notice {
                    message: CAMERA_FAILED.to_string(),
                });
                None
            }
            Action::StillCaptured(still) => {
                self.pending_image = Some(still);
                None
            }
            Action::DiscardStill => {
                self.pending_image = None;
                None
            }
            Action::CameraClosed => {
                self.camera_open = false;
                None
            }

            Action::StartCooking(recipe) => {
                self.narrator.reset();
                self.cooking = CookingSession::start(recipe);
                None
            }
            Action::NextStep => {
                if let Some(session) = self.cooking.as_mut() {
                    session.next();
                    self.narrator.reset();
                }
                None
            }
            Action::PreviousStep => {
                if let Some(session) = self.cooking.as_mut() {
                    session.previous();
                    self.narrator.reset();
                }
                None
            }
            Action::ExitCooking => {
                self.cooking = None;
                self.narrator.reset();
                None
            }
        }
    }

    /// Generation consumed the photo: drop it and close the capture surface
    fn finish_capture(&mut self) {
        self.pending_image = None;
        self.camera_open = false;
    }
}
