use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "larder")]
#[command(version)]
#[command(about = "Recipe assistant: generate, illustrate, save and cook recipes")]
#[command(
    long_about = "Describe a craving or show your ingredients, get a structured recipe, keep it in your pantry and cook it step by step with spoken instructions.\n\nRun without a command for the interactive menu."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print request and device diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a recipe from a craving and/or a photo of ingredients
    Generate(GenerateArgs),

    /// Saved recipes
    Library {
        #[command(subcommand)]
        action: LibraryCommand,
    },

    /// Shopping list
    Shop {
        #[command(subcommand)]
        action: ShopCommand,
    },

    /// Cook a saved recipe step by step
    Cook(CookArgs),

    /// Configure the API key
    Setup,

    /// Show or change settings
    Config(ConfigArgs),

    /// List audio output devices for narration
    Devices,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// What you feel like eating
    pub craving: Vec<String>,

    /// Photo of ingredients to send along
    #[arg(long, conflicts_with = "camera")]
    pub image: Option<PathBuf>,

    /// Take the photo with the camera
    #[arg(long)]
    pub camera: bool,

    /// Also render a picture of the dish
    #[arg(long)]
    pub illustrate: bool,

    /// Save the result to the library
    #[arg(long)]
    pub save: bool,

    /// Write the illustration to this file (implies --illustrate)
    #[arg(long, value_name = "FILE")]
    pub image_out: Option<PathBuf>,

    /// Print the recipe as JSON
    #[arg(long)]
    pub json: bool,
}

impl GenerateArgs {
    pub fn craving(&self) -> String {
        self.craving.join(" ")
    }
}

#[derive(Subcommand)]
pub enum LibraryCommand {
    /// List saved recipes
    List {
        /// Only titles containing this text (case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Show one recipe
    Show {
        /// Recipe id or unique id prefix
        id: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,

        /// Write the illustration to this file
        #[arg(long, value_name = "FILE")]
        image_out: Option<PathBuf>,
    },

    /// Add a dish by hand (prompts for anything not given)
    Add {
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Ingredient (repeatable)
        #[arg(long = "ingredient", value_name = "TEXT")]
        ingredients: Vec<String>,

        /// Instruction step (repeatable)
        #[arg(long = "step", value_name = "TEXT")]
        steps: Vec<String>,

        #[arg(long)]
        prep_time: Option<String>,

        #[arg(long)]
        servings: Option<String>,
    },

    /// Delete a saved recipe
    Remove {
        /// Recipe id or unique id prefix
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ShopCommand {
    /// Show the shopping list and saved recipes' ingredients
    List,

    /// Add an item
    Add {
        item: Vec<String>,
    },

    /// Remove an item by its number in `shop list`
    Remove {
        number: usize,
    },

    /// Copy the list to the clipboard
    #[cfg(feature = "clipboard")]
    Copy {
        /// Include saved recipes' ingredients
        #[arg(long)]
        with_recipes: bool,
    },
}

#[derive(Args)]
pub struct CookArgs {
    /// Recipe id or unique id prefix
    pub id: String,

    /// Don't play narration
    #[arg(long)]
    pub mute: bool,

    /// Audio output device (see `larder devices`)
    #[arg(long)]
    pub device: Option<String>,

    /// Also write each narrated step as WAV into this directory
    #[cfg(feature = "wav-export")]
    #[arg(long, value_name = "DIR")]
    pub save_audio: Option<PathBuf>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Gemini API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model override as SERVICE=MODEL (generation, illustration, narration)
    #[arg(long, value_name = "SERVICE=MODEL")]
    pub model: Vec<String>,

    /// Narration voice
    #[arg(long)]
    pub voice: Option<String>,

    /// Camera device
    #[arg(long)]
    pub camera_device: Option<String>,

    /// Directory for saved recipes and the shopping list
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Per-request timeout in seconds (0 clears it)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// API base URL
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Print current settings
    #[arg(long)]
    pub show: bool,
}

impl ConfigArgs {
    pub fn is_empty(&self) -> bool {
        self.api_key.is_none()
            && self.model.is_empty()
            && self.voice.is_none()
            && self.camera_device.is_none()
            && self.data_dir.is_none()
            && self.timeout.is_none()
            && self.api_base_url.is_none()
    }
}
