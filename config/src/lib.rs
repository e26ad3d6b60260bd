pub mod credentials;
pub mod paths;
pub mod settings;

pub use credentials::Credentials;
pub use paths::PathManager;
pub use settings::{ServerSettings, Settings};

/// Load environment variables from ./.env and ~/.env.
/// Values already in the process environment win, then the project file, then the home file.
/// Call this before parsing CLI args so `env` fallbacks see the values.
pub fn load_env_file() {
    // dotenv never overwrites a set variable, so the project file goes first.
    dotenv::dotenv().ok();

    if let Some(home) = dirs::home_dir() {
        dotenv::from_path(home.join(".env")).ok();
    }
}
