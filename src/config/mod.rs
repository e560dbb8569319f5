//! Gallery settings stored as TOML under the app directory.

use crate::app_dirs;

mod errors;
mod load;
mod overrides;
mod save;
mod types;


/// Default filename used to store the gallery settings.
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub use errors::ConfigError;
pub use load::{config_path, load_from_path, load_or_default};
pub use save::{save, save_to_path};
pub use types::{
    CanvasSettings, DEFAULT_API_URL, DbscanSettings, GallerySettings, KMeansSettings, KnnSettings,
    NetworkSettings, RegressionSettings, SomSettings, TreeSettings,
};

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}
