use std::path::PathBuf;

use serde::{
    Serialize,
    Deserialize,
};
use figment::{
    Figment,
    providers::{
        Env,
        Format,
        Serialized,
        Toml,
    },
};
use directories::ProjectDirs;
use log::debug;

use crate::types::Result;


/// Site-wide defaults, overridable by `~/.config/mdkit/mdkit.toml` and then by
/// `MDKIT_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Executable used by `mdkit acpype`. Needs to be on PATH or an absolute path.
    pub acpype_path: PathBuf,

    /// MD integration time step in picoseconds, used when converting a
    /// duration in ns to an nsteps count.
    pub time_step: f64,
}


impl Default for Settings {
    fn default() -> Self {
        Self {
            acpype_path: PathBuf::from("acpype"),
            time_step: 0.002,
        }
    }
}


impl Settings {
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "mdkit")
            .map(|d| d.config_dir().join("mdkit.toml"))
    }

    pub fn from_default_location() -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        if let Some(path) = Self::config_file_path() {
            if path.is_file() {
                debug!("Merging configuration from {:?}", &path);
                figment = figment.merge(Toml::file(path));
            }
        }

        let settings = figment
            .merge(Env::prefixed("MDKIT_"))
            .extract::<Settings>()?;
        Ok(settings)
    }
}
