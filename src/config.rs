use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;

#[derive(Parser, Clone, Debug)]
#[clap(name = "car-rental", about = "Browse, book and manage rental cars from the terminal")]
pub struct Config {
    /// Origin of the rental backend
    #[clap(env, long, default_value = "http://localhost:8080")]
    pub api_base_url: String,

    /// Where the logged-in identity is kept between runs
    #[clap(env, long)]
    pub session_dir: Option<PathBuf>,
}

impl Config {
    pub fn session_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.session_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let home = dirs::home_dir().context("Could not determine home directory")?;
                Ok(home.join(".car-rental"))
            }
        }
    }
}
