//! Command-line flags layered over the config file.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ember_config::{Config, ParticlePreset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    Embers,
    Storm,
}

impl From<PresetArg> for ParticlePreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Embers => ParticlePreset::Embers,
            PresetArg::Storm => ParticlePreset::Storm,
        }
    }
}

/// Countdown to the fest over a field of drifting embers.
#[derive(Debug, Parser)]
#[command(name = "ember", version, about)]
pub struct Cli {
    /// Config file to read instead of the default location.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Countdown target, `YYYY-MM-DDTHH:MM:SS` local time or RFC 3339.
    #[arg(long, value_name = "DATETIME")]
    pub target: Option<String>,

    /// Number of embers.
    #[arg(long, value_name = "N")]
    pub count: Option<usize>,

    /// Particle preset.
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Disable cursor sparks.
    #[arg(long)]
    pub no_sparks: bool,

    /// Start with ember glow enabled.
    #[arg(long)]
    pub glow: bool,

    /// Write the effective configuration to disk and exit.
    #[arg(long)]
    pub init_config: bool,
}

impl Cli {
    /// Apply flag overrides on top of file values.
    pub fn apply(&self, config: &mut Config) {
        if let Some(target) = &self.target {
            config.target = target.clone();
        }
        if let Some(preset) = self.preset {
            config.particles.preset = preset.into();
        }
        if let Some(count) = self.count {
            config.particles.count = Some(count);
        }
        if self.no_sparks {
            config.sparks.enabled = false;
        }
        if self.glow {
            config.glow = true;
        }
    }
}
