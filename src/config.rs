//! User settings loaded from TOML.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;
use venturegrid_engine::engine::{MAX_RECALC_PASSES, RecalcOptions};
use venturegrid_finance::{
    Assumptions, DEFAULT_DISCOUNT_RATE, DEFAULT_IRR_GUESS, Money, Rate, TAX_RATE,
};

/// Config files larger than this are ignored.
pub const MAX_CONFIG_FILE_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub recalc: RecalcSettings,
    pub finance: FinanceSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecalcSettings {
    pub max_passes: usize,
    pub detect_cycles: bool,
}

impl Default for RecalcSettings {
    fn default() -> Self {
        RecalcSettings {
            max_passes: MAX_RECALC_PASSES,
            detect_cycles: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinanceSettings {
    pub discount_rate: Rate,
    pub tax_rate: Rate,
    pub irr_guess: Rate,
    pub initial_investment: Money,
}

impl Default for FinanceSettings {
    fn default() -> Self {
        FinanceSettings {
            discount_rate: DEFAULT_DISCOUNT_RATE,
            tax_rate: TAX_RATE,
            irr_guess: DEFAULT_IRR_GUESS,
            initial_investment: 0.0,
        }
    }
}

impl Settings {
    pub fn recalc_options(&self) -> RecalcOptions {
        RecalcOptions {
            max_passes: self.recalc.max_passes,
            detect_cycles: self.recalc.detect_cycles,
        }
    }

    pub fn assumptions(&self) -> Assumptions {
        Assumptions {
            tax_rate: self.finance.tax_rate,
            discount_rate: self.finance.discount_rate,
            irr_guess: self.finance.irr_guess,
        }
    }

    /// Replace out-of-range values with defaults, returning a warning for each.
    fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        let defaults = Settings::default();

        if self.recalc.max_passes == 0 {
            warnings.push(format!(
                "recalc.max_passes must be at least 1, using {}",
                defaults.recalc.max_passes
            ));
            self.recalc.max_passes = defaults.recalc.max_passes;
        }

        let finance = &mut self.finance;
        let checks: [(&str, &mut f64, f64); 4] = [
            ("finance.discount_rate", &mut finance.discount_rate, defaults.finance.discount_rate),
            ("finance.tax_rate", &mut finance.tax_rate, defaults.finance.tax_rate),
            ("finance.irr_guess", &mut finance.irr_guess, defaults.finance.irr_guess),
            (
                "finance.initial_investment",
                &mut finance.initial_investment,
                defaults.finance.initial_investment,
            ),
        ];
        for (key, value, default) in checks {
            if !value.is_finite() {
                warnings.push(format!("{} must be finite, using {}", key, default));
                *value = default;
            }
        }

        if finance.discount_rate <= -1.0 {
            warnings.push(format!(
                "finance.discount_rate must be greater than -1, using {}",
                defaults.finance.discount_rate
            ));
            finance.discount_rate = defaults.finance.discount_rate;
        }

        warnings
    }
}

/// Load settings from `config_file`, or from the user config dir when none is given.
///
/// Never fails: problems become warnings and the affected settings fall back
/// to defaults. A missing default file is silent; a missing explicit file is not.
pub fn load_settings(config_file: Option<&PathBuf>) -> (Settings, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let config_path = config_file.cloned().or_else(user_config_path);

    let Some(path) = config_path else {
        return (Settings::default(), warnings);
    };

    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Settings::default(), warnings);
    }

    let mut settings = match read_settings(&path) {
        Ok(settings) => settings,
        Err(warning) => {
            warnings.push(warning);
            return (Settings::default(), warnings);
        }
    };
    warnings.extend(settings.sanitize());
    tracing::debug!(path = %path.display(), "loaded settings");
    (settings, warnings)
}

fn read_settings(path: &Path) -> Result<Settings, String> {
    let too_big = |len: u64| {
        format!(
            "Ignoring {}: {} bytes exceeds the {} byte limit",
            path.display(),
            len,
            MAX_CONFIG_FILE_BYTES
        )
    };

    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => return Err(too_big(meta.len())),
        Ok(_) => {}
        Err(err) => return Err(format!("Failed to read {}: {}", path.display(), err)),
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    if content.len() as u64 > MAX_CONFIG_FILE_BYTES {
        return Err(too_big(content.len() as u64));
    }

    parse_settings(&content).map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
}

fn parse_settings(content: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str::<Settings>(content)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "venturegrid")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
