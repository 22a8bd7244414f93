use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use casereg_analysis::{DeadlineConfig, MatchConfig};

const CONFIG_DIR: &str = "casereg";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub columns: ColumnsConfig,
    #[serde(default)]
    pub deadlines: DeadlineConfig,
    #[serde(default)]
    pub matching: MatchConfig,
    /// Registry snapshot opened last, reused when no path is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_file: Option<PathBuf>,
}

/// How the columns of a loaded registry are read.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ColumnsConfig {
    /// Person name column; its text before the first comma is the
    /// duplicate key.
    #[serde(default = "ColumnsConfig::default_name_field")]
    pub name_field: String,
    /// Column offered as a single-choice facet filter.
    #[serde(default = "ColumnsConfig::default_facet_field")]
    pub facet_field: String,
    /// Auto-numbered column for appended rows.
    #[serde(default = "ColumnsConfig::default_sequence_field")]
    pub sequence_field: String,
    /// Columns converted to dates on load (`dd.mm.yyyy`).
    #[serde(default = "ColumnsConfig::default_date_fields")]
    pub date_fields: Vec<String>,
    /// Columns converted to booleans on load (`Так`/`Ні`).
    #[serde(default = "ColumnsConfig::default_bool_fields")]
    pub bool_fields: Vec<String>,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            name_field: Self::default_name_field(),
            facet_field: Self::default_facet_field(),
            sequence_field: Self::default_sequence_field(),
            date_fields: Self::default_date_fields(),
            bool_fields: Self::default_bool_fields(),
        }
    }
}

impl ColumnsConfig {
    fn default_name_field() -> String {
        "ПІБ".to_string()
    }

    fn default_facet_field() -> String {
        "Прокуратура".to_string()
    }

    fn default_sequence_field() -> String {
        "ID".to_string()
    }

    fn default_date_fields() -> Vec<String> {
        [
            "Дата_реєстрації",
            "Дата_нар",
            "Дата_повідомлення_підозри",
            "Дата_зупинення",
            "Дата_доручення_розшуку",
            "Дата_заведення_ОРС",
            "Дата_інфо_про_перетин",
            "Дата_адмін",
            "Дата_міжнар_розшуку",
            "Дата_виїзду",
            "Дата_оголошення_в_розшук",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    fn default_bool_fields() -> Vec<String> {
        [
            "Є_виїзд_за_кордон",
            "Є_Інтерпол",
            "Є_інфо_про_перетин_кордону",
            "Є_адмін_відповідальність",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    #[must_use]
    pub fn is_date_field(&self, field: &str) -> bool {
        self.date_fields.iter().any(|f| f == field)
    }

    #[must_use]
    pub fn is_bool_field(&self, field: &str) -> bool {
        self.bool_fields.iter().any(|f| f == field)
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'casereg init' to create config.",
                config_path.display()
            );
        }

        Self::load_from(&config_path)
    }

    /// Like [`Config::load`], but falls back to the defaults when no config
    /// file exists yet.
    pub fn load_or_default() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            debug!("No config at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = Self::create_config_at(&config_dir)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Check the column names against your registry export");
        println!("   2. Set deadlines.cutoff_date to the day the measure-term rule took effect");
        println!("   3. Run 'casereg report <registry.json>' to see all analyses at once");
        println!();
        println!("🔧 Configuration options:");
        println!("   - deadlines.measure_expiry: from_start (date + term) or valid_until (last date)");
        println!("   - matching.dob_policy: ignore, or require_nearby with a window in bytes");
        println!("   - columns.date_fields / bool_fields: columns converted on load");
        println!();
        Ok(())
    }

    /// Writes the default template into `dir`; refuses to overwrite.
    pub fn create_config_at(dir: &Path) -> anyhow::Result<PathBuf> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let template = serde_json::to_string_pretty(&Self::default())?;
        std::fs::write(&config_path, template)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Remembers the snapshot that was just opened.
    pub fn save_last_file(&mut self, file: &Path) -> anyhow::Result<()> {
        let file = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());
        if self.last_file.as_deref() == Some(file.as_path()) {
            return Ok(());
        }
        self.last_file = Some(file);
        let config_dir = Self::ensure_config_dir()?;
        self.save_to(&config_dir.join(CONFIG_FILE))?;
        info!("Remembered last registry file");
        Ok(())
    }
}
