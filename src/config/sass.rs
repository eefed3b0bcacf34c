use camino::Utf8PathBuf;
use serde::Deserialize;

/// The `[sass]` table of the configuration file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct SassConfig {
    /// entry stylesheets, a single path or a list
    #[serde(deserialize_with = "one_or_many")]
    pub source: Vec<Utf8PathBuf>,
    /// searched for imports not found next to the importing file
    pub include_paths: Vec<Utf8PathBuf>,
    /// where the css and map files are written
    pub dest: Utf8PathBuf,
    /// glob of the stylesheets that trigger a recompile, relative to the config dir
    pub watch: String,
    /// also recompile when a stylesheet under the include paths changes
    pub watch_include_paths: bool,
    pub style: OutputStyle,
    pub compiler: CompilerKind,
    /// the Dart Sass executable, looked up on PATH when not set
    pub sass_exe: Option<Utf8PathBuf>,
    pub browserquery: String,
    pub debounce_ms: u64,
}

impl Default for SassConfig {
    fn default() -> Self {
        Self {
            source: vec![Utf8PathBuf::from("main.scss")],
            include_paths: Vec::new(),
            dest: Utf8PathBuf::from("../css"),
            watch: "*.scss".to_string(),
            watch_include_paths: false,
            style: OutputStyle::default(),
            compiler: CompilerKind::default(),
            sass_exe: None,
            browserquery: "defaults".to_string(),
            debounce_ms: 200,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OutputStyle {
    #[default]
    Expanded,
    Compressed,
}

impl OutputStyle {
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Compressed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expanded => "expanded",
            Self::Compressed => "compressed",
        }
    }
}

impl From<OutputStyle> for grass::OutputStyle {
    fn from(style: OutputStyle) -> Self {
        match style {
            OutputStyle::Expanded => grass::OutputStyle::Expanded,
            OutputStyle::Compressed => grass::OutputStyle::Compressed,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CompilerKind {
    /// in-process, no external tool needed
    #[default]
    Grass,
    /// the `sass` executable
    DartSass,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub(super) struct ConfigFile {
    #[serde(default)]
    pub sass: SassConfig,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Utf8PathBuf>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Utf8PathBuf),
        Many(Vec<Utf8PathBuf>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(path) => vec![path],
        OneOrMany::Many(paths) => paths,
    })
}
