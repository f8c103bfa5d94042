use std::fmt::{self, Display};
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use strkit_core::models::RepeatKind;
use strkit_search::motif::DEFAULT_LEVEL;
use strkit_search::{ImperfectParams, MinRepeats, ScanTask};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown output format: {0}. Valid options are 'tsv' or 'json'")]
    UnknownFormat(String),
    #[error("{0} loci are not searched for directly, they are merged from ssr loci")]
    NotSearchable(RepeatKind),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tsv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Tsv => write!(f, "tsv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MotifConfig {
    /// Motif standardization level, 0-4.
    pub level: u8,
}

impl Default for MotifConfig {
    fn default() -> Self {
        MotifConfig {
            level: DEFAULT_LEVEL,
        }
    }
}

/// Minimum repeats per motif length and compound merging.
///
/// `dmax` is the largest gap merged into a compound locus, so `0` still
/// merges loci that touch. Set `compound = false` to skip merging.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SsrConfig {
    pub mono: u32,
    pub di: u32,
    pub tri: u32,
    pub tetra: u32,
    pub penta: u32,
    pub hexa: u32,
    pub compound: bool,
    pub dmax: u64,
}

impl Default for SsrConfig {
    fn default() -> Self {
        SsrConfig {
            mono: 12,
            di: 7,
            tri: 5,
            tetra: 4,
            penta: 4,
            hexa: 4,
            compound: true,
            dmax: 10,
        }
    }
}

impl SsrConfig {
    pub fn min_repeats(&self) -> MinRepeats {
        MinRepeats::new(self.mono, self.di, self.tri, self.tetra, self.penta, self.hexa)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct IssrConfig {
    pub seed_repeat: u32,
    pub seed_length: u32,
    pub max_edits: u32,
    pub mismatch_penalty: i64,
    pub gap_penalty: i64,
    pub min_score: i64,
    pub window_size: usize,
}

impl Default for IssrConfig {
    fn default() -> Self {
        IssrConfig::from(ImperfectParams::default())
    }
}

impl From<ImperfectParams> for IssrConfig {
    fn from(params: ImperfectParams) -> Self {
        IssrConfig {
            seed_repeat: params.seed_repeat,
            seed_length: params.seed_min_length,
            max_edits: params.max_consecutive_edits,
            mismatch_penalty: params.mismatch_penalty,
            gap_penalty: params.gap_penalty,
            min_score: params.min_score,
            window_size: params.window_size,
        }
    }
}

impl IssrConfig {
    pub fn params(&self) -> ImperfectParams {
        ImperfectParams {
            seed_repeat: self.seed_repeat,
            seed_min_length: self.seed_length,
            max_consecutive_edits: self.max_edits,
            mismatch_penalty: self.mismatch_penalty,
            gap_penalty: self.gap_penalty,
            min_score: self.min_score,
            window_size: self.window_size,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct VntrConfig {
    pub min_motif: usize,
    pub max_motif: usize,
    pub min_repeat: u32,
}

impl Default for VntrConfig {
    fn default() -> Self {
        VntrConfig {
            min_motif: 7,
            max_motif: 30,
            min_repeat: 2,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Bases of flanking sequence reported on each side, 0 for none.
    pub flank: u64,
    pub format: OutputFormat,
    /// Number of motifs listed in the summary.
    pub top_motifs: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            flank: 100,
            format: OutputFormat::Tsv,
            top_motifs: 10,
        }
    }
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Search settings, read from a TOML file. Every section and key may be left
/// out and falls back to its default.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub threads: usize,
    pub motif: MotifConfig,
    pub ssr: SsrConfig,
    pub issr: IssrConfig,
    pub vntr: VntrConfig,
    pub output: OutputConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            threads: default_threads(),
            motif: MotifConfig::default(),
            ssr: SsrConfig::default(),
            issr: IssrConfig::default(),
            vntr: VntrConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl TryFrom<&Path> for SearchConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}

impl SearchConfig {
    /// The scan a subcommand runs. Compound loci come along with perfect
    /// repeats unless `ssr.compound` is off.
    pub fn task(&self, kind: RepeatKind) -> Result<ScanTask, ConfigError> {
        match kind {
            RepeatKind::Perfect => Ok(ScanTask::Perfect {
                min_repeats: self.ssr.min_repeats(),
                d_max: self.ssr.compound.then_some(self.ssr.dmax),
            }),
            RepeatKind::Imperfect => Ok(ScanTask::Imperfect(self.issr.params())),
            RepeatKind::LargeMotif => Ok(ScanTask::LargeMotif {
                min_motif: self.vntr.min_motif,
                max_motif: self.vntr.max_motif,
                min_repeat: self.vntr.min_repeat,
            }),
            RepeatKind::Compound => Err(ConfigError::NotSearchable(kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_empty_config_is_default() {
        let config: SearchConfig = toml::from_str("").unwrap();
        assert_eq!(config, SearchConfig::default());
    }

    #[rstest]
    fn test_partial_sections() {
        let config: SearchConfig = toml::from_str(
            r#"
            threads = 2

            [ssr]
            mono = 20
            dmax = 0

            [issr]
            min_score = 15

            [output]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.threads, 2);
        assert_eq!(config.ssr.mono, 20);
        assert_eq!(config.ssr.di, 7);
        assert_eq!(config.issr.min_score, 15);
        assert_eq!(config.issr.seed_length, 8);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.output.flank, 100);
        assert_eq!(config.motif.level, 3);

        assert_eq!(
            config.task(RepeatKind::Perfect).unwrap(),
            ScanTask::Perfect {
                min_repeats: MinRepeats::new(20, 7, 5, 4, 4, 4),
                d_max: Some(0),
            }
        );
    }

    #[rstest]
    #[case("", Some(10))]
    #[case("[ssr]\ndmax = 0\n", Some(0))]
    #[case("[ssr]\ncompound = false\n", None)]
    #[case("[ssr]\ncompound = false\ndmax = 0\n", None)]
    fn test_compound_switch(#[case] toml_str: &str, #[case] expected: Option<u64>) {
        let config: SearchConfig = toml::from_str(toml_str).unwrap();
        let ScanTask::Perfect { d_max, .. } = config.task(RepeatKind::Perfect).unwrap() else {
            panic!("ssr config built a non-perfect task");
        };
        assert_eq!(d_max, expected);
    }

    #[rstest]
    fn test_try_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strkit.toml");
        std::fs::write(&path, "[vntr]\nmin_motif = 10\n").unwrap();

        let config = SearchConfig::try_from(path.as_path()).unwrap();
        assert_eq!(
            config.task(RepeatKind::LargeMotif).unwrap(),
            ScanTask::LargeMotif {
                min_motif: 10,
                max_motif: 30,
                min_repeat: 2,
            }
        );
    }

    #[rstest]
    fn test_bad_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strkit.toml");
        std::fs::write(&path, "[ssr]\nmono = \"twelve\"\n").unwrap();

        assert!(matches!(
            SearchConfig::try_from(path.as_path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[rstest]
    fn test_issr_defaults_match_engine() {
        assert_eq!(IssrConfig::default().params(), ImperfectParams::default());
    }

    #[rstest]
    #[case("tsv", OutputFormat::Tsv)]
    #[case("JSON", OutputFormat::Json)]
    fn test_output_format(#[case] input: &str, #[case] expected: OutputFormat) {
        assert_eq!(input.parse::<OutputFormat>().unwrap(), expected);
    }

    #[rstest]
    fn test_compound_is_not_a_search() {
        assert!(SearchConfig::default().task(RepeatKind::Compound).is_err());
    }
}
