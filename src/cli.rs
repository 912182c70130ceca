//! 命令行参数
//!
//! 每个参数都可以省略，省略时使用环境变量（或 `.env`）中的值。

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Capture weekly lesson attendance on the T-PAD portal.
#[derive(Debug, Parser)]
#[command(name = "tpad-capture", version)]
pub struct Cli {
    /// Workbook (.xlsx), .csv or .toml file with the weekly attendance records
    #[arg(long, alias = "excel_file", value_name = "FILE")]
    pub excel_file: Option<PathBuf>,

    /// TSC number used to log in to the portal
    #[arg(long, alias = "tsc_number")]
    pub tsc_number: Option<String>,

    /// ID number used to log in to the portal
    #[arg(long, alias = "id_number")]
    pub id_number: Option<String>,

    /// Password used to log in to the portal
    #[arg(long)]
    pub password: Option<String>,

    /// Pretty-print the per-record summary
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 用命令行参数覆盖配置中的对应项
    pub fn apply(self, mut config: Config) -> Config {
        if let Some(path) = self.excel_file {
            config.records_file = path.display().to_string();
        }
        if let Some(tsc_number) = self.tsc_number {
            config.tsc_number = Some(tsc_number);
        }
        if let Some(id_number) = self.id_number {
            config.id_number = Some(id_number);
        }
        if let Some(password) = self.password {
            config.password = Some(password);
        }
        config.verbose_logging |= self.verbose;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_config() -> Config {
        Config {
            records_file: "from_env.xlsx".to_string(),
            id_number: Some("11111111".to_string()),
            password: Some("env-secret".to_string()),
            tsc_number: Some("TSC-ENV".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_arguments_override_environment() {
        let cli = Cli::try_parse_from([
            "tpad-capture",
            "--excel-file",
            "week3.xlsx",
            "--tsc-number",
            "TSC-998",
            "--verbose",
        ])
        .unwrap();

        let config = cli.apply(env_config());
        assert_eq!(config.records_file, "week3.xlsx");
        assert_eq!(config.tsc_number.as_deref(), Some("TSC-998"));
        // 未给出的参数保留环境变量的值
        assert_eq!(config.id_number.as_deref(), Some("11111111"));
        assert_eq!(config.password.as_deref(), Some("env-secret"));
        assert!(config.verbose_logging);
    }

    #[test]
    fn test_underscore_spellings_are_accepted() {
        let cli = Cli::try_parse_from([
            "tpad-capture",
            "--excel_file",
            "term1.xlsx",
            "--id_number",
            "22222222",
        ])
        .unwrap();

        let config = cli.apply(env_config());
        assert_eq!(config.records_file, "term1.xlsx");
        assert_eq!(config.id_number.as_deref(), Some("22222222"));
    }

    #[test]
    fn test_no_arguments_keeps_environment() {
        let cli = Cli::try_parse_from(["tpad-capture"]).unwrap();
        let config = cli.apply(env_config());
        assert_eq!(config.records_file, "from_env.xlsx");
        assert!(!config.verbose_logging);
    }
}
