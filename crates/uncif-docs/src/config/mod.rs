use crate::workflows::fees::{FeeSchedule, Rupees};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub fees: FeeSchedule,
    pub export: ExportSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = FeeSchedule::default();
        let fees = FeeSchedule {
            base_fee: Rupees(number_var("UNCIF_BASE_FEE", defaults.base_fee.0)?),
            per_page_fee: Rupees(number_var("UNCIF_PER_PAGE_FEE", defaults.per_page_fee.0)?),
            included_pages: number_var("UNCIF_INCLUDED_PAGES", defaults.included_pages)?,
            documentation_fee: Rupees(number_var(
                "UNCIF_DOCUMENTATION_FEE",
                defaults.documentation_fee.0,
            )?),
            application_fee: Rupees(number_var(
                "UNCIF_APPLICATION_FEE",
                defaults.application_fee.0,
            )?),
            applicant_share_percent: number_var(
                "UNCIF_APPLICANT_SHARE_PERCENT",
                defaults.applicant_share_percent,
            )?,
            max_page_count: number_var("UNCIF_MAX_PAGE_COUNT", defaults.max_page_count)?,
        };
        if fees.applicant_share_percent > 100 {
            return Err(ConfigError::InvalidShare(fees.applicant_share_percent));
        }

        let export_defaults = ExportSettings::default();
        let export = ExportSettings {
            org_prefix: env::var("UNCIF_ORG_PREFIX").unwrap_or(export_defaults.org_prefix),
            output_dir: env::var("UNCIF_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(export_defaults.output_dir),
            raster_scale: number_var("UNCIF_RASTER_SCALE", export_defaults.raster_scale)?,
            jpeg_quality: number_var("UNCIF_JPEG_QUALITY", export_defaults.jpeg_quality)?,
            max_pages: number_var("UNCIF_EXPORT_MAX_PAGES", export_defaults.max_pages)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            fees,
            export,
        })
    }
}

fn number_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { var }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Artifact naming and encoder settings shared by the CLI and the HTTP service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub org_prefix: String,
    pub output_dir: PathBuf,
    /// Upscaling factor applied on top of 96 dpi when rasterizing.
    pub raster_scale: u32,
    pub jpeg_quality: u8,
    /// Longest laid-out document accepted for export, in A4 pages.
    pub max_pages: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            org_prefix: "UNCIF".to_string(),
            output_dir: PathBuf::from("exports"),
            raster_scale: 2,
            jpeg_quality: 90,
            max_pages: 10,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { var: &'static str },
    InvalidShare(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { var } => {
                write!(f, "{var} must be a non-negative whole number")
            }
            ConfigError::InvalidShare(value) => write!(
                f,
                "UNCIF_APPLICANT_SHARE_PERCENT must be between 0 and 100 (found {value})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidShare(_) => None,
        }
    }
}
