use crate::{
    defaults,
    utils::{is_opt_env_var, trim_opt_env_key},
};
use anyhow::Result;
pub use clap::Parser;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use strum::{AsRefStr, EnumString};

#[derive(Debug, EnumString, AsRefStr)]
pub enum EnvVar {
    #[strum(serialize = "ORGBOARD_GRAPHQL_HOST")]
    GraphQlHost,
    #[strum(serialize = "ORGBOARD_GRAPHQL_PORT")]
    GraphQlPort,
}

pub fn env_or_default(var: EnvVar, default: String) -> String {
    std::env::var(var.as_ref()).unwrap_or(default)
}

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "Orgboard Aggregator",
    about = "Standalone binary for the orgboard dashboard aggregator"
)]
pub struct DashboardArgs {
    #[clap(short, long, parse(from_os_str), help = "Aggregator service config file.")]
    pub config: Option<PathBuf>,
    #[clap(long, help = "Organization id to aggregate.")]
    pub org_id: Option<String>,
    #[clap(
        long,
        help = "Listening IP of the GraphQL API.",
        default_value = defaults::GRAPHQL_API_HOST
    )]
    pub graphql_api_host: String,
    #[clap(
        long,
        help = "Listening port of the GraphQL API.",
        default_value = defaults::GRAPHQL_API_PORT
    )]
    pub graphql_api_port: String,
    #[clap(long, help = "Enable verbose logging.")]
    pub verbose: bool,
}

pub trait MutableConfig {
    fn inject_opt_env_vars(&mut self) -> Result<()>;
    fn derive_http_url(&self) -> String;
}

fn derive_http_url(host: &String, port: &String) -> String {
    let protocol = match port.as_str() {
        "443" | "4443" => "https",
        _ => "http",
    };

    format!("{}://{}:{}", protocol, host, port)
}

#[derive(Clone, Deserialize, Debug)]
pub struct GraphQlApiConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: String,
}

impl Default for GraphQlApiConfig {
    fn default() -> Self {
        Self {
            host: defaults::GRAPHQL_API_HOST.into(),
            port: defaults::GRAPHQL_API_PORT.into(),
        }
    }
}

impl std::string::ToString for GraphQlApiConfig {
    fn to_string(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl MutableConfig for GraphQlApiConfig {
    fn inject_opt_env_vars(&mut self) -> Result<()> {
        if is_opt_env_var(&self.host) {
            self.host = std::env::var(trim_opt_env_key(&self.host))
                .unwrap_or_else(|_| panic!("Failed to read '{}' from env", &self.host));
        }

        if is_opt_env_var(&self.port) {
            self.port = std::env::var(trim_opt_env_key(&self.port))
                .unwrap_or_else(|_| panic!("Failed to read '{}' from env", &self.port));
        }

        Ok(())
    }

    fn derive_http_url(&self) -> String {
        derive_http_url(&self.host, &self.port)
    }
}

#[derive(Clone, Deserialize, Debug, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub graphql_api: GraphQlApiConfig,
    #[serde(default)]
    pub verbose: bool,
}

impl DashboardConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let mut config: DashboardConfig = serde_yaml::from_reader(file)?;
        config.inject_opt_env_vars()?;
        Ok(config)
    }
}

impl MutableConfig for DashboardConfig {
    fn inject_opt_env_vars(&mut self) -> Result<()> {
        self.graphql_api.inject_opt_env_vars()
    }

    fn derive_http_url(&self) -> String {
        self.graphql_api.derive_http_url()
    }
}

// Construct a config from args passed to the program. Even if the opt is not
// passed it could exist as an environment variable, thus the use of
// `env_or_default`.
impl From<DashboardArgs> for DashboardConfig {
    fn from(args: DashboardArgs) -> Self {
        let mut config = DashboardConfig {
            graphql_api: GraphQlApiConfig {
                host: env_or_default(EnvVar::GraphQlHost, args.graphql_api_host),
                port: env_or_default(EnvVar::GraphQlPort, args.graphql_api_port),
            },
            verbose: args.verbose,
        };

        config
            .inject_opt_env_vars()
            .expect("Failed to inject env vars.");

        config
    }
}
