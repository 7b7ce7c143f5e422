use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "cacheproxy", about = "Caching HTTP/1.0 forward proxy")]
pub struct Cli {
    /// TCP port to listen on (all interfaces).
    pub port: u16,

    /// Log output format.
    #[arg(long, value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogFormat {
    Json,
    Text,
}
