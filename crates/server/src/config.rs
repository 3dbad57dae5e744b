use anyhow::Context;
use clap::Parser;
use fleetview_engine::{ImageBounds, MapConfig};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 39444;

#[derive(Debug, Parser)]
#[command(name = "fleetview-server", about = "Serve the Fleetview map viewport")]
pub struct Cli {
    /// Address to listen on.
    #[arg(long)]
    pub addr: Option<SocketAddr>,

    /// TOML config file. Defaults to ~/.fleetview/config.toml when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Map image drawn under the grid.
    #[arg(long)]
    pub map_image: Option<PathBuf>,

    /// Seed the map with a deterministic demo fleet.
    #[arg(long)]
    pub demo: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MapImageConfig {
    pub path: PathBuf,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for MapImageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            min_x: -100.0,
            min_y: -100.0,
            max_x: 100.0,
            max_y: 100.0,
        }
    }
}

impl MapImageConfig {
    pub fn bounds(&self) -> ImageBounds {
        ImageBounds {
            min_x: self.min_x,
            min_y: self.min_y,
            max_x: self.max_x,
            max_y: self.max_y,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub map: MapConfig,
    pub map_image: Option<MapImageConfig>,
    /// Host clock resolution for the playback timer.
    pub clock_tick_ms: u64,
    pub demo: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            map: MapConfig::default(),
            map_image: None,
            clock_tick_ms: 50,
            demo: false,
        }
    }
}

impl ServerConfig {
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".fleetview")
            .join("config.toml")
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let cfg: Self = toml::from_str(raw).context("parse config")?;
        cfg.map.validate().context("map config")?;
        anyhow::ensure!(cfg.clock_tick_ms > 0, "clock_tick_ms must be positive");
        Ok(cfg)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config: {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("load config: {}", path.display()))
    }

    /// Config file (explicit path must exist, default path is optional) with CLI
    /// flags layered on top.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut cfg = match &cli.config {
            Some(path) => Self::load(path)?,
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load(&path)?
                } else {
                    Self::default()
                }
            }
        };
        if let Some(addr) = cli.addr {
            cfg.addr = addr;
        }
        if let Some(path) = &cli.map_image {
            let mut image = cfg.map_image.take().unwrap_or_default();
            image.path = path.clone();
            cfg.map_image = Some(image);
        }
        cfg.demo |= cli.demo;
        Ok(cfg)
    }

    pub fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms)
    }
}
