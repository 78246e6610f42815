use std::{
    io,
    net::{IpAddr, UdpSocket},
};

use clap::Parser;
use lx_model::{FrameworkInfo, NodeId};

/// LayerX Mesos RPI: bridges the LayerX core to a Mesos-style master.
#[derive(Debug, Parser)]
#[command(name = "lx-rpid", version)]
pub struct Config {
    /// HTTP listening port.
    #[arg(long, default_value_t = 4000)]
    pub port: u16,

    /// Backend master address.
    #[arg(long, default_value = "127.0.0.1:5050")]
    pub master: String,

    /// Debug-level logging.
    #[arg(long)]
    pub debug: bool,

    /// LayerX core address to register with.
    #[arg(long, default_value = "")]
    pub layerx: String,

    /// Address to bind and advertise; detected from the outbound interface when unset.
    #[arg(long)]
    pub localip: Option<String>,

    /// Display and registration name.
    #[arg(long, default_value = "Mesos-RPI-0.0.0")]
    pub name: String,

    /// Backend user tasks run as.
    #[arg(long, default_value = "root")]
    pub user: String,

    /// Log output: text, json or journald.
    #[arg(long, default_value = "text")]
    pub log_format: String,

    /// Comma-separated node ids offered by the loopback backend.
    #[arg(long, value_delimiter = ',', default_value = "localhost")]
    pub nodes: Vec<String>,
}

impl Config {
    /// `--localip` when it parses, otherwise the address of the outbound interface.
    pub fn local_ip(&self) -> io::Result<IpAddr> {
        match self.localip.as_deref().map(str::parse::<IpAddr>) {
            Some(Ok(ip)) => Ok(ip),
            _ => detect_local_ip(),
        }
    }

    pub fn framework_info(&self) -> FrameworkInfo {
        FrameworkInfo::new(self.layerx.clone(), self.user.clone())
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(NodeId::from)
            .collect()
    }
}

/// Connecting a UDP socket sends nothing but makes the kernel pick the outbound route.
fn detect_local_ip() -> io::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect("8.8.8.8:80")?;
    Ok(socket.local_addr()?.ip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::try_parse_from(["lx-rpid"]).unwrap();
        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.master, "127.0.0.1:5050");
        assert!(!cfg.debug);
        assert!(cfg.layerx.is_empty());
        assert_eq!(cfg.name, "Mesos-RPI-0.0.0");
        assert_eq!(cfg.user, "root");
        assert_eq!(cfg.log_format, "text");
        assert_eq!(cfg.node_ids(), vec![NodeId::from("localhost")]);
    }

    #[test]
    fn explicit_local_ip_wins() {
        let cfg = Config::try_parse_from(["lx-rpid", "--localip", "10.0.0.5"]).unwrap();
        assert_eq!(cfg.local_ip().unwrap(), "10.0.0.5".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn nodes_split_on_commas() {
        let cfg = Config::try_parse_from(["lx-rpid", "--nodes", "n1, n2,,n3"]).unwrap();
        let ids: Vec<String> = cfg.node_ids().iter().map(ToString::to_string).collect();
        assert_eq!(ids, ["n1", "n2", "n3"]);
    }

    #[test]
    fn framework_points_at_coordinator() {
        let cfg = Config::try_parse_from(["lx-rpid", "--layerx", "10.1.1.1:3000", "--user", "mesos"])
            .unwrap();
        let info = cfg.framework_info();
        assert_eq!(info.webui_url, "10.1.1.1:3000");
        assert_eq!(info.user, "mesos");
        assert_eq!(info.failover_timeout, 0.0);
    }
}
