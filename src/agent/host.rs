// src/agent/host.rs
use serde::Serialize;
use tokio::process::Command;
use tracing::warn;

const IPV4_TO_IGNORE: &[&str] = &["127.0.0.1"];
const IPV6_TO_IGNORE: &[&str] = &[];

/// Facts the agent reports about the machine it runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostFacts {
    pub os: String,
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
}

impl HostFacts {
    /// Facts that cannot be gathered come back empty.
    pub async fn collect() -> Self {
        Self {
            os: os_description().await,
            ipv4: parse_addresses(&run_command("ip", &["addr"]).await, "inet ", IPV4_TO_IGNORE),
            ipv6: parse_addresses(
                &run_command("ip", &["-6", "addr"]).await,
                "inet6 ",
                IPV6_TO_IGNORE,
            ),
        }
    }
}

/// Operating system name and version, also used as the agent name.
pub async fn os_description() -> String {
    parse_os_description(&run_command("lsb_release", &["-d"]).await)
}

pub fn parse_os_description(lsb_output: &str) -> String {
    lsb_output.replace("Description:", "").trim().to_string()
}

/// Addresses from `ip addr` style output, on lines starting with `prefix`.
pub fn parse_addresses(output: &str, prefix: &str, ignore: &[&str]) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(prefix))
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|cidr| cidr.split('/').next())
        .filter(|address| !ignore.contains(address))
        .map(str::to_string)
        .collect()
}

/// Standard output of `program`, or an empty string when it cannot be run
/// or exits with a failure.
async fn run_command(program: &str, args: &[&str]) -> String {
    let output = match Command::new(program).args(args).output().await {
        Ok(output) => output,
        Err(e) => {
            warn!("Failed to run {}: {}", program, e);
            return String::new();
        }
    };

    if !output.status.success() {
        warn!("{} exited with {}", program, output.status);
        return String::new();
    }

    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const IP_ADDR: &str = "\
1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536 qdisc noqueue state UNKNOWN group default qlen 1000
    link/loopback 00:00:00:00:00:00 brd 00:00:00:00:00:00
    inet 127.0.0.1/8 scope host lo
       valid_lft forever preferred_lft forever
    inet6 ::1/128 scope host
2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc fq_codel state UP
    inet 10.0.0.12/24 brd 10.0.0.255 scope global eth0
    inet6 fe80::1c2b:3ff:fe4d:5e6f/64 scope link
";

    #[test]
    fn test_parse_ipv4_skips_loopback() {
        assert_eq!(
            parse_addresses(IP_ADDR, "inet ", IPV4_TO_IGNORE),
            vec!["10.0.0.12".to_string()]
        );
    }

    #[test]
    fn test_parse_ipv6() {
        assert_eq!(
            parse_addresses(IP_ADDR, "inet6 ", IPV6_TO_IGNORE),
            vec!["::1".to_string(), "fe80::1c2b:3ff:fe4d:5e6f".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_command_yields_empty_output() {
        assert_eq!(run_command("sm-agent-no-such-command", &["-d"]).await, "");
        assert_eq!(parse_os_description(""), "");
        assert!(parse_addresses("", "inet ", IPV4_TO_IGNORE).is_empty());
    }

    #[tokio::test]
    async fn test_failing_command_yields_empty_output() {
        if std::path::Path::new("/bin/sh").exists() {
            assert_eq!(run_command("/bin/sh", &["-c", "echo partial; exit 3"]).await, "");
        }
    }

    #[tokio::test]
    async fn test_successful_command_output() {
        if std::path::Path::new("/bin/sh").exists() {
            assert_eq!(run_command("/bin/sh", &["-c", "echo hello"]).await, "hello\n");
        }
    }

    #[test]
    fn test_parse_os_description() {
        assert_eq!(
            parse_os_description("Description:\tUbuntu 22.04.3 LTS\n"),
            "Ubuntu 22.04.3 LTS"
        );
    }
}
