//! Parsers for the text formats the samplers read.
//!
//! Each parser is a pure function over the raw content so it can be tested
//! against captured fixtures.

/// Error returned when counter content cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Byte counters for one interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetDevStats {
    pub interface: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

// ============ /proc/net/dev Parser ============

/// Parses `/proc/net/dev` content.
///
/// Rows that do not carry the full 16 counter columns are skipped.
pub fn parse_net_dev(content: &str) -> Vec<NetDevStats> {
    let mut devices = Vec::new();

    for line in content.lines() {
        // Skip header lines
        if line.contains('|') || line.trim().is_empty() {
            continue;
        }

        // Format: "iface: rx_bytes rx_packets rx_errs rx_drop rx_fifo rx_frame rx_compressed rx_multicast tx_bytes ..."
        let Some((name, counters)) = line.split_once(':') else {
            continue;
        };

        let values: Vec<&str> = counters.split_whitespace().collect();
        if values.len() < 16 {
            continue;
        }

        let (Ok(rx_bytes), Ok(tx_bytes)) = (values[0].parse(), values[8].parse()) else {
            continue;
        };

        devices.push(NetDevStats {
            interface: name.trim().to_string(),
            rx_bytes,
            tx_bytes,
        });
    }

    devices
}

// ============ sysfs Counter Parser ============

/// Parses a single-value sysfs counter file such as `statistics/rx_bytes`.
pub fn parse_counter(content: &str) -> Result<u64, ParseError> {
    let trimmed = content.trim();
    trimmed
        .parse()
        .map_err(|_| ParseError::new(format!("invalid counter value '{}'", trimmed)))
}

// ============ `ip -s link` Parser ============

/// Parses the output of `ip -s link show dev <iface>`.
///
/// Format (iproute2):
/// ```text
/// 2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 ...
///     link/ether 52:54:00:12:34:56 brd ff:ff:ff:ff:ff:ff
///     RX:  bytes packets errors dropped  missed   mcast
///     123456789   98765      0       0       0       0
///     TX:  bytes packets errors dropped carrier collsns
///      98765432   54321      0       0       0       0
/// ```
pub fn parse_ip_link(content: &str) -> Result<NetDevStats, ParseError> {
    let mut interface = None;
    let mut rx_bytes = None;
    let mut tx_bytes = None;

    let mut lines = content.lines();
    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();

        if interface.is_none() && !line.starts_with(char::is_whitespace) {
            // "2: eth0: <FLAGS> ..." or "3: veth0@if2: <FLAGS> ..."
            interface = trimmed
                .split(':')
                .nth(1)
                .map(|name| name.trim().split('@').next().unwrap_or_default().to_string());
            continue;
        }

        let target = if trimmed.starts_with("RX:") && rx_bytes.is_none() {
            &mut rx_bytes
        } else if trimmed.starts_with("TX:") && tx_bytes.is_none() {
            &mut tx_bytes
        } else {
            continue;
        };

        let value_line = lines
            .next()
            .ok_or_else(|| ParseError::new("counter header without values"))?;
        let first = value_line
            .split_whitespace()
            .next()
            .ok_or_else(|| ParseError::new("empty counter line"))?;
        *target = Some(
            first
                .parse::<u64>()
                .map_err(|_| ParseError::new(format!("invalid byte count '{}'", first)))?,
        );
    }

    match (rx_bytes, tx_bytes) {
        (Some(rx_bytes), Some(tx_bytes)) => Ok(NetDevStats {
            interface: interface.unwrap_or_default(),
            rx_bytes,
            tx_bytes,
        }),
        _ => Err(ParseError::new("missing RX/TX statistics")),
    }
}

// ============ `netstat -ib` Parser ============

/// Parses the output of `netstat -ibn -I <iface>` (BSD layout).
///
/// The `Ibytes` and `Obytes` columns are located by header name. Rows with a
/// blank address column have fewer fields than the header and are skipped;
/// the link-level row always carries every column.
pub fn parse_netstat_ib(content: &str, interface: &str) -> Result<NetDevStats, ParseError> {
    let mut lines = content.lines();
    let header: Vec<&str> = lines
        .next()
        .ok_or_else(|| ParseError::new("empty netstat output"))?
        .split_whitespace()
        .collect();

    let column = |name: &str| {
        header
            .iter()
            .position(|h| *h == name)
            .ok_or_else(|| ParseError::new(format!("missing {} column", name)))
    };
    let rx_idx = column("Ibytes")?;
    let tx_idx = column("Obytes")?;

    for line in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != header.len() {
            continue;
        }
        // netstat marks down interfaces with a trailing '*'
        if fields[0].trim_end_matches('*') != interface {
            continue;
        }
        let (Ok(rx_bytes), Ok(tx_bytes)) = (fields[rx_idx].parse(), fields[tx_idx].parse()) else {
            continue;
        };
        return Ok(NetDevStats {
            interface: interface.to_string(),
            rx_bytes,
            tx_bytes,
        });
    }

    Err(ParseError::new(format!(
        "no netstat row with byte counters for {}",
        interface
    )))
}
