use ipnet::{Ipv4Net, Ipv6Net};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Address family of a ROA prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressFamily {
    #[serde(rename = "4")]
    Ipv4,
    #[serde(rename = "6")]
    Ipv6,
}

impl AddressFamily {
    /// Numeric family, 4 or 6
    pub fn number(&self) -> u8 {
        match self {
            AddressFamily::Ipv4 => 4,
            AddressFamily::Ipv6 => 6,
        }
    }

    /// Longest prefix length (and so the largest maxLength) the family allows
    pub fn max_prefix_len(&self) -> u8 {
        match self {
            AddressFamily::Ipv4 => 32,
            AddressFamily::Ipv6 => 128,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IPv{}", self.number())
    }
}

/// A parsed ROA prefix in CIDR notation
///
/// Parsing tries IPv4 first and IPv6 second. A prefix length is mandatory;
/// a bare address is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VrpPrefix {
    V4(Ipv4Net),
    V6(Ipv6Net),
}

impl VrpPrefix {
    pub fn family(&self) -> AddressFamily {
        match self {
            VrpPrefix::V4(_) => AddressFamily::Ipv4,
            VrpPrefix::V6(_) => AddressFamily::Ipv6,
        }
    }

    /// Network address with host bits cleared
    pub fn network(&self) -> IpAddr {
        match self {
            VrpPrefix::V4(net) => IpAddr::V4(net.network()),
            VrpPrefix::V6(net) => IpAddr::V6(net.network()),
        }
    }

    pub fn prefix_len(&self) -> u8 {
        match self {
            VrpPrefix::V4(net) => net.prefix_len(),
            VrpPrefix::V6(net) => net.prefix_len(),
        }
    }

    /// Canonical `network/len` form, e.g. `2001:db8::/32`
    pub fn normalized(&self) -> String {
        format!("{}/{}", self.network(), self.prefix_len())
    }
}

impl FromStr for VrpPrefix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.contains('/') {
            return Err(format!("{} has no prefix length", s));
        }
        if let Ok(net) = Ipv4Net::from_str(s) {
            return Ok(VrpPrefix::V4(net));
        }
        if let Ok(net) = Ipv6Net::from_str(s) {
            return Ok(VrpPrefix::V6(net));
        }
        Err(format!(
            "{} is not an IPv4 or IPv6 network prefix and length",
            s
        ))
    }
}

impl fmt::Display for VrpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VrpPrefix::V4(net) => write!(f, "{}", net),
            VrpPrefix::V6(net) => write!(f, "{}", net),
        }
    }
}
