use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid remote origin: {0:?}")]
pub struct InvalidOrigin(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unsupported address family with {0} packed bytes")]
pub struct UnsupportedAddressFamily(pub usize);

const IPV4_ANONYMIZED_BITS: u32 = 16;
const IPV6_ANONYMIZED_BITS: u32 = 80;

/// The network address a comment has been submitted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemoteOrigin(IpAddr);

impl RemoteOrigin {
    /// Width of the packed representation that gets stored.
    pub const PACKED_LEN: usize = 16;

    /// IPv4-mapped IPv6 addresses are stored as plain IPv4.
    pub fn new(addr: IpAddr) -> Self {
        Self(addr.to_canonical())
    }

    pub const fn addr(&self) -> IpAddr {
        self.0
    }

    pub const fn is_ipv4(&self) -> bool {
        self.0.is_ipv4()
    }

    pub const fn is_ipv6(&self) -> bool {
        self.0.is_ipv6()
    }

    /// IPv6 addresses are packed natively, IPv4 addresses as
    /// IPv4-mapped IPv6 addresses.
    pub fn to_packed(&self) -> [u8; Self::PACKED_LEN] {
        match self.0 {
            IpAddr::V4(addr) => addr.to_ipv6_mapped().octets(),
            IpAddr::V6(addr) => addr.octets(),
        }
    }

    /// Inverse of [`RemoteOrigin::to_packed`].
    ///
    /// Plain 4-byte IPv4 values are accepted as well. IPv4-mapped
    /// IPv6 addresses are always unpacked as IPv4.
    pub fn from_packed(packed: &[u8]) -> Result<Self, UnsupportedAddressFamily> {
        if let Ok(octets) = <[u8; 4]>::try_from(packed) {
            return Ok(Ipv4Addr::from(octets).into());
        }
        if let Ok(octets) = <[u8; 16]>::try_from(packed) {
            let addr = Ipv6Addr::from(octets);
            return Ok(match addr.to_ipv4_mapped() {
                Some(addr) => addr.into(),
                None => addr.into(),
            });
        }
        Err(UnsupportedAddressFamily(packed.len()))
    }

    /// Coarsens the address to its network prefix: /16 for IPv4
    /// and /48 for IPv6.
    pub fn anonymized(&self) -> Self {
        match self.0 {
            IpAddr::V4(addr) => {
                let host_mask = (1u32 << IPV4_ANONYMIZED_BITS) - 1;
                Ipv4Addr::from(u32::from(addr) & !host_mask).into()
            }
            IpAddr::V6(addr) => {
                let host_mask = (1u128 << IPV6_ANONYMIZED_BITS) - 1;
                Ipv6Addr::from(u128::from(addr) & !host_mask).into()
            }
        }
    }
}

impl Default for RemoteOrigin {
    fn default() -> Self {
        Ipv4Addr::LOCALHOST.into()
    }
}

impl From<IpAddr> for RemoteOrigin {
    fn from(from: IpAddr) -> Self {
        Self::new(from)
    }
}

impl From<Ipv4Addr> for RemoteOrigin {
    fn from(from: Ipv4Addr) -> Self {
        Self(from.into())
    }
}

impl From<Ipv6Addr> for RemoteOrigin {
    fn from(from: Ipv6Addr) -> Self {
        Self::new(from.into())
    }
}

impl From<RemoteOrigin> for IpAddr {
    fn from(from: RemoteOrigin) -> Self {
        from.0
    }
}

impl FromStr for RemoteOrigin {
    type Err = InvalidOrigin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<IpAddr>()
            .map(Into::into)
            .map_err(|_| InvalidOrigin(s.to_owned()))
    }
}

impl fmt::Display for RemoteOrigin {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Caller-supplied remote origin before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginInput {
    Addr(IpAddr),
    Text(String),
}

impl OriginInput {
    pub fn parse(&self) -> Result<RemoteOrigin, InvalidOrigin> {
        match self {
            Self::Addr(addr) => Ok((*addr).into()),
            Self::Text(text) => text.parse(),
        }
    }
}

impl From<IpAddr> for OriginInput {
    fn from(from: IpAddr) -> Self {
        Self::Addr(from)
    }
}

impl From<Ipv4Addr> for OriginInput {
    fn from(from: Ipv4Addr) -> Self {
        Self::Addr(from.into())
    }
}

impl From<Ipv6Addr> for OriginInput {
    fn from(from: Ipv6Addr) -> Self {
        Self::Addr(from.into())
    }
}

impl From<RemoteOrigin> for OriginInput {
    fn from(from: RemoteOrigin) -> Self {
        Self::Addr(from.addr())
    }
}

impl From<String> for OriginInput {
    fn from(from: String) -> Self {
        Self::Text(from)
    }
}

impl From<&str> for OriginInput {
    fn from(from: &str) -> Self {
        Self::Text(from.to_owned())
    }
}

/// A network prefix that remote origins can be matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OriginPrefix {
    addr: IpAddr,
    len: u8,
}

impl OriginPrefix {
    pub fn new(addr: IpAddr, len: u8) -> Result<Self, InvalidOrigin> {
        let max_len = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if len > max_len {
            return Err(InvalidOrigin(format!("{addr}/{len}")));
        }
        Ok(Self { addr, len })
    }

    /// A prefix that matches exactly one address.
    pub fn host(origin: RemoteOrigin) -> Self {
        let addr = origin.addr();
        let len = if addr.is_ipv4() { 32 } else { 128 };
        Self { addr, len }
    }

    pub const fn addr(&self) -> IpAddr {
        self.addr
    }

    pub const fn prefix_len(&self) -> u8 {
        self.len
    }

    /// Inclusive lower and upper bound of all packed origins
    /// that are covered by this prefix.
    pub fn packed_range(&self) -> ([u8; RemoteOrigin::PACKED_LEN], [u8; RemoteOrigin::PACKED_LEN]) {
        let (base, len) = match self.addr {
            IpAddr::V4(addr) => (u128::from(addr.to_ipv6_mapped()), 96 + u32::from(self.len)),
            IpAddr::V6(addr) => (u128::from(addr), u32::from(self.len)),
        };
        let host_mask = u128::MAX.checked_shr(len).unwrap_or_default();
        ((base & !host_mask).to_be_bytes(), (base | host_mask).to_be_bytes())
    }

    pub fn contains(&self, origin: &RemoteOrigin) -> bool {
        let (lower, upper) = self.packed_range();
        let packed = origin.to_packed();
        lower <= packed && packed <= upper
    }
}

impl From<RemoteOrigin> for OriginPrefix {
    fn from(from: RemoteOrigin) -> Self {
        Self::host(from)
    }
}

impl FromStr for OriginPrefix {
    type Err = InvalidOrigin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((addr, len)) = s.trim().split_once('/') else {
            return s.parse().map(Self::host);
        };
        let addr = addr
            .parse::<IpAddr>()
            .map_err(|_| InvalidOrigin(s.to_owned()))?;
        let len = len.parse::<u8>().map_err(|_| InvalidOrigin(s.to_owned()))?;
        Self::new(addr, len)
    }
}

impl fmt::Display for OriginPrefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}/{}", self.addr, self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(s: &str) -> RemoteOrigin {
        s.parse().unwrap()
    }

    #[test]
    fn default_origin_is_loopback() {
        assert_eq!(origin("127.0.0.1"), RemoteOrigin::default());
    }

    #[test]
    fn reject_invalid_origins() {
        assert!("".parse::<RemoteOrigin>().is_err());
        assert!("1.2.3".parse::<RemoteOrigin>().is_err());
        assert!("not an address".parse::<RemoteOrigin>().is_err());
        assert!(OriginInput::from("1.2.3.4.5").parse().is_err());
    }

    #[test]
    fn packed_origins_have_fixed_width() {
        let v4 = origin("1.2.3.4");
        let v6 = origin("2001:db8:85a3::8a2e:370:7334");
        assert_eq!(
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff, 1, 2, 3, 4],
            v4.to_packed()
        );
        assert_eq!(v4, RemoteOrigin::from_packed(&v4.to_packed()).unwrap());
        assert_eq!(v6, RemoteOrigin::from_packed(&v6.to_packed()).unwrap());
        assert!(RemoteOrigin::from_packed(&v6.to_packed()).unwrap().is_ipv6());
    }

    #[test]
    fn ipv4_mapped_origins_are_ipv4() {
        let mapped = origin("::ffff:1.2.3.4");
        assert!(mapped.is_ipv4());
        assert_eq!(origin("1.2.3.4"), mapped);
        assert_eq!(mapped, RemoteOrigin::from_packed(&mapped.to_packed()).unwrap());
        assert_eq!(origin("1.2.0.0"), mapped.anonymized());
        let addr = "::ffff:10.0.0.1".parse::<Ipv6Addr>().unwrap();
        assert!(RemoteOrigin::from(addr).is_ipv4());
        assert!(OriginInput::from(addr).parse().unwrap().is_ipv4());
    }

    #[test]
    fn unpack_legacy_ipv4() {
        assert_eq!(
            origin("10.0.0.1"),
            RemoteOrigin::from_packed(&[10, 0, 0, 1]).unwrap()
        );
    }

    #[test]
    fn reject_unknown_address_families() {
        assert_eq!(
            Err(UnsupportedAddressFamily(6)),
            RemoteOrigin::from_packed(&[1, 2, 3, 4, 5, 6])
        );
        assert_eq!(
            Err(UnsupportedAddressFamily(0)),
            RemoteOrigin::from_packed(&[])
        );
    }

    #[test]
    fn anonymize_ipv4() {
        assert_eq!(origin("1.2.0.0"), origin("1.2.3.4").anonymized());
        assert_eq!(origin("255.255.0.0"), origin("255.255.255.255").anonymized());
    }

    #[test]
    fn anonymize_ipv6() {
        assert_eq!(
            origin("2001:0db8:85a3:0000:0000:0000:0000:0000"),
            origin("2001:0db8:85a3:0000:0000:8a2e:0370:7334").anonymized()
        );
    }

    #[test]
    fn anonymization_is_idempotent() {
        let once = origin("2001:db8:85a3:1:2:8a2e:370:7334").anonymized();
        assert_eq!(once, once.anonymized());
    }

    #[test]
    fn parse_prefixes() {
        let prefix = "1.2.0.0/16".parse::<OriginPrefix>().unwrap();
        assert_eq!(16, prefix.prefix_len());
        assert_eq!("1.2.0.0/16", prefix.to_string());
        assert_eq!(128, "::1".parse::<OriginPrefix>().unwrap().prefix_len());
        assert!("1.2.0.0/33".parse::<OriginPrefix>().is_err());
        assert!("1.2.0.0/x".parse::<OriginPrefix>().is_err());
        assert!("::/129".parse::<OriginPrefix>().is_err());
    }

    #[test]
    fn prefix_ranges() {
        let prefix = "1.2.0.0/16".parse::<OriginPrefix>().unwrap();
        let (lower, upper) = prefix.packed_range();
        assert_eq!(origin("1.2.0.0").to_packed(), lower);
        assert_eq!(origin("1.2.255.255").to_packed(), upper);

        let host = OriginPrefix::host(origin("1.2.3.4"));
        let (lower, upper) = host.packed_range();
        assert_eq!(lower, upper);

        let all = "::/0".parse::<OriginPrefix>().unwrap();
        assert_eq!(([0; 16], [0xff; 16]), all.packed_range());
    }

    #[test]
    fn prefix_contains_origins() {
        let prefix = "2001:db8:85a3::/48".parse::<OriginPrefix>().unwrap();
        assert!(prefix.contains(&origin("2001:db8:85a3:0:0:8a2e:370:7334")));
        assert!(!prefix.contains(&origin("2001:db8:85a4::1")));
        assert!(!prefix.contains(&origin("1.2.3.4")));

        let prefix = "1.2.0.0/16".parse::<OriginPrefix>().unwrap();
        assert!(prefix.contains(&origin("1.2.3.4")));
        assert!(!prefix.contains(&origin("1.3.0.0")));
        assert!(!prefix.contains(&origin("::1")));
    }
}
