use serde::Serialize;
use std::{collections::HashMap, fmt, str::FromStr};

/// Resource record type as written in a master file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RrType {
    A,
    Aaaa,
    Ns,
    Cname,
    Soa,
    Ptr,
    Mx,
    Txt,
    Spf,
    Srv,
    Caa,
    Dname,
    Hinfo,
    Rp,
    Naptr,
    Loc,
    Ds,
    Dnskey,
    Rrsig,
    Nsec,
    Nsec3,
    Nsec3param,
    Tlsa,
    Sshfp,
    Svcb,
    Https,
    Uri,
    Cds,
    Cdnskey,
    /// Generic `TYPEnnn` form
    Unknown(u16),
}

impl RrType {
    const MNEMONICS: [(&'static str, Self); 29] = [
        ("A", Self::A),
        ("AAAA", Self::Aaaa),
        ("NS", Self::Ns),
        ("CNAME", Self::Cname),
        ("SOA", Self::Soa),
        ("PTR", Self::Ptr),
        ("MX", Self::Mx),
        ("TXT", Self::Txt),
        ("SPF", Self::Spf),
        ("SRV", Self::Srv),
        ("CAA", Self::Caa),
        ("DNAME", Self::Dname),
        ("HINFO", Self::Hinfo),
        ("RP", Self::Rp),
        ("NAPTR", Self::Naptr),
        ("LOC", Self::Loc),
        ("DS", Self::Ds),
        ("DNSKEY", Self::Dnskey),
        ("RRSIG", Self::Rrsig),
        ("NSEC", Self::Nsec),
        ("NSEC3", Self::Nsec3),
        ("NSEC3PARAM", Self::Nsec3param),
        ("TLSA", Self::Tlsa),
        ("SSHFP", Self::Sshfp),
        ("SVCB", Self::Svcb),
        ("HTTPS", Self::Https),
        ("URI", Self::Uri),
        ("CDS", Self::Cds),
        ("CDNSKEY", Self::Cdnskey),
    ];

    /// Type code for the `TYPEnnn` form, mapped back onto a mnemonic when known
    const fn from_code(code: u16) -> Self {
        match code {
            1 => Self::A,
            2 => Self::Ns,
            5 => Self::Cname,
            6 => Self::Soa,
            12 => Self::Ptr,
            15 => Self::Mx,
            16 => Self::Txt,
            28 => Self::Aaaa,
            33 => Self::Srv,
            39 => Self::Dname,
            257 => Self::Caa,
            _ => Self::Unknown(code),
        }
    }

    /// DNSSEC types allowed next to a CNAME at the same owner
    #[must_use]
    pub const fn is_cname_neutral(self) -> bool {
        matches!(self, Self::Rrsig | Self::Nsec | Self::Nsec3)
    }
}

impl FromStr for RrType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        if let Some((_, rtype)) = Self::MNEMONICS.iter().find(|(m, _)| *m == upper) {
            return Ok(*rtype);
        }
        upper
            .strip_prefix("TYPE")
            .and_then(|code| code.parse::<u16>().ok())
            .map(Self::from_code)
            .ok_or(())
    }
}

impl fmt::Display for RrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Self::Unknown(code) = self {
            return write!(f, "TYPE{code}");
        }
        let mnemonic = Self::MNEMONICS
            .iter()
            .find(|(_, rtype)| rtype == self)
            .map_or("?", |(m, _)| *m);
        f.write_str(mnemonic)
    }
}

/// Record types that imply a reachable hostname
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordType {
    #[serde(rename = "NS")]
    Ns,
    #[serde(rename = "CNAME")]
    Cname,
    #[serde(rename = "A")]
    A,
}

impl RecordType {
    /// Map a parsed record type onto the hostname-bearing ones, `None` for the rest
    #[must_use]
    pub const fn from_rr_type(rtype: RrType) -> Option<Self> {
        match rtype {
            RrType::Ns => Some(Self::Ns),
            RrType::Cname => Some(Self::Cname),
            RrType::A => Some(Self::A),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ns => "NS",
            Self::Cname => "CNAME",
            Self::A => "A",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One zone entry believed to be reachable over the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostnameRecord {
    pub fqdn: String,
    pub record_type: RecordType,
}

/// FQDN to record type, in the order each FQDN first qualified.
///
/// Inserting an existing FQDN overwrites its type and keeps its position.
#[derive(Debug, Clone, Default)]
pub struct HostnameMap {
    entries: Vec<HostnameRecord>,
    index: HashMap<String, usize>,
}

impl HostnameMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the record type for `fqdn`, returning the type it replaced
    pub fn insert(&mut self, fqdn: String, record_type: RecordType) -> Option<RecordType> {
        if let Some(entry) = self
            .index
            .get(&fqdn)
            .and_then(|&pos| self.entries.get_mut(pos))
        {
            return Some(std::mem::replace(&mut entry.record_type, record_type));
        }
        self.index.insert(fqdn.clone(), self.entries.len());
        self.entries.push(HostnameRecord { fqdn, record_type });
        None
    }

    #[must_use]
    pub fn get(&self, fqdn: &str) -> Option<RecordType> {
        self.index
            .get(fqdn)
            .and_then(|&pos| self.entries.get(pos))
            .map(|entry| entry.record_type)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HostnameRecord> {
        self.entries.iter()
    }
}

impl IntoIterator for HostnameMap {
    type Item = HostnameRecord;
    type IntoIter = std::vec::IntoIter<HostnameRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a HostnameMap {
    type Item = &'a HostnameRecord;
    type IntoIter = std::slice::Iter<'a, HostnameRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
