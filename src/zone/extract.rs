use super::{
    ZoneParseError,
    name::Name,
    parser::parse_zone,
    record::{HostnameMap, RecordType},
};
use log::{debug, trace};

/// Knobs for [`extract_with`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Require SOA and NS record sets at the zone origin
    pub check_origin: bool,
}

/// Extract every hostname-bearing record (A, CNAME, NS) from a zone file.
///
/// # Errors
///
/// Returns a `ZoneParseError` if `domain` is not a valid origin or the zone is malformed
pub fn extract(contents: &str, domain: &str) -> Result<HostnameMap, ZoneParseError> {
    extract_with(contents, domain, &ExtractOptions::default())
}

/// Extract hostnames, mapping `<owner>.<domain>` to the last qualifying record
/// type seen for that owner.
///
/// The owner is written relative to the zone origin (`@` for the apex, `*` for
/// a wildcard) and `domain` is appended as given, without normalisation.
///
/// # Errors
///
/// Returns a `ZoneParseError` if `domain` is not a valid origin, the zone is
/// malformed, or `check_origin` is set and the apex lacks SOA/NS records
pub fn extract_with(
    contents: &str,
    domain: &str,
    options: &ExtractOptions,
) -> Result<HostnameMap, ZoneParseError> {
    let origin = Name::from_origin(domain).map_err(|e| ZoneParseError::InvalidOrigin {
        origin: domain.to_string(),
        reason: e.to_string(),
    })?;

    let zone = parse_zone(contents, &origin)?;
    if options.check_origin {
        zone.check_origin()?;
    }

    let mut hostnames = HostnameMap::new();
    for node in zone.nodes() {
        let fqdn = format!("{}.{domain}", node.name().relativize(zone.origin()));
        for set in node.rdatasets() {
            let Some(record_type) = RecordType::from_rr_type(set.rtype()) else {
                continue;
            };
            if let Some(previous) = hostnames.insert(fqdn.clone(), record_type)
                && previous != record_type
            {
                trace!("{fqdn}: {record_type} replaces {previous}");
            }
        }
    }

    debug!(
        "extracted {} hostnames from {} owner names in {domain}",
        hostnames.len(),
        zone.nodes().len()
    );

    Ok(hostnames)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    const ZONE: &str = r"
$TTL 1h
@       IN  SOA ns1 hostmaster 2024010101 1h 15m 1w 1d
@       IN  NS  ns1
@       IN  MX  10 mail
ns1     IN  A   192.0.2.1
www     IN  CNAME web
web     IN  A   192.0.2.10
mail    IN  A   192.0.2.20
*       IN  A   192.0.2.30
txt     IN  TXT hello
v6      IN  AAAA 2001:db8::1
";

    fn entries(map: &HostnameMap) -> Vec<(String, RecordType)> {
        map.iter()
            .map(|r| (r.fqdn.clone(), r.record_type))
            .collect()
    }

    #[test]
    fn test_single_a_record() {
        let map = extract("www IN A 1.2.3.4\n", "example.com").unwrap();
        assert_eq!(
            entries(&map),
            vec![("www.example.com".to_string(), RecordType::A)]
        );
    }

    #[test]
    fn test_extract_qualifying_records_only() {
        let map = extract(ZONE, "example.com").unwrap();
        assert_eq!(
            entries(&map),
            vec![
                ("@.example.com".to_string(), RecordType::Ns),
                ("ns1.example.com".to_string(), RecordType::A),
                ("www.example.com".to_string(), RecordType::Cname),
                ("web.example.com".to_string(), RecordType::A),
                ("mail.example.com".to_string(), RecordType::A),
                ("*.example.com".to_string(), RecordType::A),
            ]
        );
        assert_eq!(map.get("txt.example.com"), None);
        assert_eq!(map.get("v6.example.com"), None);
    }

    #[test]
    fn test_last_record_set_wins() {
        let map = extract(
            "host IN A 192.0.2.1\nhost IN NS ns1.example.net.\nhost IN A 192.0.2.2\n",
            "example.com",
        )
        .unwrap();
        // re-adding A moves its set behind NS
        assert_eq!(map.get("host.example.com"), Some(RecordType::A));
        assert_eq!(map.len(), 1);

        let map = extract(
            "host IN CNAME a.example.net.\nhost IN NS ns1.example.net.\nhost IN CNAME a.example.net.\n",
            "example.com",
        )
        .unwrap();
        assert_eq!(map.get("host.example.com"), Some(RecordType::Cname));

        let map = extract(
            "host IN NS ns1.example.net.\nhost IN CNAME other.example.net.\n",
            "example.com",
        )
        .unwrap();
        assert_eq!(map.get("host.example.com"), Some(RecordType::Cname));

        let map = extract(
            "host IN CNAME other.example.net.\nhost IN A 192.0.2.1\n",
            "example.com",
        )
        .unwrap();
        assert_eq!(map.get("host.example.com"), Some(RecordType::A));
    }

    #[test]
    fn test_extract_is_deterministic() {
        let first = extract(ZONE, "example.com").unwrap();
        let second = extract(ZONE, "example.com").unwrap();
        assert_eq!(entries(&first), entries(&second));
    }

    #[test]
    fn test_domain_appended_as_given() {
        let map = extract("www IN A 192.0.2.1\n", "example.com.").unwrap();
        assert_eq!(map.get("www.example.com."), Some(RecordType::A));
    }

    #[test]
    fn test_owner_case_merges() {
        let map = extract("WWW IN A 192.0.2.1\nwww IN CNAME web\n", "example.com").unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("WWW.example.com"), Some(RecordType::Cname));
    }

    #[test]
    fn test_invalid_origin() {
        let err = extract("www IN A 192.0.2.1\n", "bad..domain").unwrap_err();
        assert!(matches!(err, ZoneParseError::InvalidOrigin { .. }));
    }

    #[test]
    fn test_malformed_zone() {
        let err = extract("www IN A not-an-ip\n", "example.com").unwrap_err();
        assert!(matches!(err, ZoneParseError::BadRdata { line: 1, .. }));
    }

    #[test]
    fn test_check_origin_option() {
        let strict = ExtractOptions { check_origin: true };
        assert_eq!(
            extract_with("www IN A 192.0.2.1\n", "example.com", &strict).unwrap_err(),
            ZoneParseError::NoSoa
        );
        assert_eq!(extract_with(ZONE, "example.com", &strict).unwrap().len(), 6);
    }

    #[test]
    fn test_empty_zone() {
        let map = extract("", "example.com").unwrap();
        assert!(map.is_empty());
    }
}
