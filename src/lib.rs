//! Inventory of the TLS certificates served by the hosts of a DNS zone.
//!
//! The zone file is reduced to the owner names that carry A, CNAME or NS
//! records, each name is probed on port 443, and one report row is written
//! per name with the certificate's subject, issuer, serial and expiration.

pub mod cli;
pub mod inventory;
pub mod metrics;
pub mod report;
pub mod tls;
pub mod zone;
