use crate::analysis::geo::aggregate::GeoLookup;
use maxminddb::PathElement;
use std::net::IpAddr;
use std::path::Path;

/// An offline IP database.
pub trait GeoDatabase: Send + Sync {
    /// `None` when the address is not covered.
    fn lookup(&self, ip: IpAddr) -> Option<GeoLookup>;
}

/// MaxMind city database, optionally paired with an ISP/ASN database.
pub struct MaxMindDatabase {
    city_reader: maxminddb::Reader<maxminddb::Mmap>,
    isp_reader: Option<maxminddb::Reader<maxminddb::Mmap>>,
}

impl MaxMindDatabase {
    pub fn open(city_db: &Path, isp_db: Option<&Path>) -> anyhow::Result<Self> {
        // Safety note on these memory-mapped files:
        // - opened read-only
        // - lifetime is bound to MaxMindDatabase
        // - nothing in this process writes to the mmdb files
        let city_reader = unsafe { maxminddb::Reader::open_mmap(city_db)? };

        // A broken ISP database only costs the ISP column.
        let isp_reader = match isp_db {
            Some(path) => match unsafe { maxminddb::Reader::open_mmap(path) } {
                Ok(reader) => Some(reader),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to open ISP database");
                    None
                }
            },
            None => None,
        };

        Ok(Self {
            city_reader,
            isp_reader,
        })
    }
}

impl GeoDatabase for MaxMindDatabase {
    fn lookup(&self, ip: IpAddr) -> Option<GeoLookup> {
        let city = self.city_reader.lookup(ip).ok()?;

        let mut geo = GeoLookup {
            country: city
                .decode_path::<String>(&[
                    PathElement::Key("country"),
                    PathElement::Key("names"),
                    PathElement::Key("en"),
                ])
                .ok()
                .flatten(),
            city: city
                .decode_path::<String>(&[
                    PathElement::Key("city"),
                    PathElement::Key("names"),
                    PathElement::Key("en"),
                ])
                .ok()
                .flatten(),
            isp: None,
        };

        let isp = self
            .isp_reader
            .as_ref()
            .and_then(|reader| reader.lookup(ip).ok());

        if let Some(isp) = isp {
            geo.isp = isp
                .decode_path::<String>(&[PathElement::Key("isp")])
                .ok()
                .flatten()
                .or_else(|| {
                    isp.decode_path::<String>(&[PathElement::Key("autonomous_system_organization")])
                        .ok()
                        .flatten()
                });
        }

        if geo == GeoLookup::default() {
            return None;
        }
        Some(geo)
    }
}

/// Resolve every IP; uncovered or unparsable addresses get an empty lookup.
pub(crate) fn lookup_all(db: &dyn GeoDatabase, ips: &[String]) -> Vec<GeoLookup> {
    ips.iter()
        .map(|ip| {
            ip.parse::<IpAddr>()
                .ok()
                .and_then(|addr| db.lookup(addr))
                .unwrap_or_default()
        })
        .collect()
}
