use std::net::{Ipv4Addr, Ipv6Addr};

use crate::domain_name::DomainName;
use crate::error::{map_decode_err, map_encode_err, DNSCheckError, Result};
use crate::query::CLASS_IN;
use crate::rr_types::{type_name, RRType};
use crate::utils;

// The payload of a resource record. Only address records are interpreted;
// everything else is carried as raw RDATA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    Other { r_type: u16, raw: Vec<u8> },
}

impl RecordData {
    pub fn r_type(&self) -> u16 {
        match self {
            RecordData::A(_) => RRType::A.code(),
            RecordData::AAAA(_) => RRType::AAAA.code(),
            RecordData::Other { r_type, .. } => *r_type,
        }
    }

    fn encode(&self, encoded: &mut Vec<u8>) {
        match self {
            RecordData::A(ip) => encoded.extend(ip.octets()),
            RecordData::AAAA(ip) => encoded.extend(ip.octets()),
            RecordData::Other { raw, .. } => encoded.extend(raw),
        }
    }

    fn decode(r_type: u16, raw: Vec<u8>) -> Result<RecordData> {
        match RRType::try_from(r_type) {
            Ok(RRType::A) => {
                let octets: [u8; 4] = raw.as_slice().try_into().map_err(|_| {
                    DNSCheckError::Decode(
                        String::from("rr"),
                        format!("A record carries {} bytes of data, expected 4", raw.len()),
                    )
                })?;
                Ok(RecordData::A(Ipv4Addr::from(octets)))
            }
            Ok(RRType::AAAA) => {
                let octets: [u8; 16] = raw.as_slice().try_into().map_err(|_| {
                    DNSCheckError::Decode(
                        String::from("rr"),
                        format!("AAAA record carries {} bytes of data, expected 16", raw.len()),
                    )
                })?;
                Ok(RecordData::AAAA(Ipv6Addr::from(octets)))
            }
            _ => Ok(RecordData::Other { r_type, raw }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DNSRecord {
    name: DomainName,
    class: u16,
    ttl: u32,
    data: RecordData,
}

impl DNSRecord {
    pub fn new(name: DomainName, ttl: u32, data: RecordData) -> DNSRecord {
        DNSRecord {
            name,
            class: CLASS_IN,
            ttl,
            data,
        }
    }

    pub fn name(&self) -> &DomainName {
        &self.name
    }

    pub fn r_type(&self) -> u16 {
        self.data.r_type()
    }

    pub fn type_name(&self) -> String {
        type_name(self.r_type())
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    pub fn encode(&self, encoded: &mut Vec<u8>) -> Result<()> {
        self.name.encode(encoded)?;
        encoded.extend(self.r_type().to_be_bytes());
        encoded.extend(self.class.to_be_bytes());
        encoded.extend(self.ttl.to_be_bytes());

        let mut rdata = vec![];
        self.data.encode(&mut rdata);
        let rd_len = u16::try_from(rdata.len()).map_err(|e| map_encode_err("rr", &e))?;
        encoded.extend(rd_len.to_be_bytes());
        encoded.extend(rdata);
        Ok(())
    }

    pub fn decode<'a, T>(iter: &mut T, message: &'a [u8]) -> Result<DNSRecord>
    where
        T: Iterator<Item = &'a u8>,
    {
        let name = DomainName::decode(iter, message)?;

        let parts = utils::u8_bytes_to_u16_vec(iter, 2).map_err(|e| map_decode_err("rr", &e))?;
        let r_type = parts[0];
        let class = parts[1];
        let ttl = utils::u8_bytes_to_u32(iter).map_err(|e| map_decode_err("rr", &e))?;

        let rd_len = utils::u8_bytes_to_u16_vec(iter, 1).map_err(|e| map_decode_err("rr", &e))?[0];
        let raw = utils::take_exact(iter, usize::from(rd_len)).map_err(|e| map_decode_err("rr", &e))?;

        Ok(DNSRecord {
            name,
            class,
            ttl,
            data: RecordData::decode(r_type, raw)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(name: &str, r_type: u16, rdata: &[u8]) -> Vec<u8> {
        let mut bytes = vec![];
        DomainName::new(name).encode(&mut bytes).unwrap();
        bytes.extend(r_type.to_be_bytes());
        bytes.extend(CLASS_IN.to_be_bytes());
        bytes.extend(300u32.to_be_bytes());
        bytes.extend((rdata.len() as u16).to_be_bytes());
        bytes.extend(rdata);
        bytes
    }

    #[test]
    fn decodes_a_record() {
        let bytes = wire("sensu.io", 1, &[1, 2, 3, 4]);
        let record = DNSRecord::decode(&mut bytes.iter(), &bytes).unwrap();
        assert_eq!(record.data(), &RecordData::A(Ipv4Addr::new(1, 2, 3, 4)));
        assert_eq!(record.ttl(), 300);
        assert_eq!(record.name().0, "sensu.io");
    }

    #[test]
    fn decodes_aaaa_record() {
        let bytes = wire("sensu.io", 28, &Ipv6Addr::LOCALHOST.octets());
        let record = DNSRecord::decode(&mut bytes.iter(), &bytes).unwrap();
        assert_eq!(record.data(), &RecordData::AAAA(Ipv6Addr::LOCALHOST));
        assert_eq!(record.type_name(), "AAAA");
    }

    #[test]
    fn keeps_other_records_raw() {
        let mut target = vec![];
        DomainName::new("edge.sensu.io").encode(&mut target).unwrap();
        let bytes = wire("sensu.io", 5, &target);
        let record = DNSRecord::decode(&mut bytes.iter(), &bytes).unwrap();
        assert_eq!(record.data(), &RecordData::Other { r_type: 5, raw: target });
        assert_eq!(record.type_name(), "CNAME");
    }

    #[test]
    fn rejects_malformed_address_length() {
        let bytes = wire("sensu.io", 1, &[1, 2, 3]);
        let err = DNSRecord::decode(&mut bytes.iter(), &bytes).unwrap_err();
        assert!(err.to_string().contains("expected 4"));
    }

    #[test]
    fn rejects_short_rdata() {
        let mut bytes = wire("sensu.io", 1, &[1, 2, 3, 4]);
        bytes.truncate(bytes.len() - 2);
        assert!(DNSRecord::decode(&mut bytes.iter(), &bytes).is_err());
    }

    #[test]
    fn encodes_what_it_decodes() {
        let record = DNSRecord::new(DomainName::new("sensu.io"), 60, RecordData::A(Ipv4Addr::new(10, 0, 0, 1)));
        let mut bytes = vec![];
        record.encode(&mut bytes).unwrap();
        assert_eq!(bytes, {
            let mut expected = wire("sensu.io", 1, &[10, 0, 0, 1]);
            let n = expected.len();
            expected[n - 10..n - 6].copy_from_slice(&60u32.to_be_bytes());
            expected
        });
    }
}
