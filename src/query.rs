use crate::domain_name::DomainName;
use crate::error::{map_decode_err, Result};
use crate::rr_types::RRType;
use crate::utils;

pub const CLASS_IN: u16 = 1;

const FLAG_RESPONSE: u16 = 0x8000;
const FLAG_TRUNCATED: u16 = 0x0200;
const FLAG_RECURSION_DESIRED: u16 = 0x0100;
const RCODE_MASK: u16 = 0x000f;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DNSHeader {
    id: u16,
    flags: u16,
    qd_count: u16,
    an_count: u16,
    ns_count: u16,
    ar_count: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DNSQuestion {
    name: DomainName,
    q_type: u16,
    class: u16,
}

impl DNSQuestion {
    pub fn new(name: DomainName, q_type: RRType) -> DNSQuestion {
        DNSQuestion {
            name,
            q_type: q_type.code(),
            class: CLASS_IN,
        }
    }

    pub fn name(&self) -> &DomainName {
        &self.name
    }

    pub fn q_type(&self) -> u16 {
        self.q_type
    }

    pub fn encode(&self, encoded: &mut Vec<u8>) -> Result<()> {
        self.name.encode(encoded)?;
        encoded.extend(self.q_type.to_be_bytes());
        encoded.extend(self.class.to_be_bytes());
        Ok(())
    }

    pub fn decode<'a, T>(iter: &mut T, message: &'a [u8]) -> Result<DNSQuestion>
    where
        T: Iterator<Item = &'a u8>,
    {
        let name = DomainName::decode(iter, message)?;
        let parts = utils::u8_bytes_to_u16_vec(iter, 2).map_err(|e| map_decode_err("question", &e))?;
        Ok(DNSQuestion {
            name,
            q_type: parts[0],
            class: parts[1],
        })
    }
}

impl DNSHeader {
    pub fn query(id: u16, qd_count: u16) -> DNSHeader {
        DNSHeader {
            id,
            flags: FLAG_RECURSION_DESIRED,
            qd_count,
            ..DNSHeader::default()
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn set_id(&mut self, id: u16) {
        self.id = id;
    }

    pub fn is_response(&self) -> bool {
        self.flags & FLAG_RESPONSE != 0
    }

    pub fn set_response(&mut self) {
        self.flags |= FLAG_RESPONSE;
    }

    pub fn is_truncated(&self) -> bool {
        self.flags & FLAG_TRUNCATED != 0
    }

    pub fn recursion_desired(&self) -> bool {
        self.flags & FLAG_RECURSION_DESIRED != 0
    }

    pub fn rcode(&self) -> u16 {
        self.flags & RCODE_MASK
    }

    pub fn num_questions(&self) -> u16 {
        self.qd_count
    }

    pub fn num_answers(&self) -> u16 {
        self.an_count
    }

    pub fn num_authorities(&self) -> u16 {
        self.ns_count
    }

    pub fn num_additionals(&self) -> u16 {
        self.ar_count
    }

    // Section counts are derived from the message body when encoding, so the
    // header never disagrees with what is actually on the wire.
    pub fn set_counts(&mut self, qd: u16, an: u16, ns: u16, ar: u16) {
        self.qd_count = qd;
        self.an_count = an;
        self.ns_count = ns;
        self.ar_count = ar;
    }

    pub fn encode(&self, encoded: &mut Vec<u8>) {
        encoded.extend(self.id.to_be_bytes());
        encoded.extend(self.flags.to_be_bytes());
        encoded.extend(self.qd_count.to_be_bytes());
        encoded.extend(self.an_count.to_be_bytes());
        encoded.extend(self.ns_count.to_be_bytes());
        encoded.extend(self.ar_count.to_be_bytes());
    }

    pub fn decode<'a, T>(header_bytes: &mut T) -> Result<DNSHeader>
    where
        T: Iterator<Item = &'a u8>,
    {
        let parts = utils::u8_bytes_to_u16_vec(header_bytes, 6).map_err(|e| map_decode_err("header", &e))?;
        Ok(DNSHeader {
            id: parts[0],
            flags: parts[1],
            qd_count: parts[2],
            an_count: parts[3],
            ns_count: parts[4],
            ar_count: parts[5],
        })
    }
}
