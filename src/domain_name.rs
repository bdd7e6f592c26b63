use crate::error::{map_encode_err, DNSCheckError, Result};
use crate::utils;

const POINTER_MASK: u8 = 0b1100_0000;
const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;
// Upper bound on compression pointers followed while decoding a single name,
// so a pointer loop in a hostile response can't spin forever.
const MAX_POINTER_HOPS: usize = 16;

// DomainName represents a domain name without its trailing root dot.
// The root itself is the empty name.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct DomainName(pub String);

impl DomainName {
    // Only a single trailing dot is stripped; anything else that leaves an
    // empty label is rejected when the name is encoded.
    pub fn new(domain: impl Into<String>) -> DomainName {
        let domain = domain.into();
        match domain.strip_suffix('.') {
            Some(relative) => DomainName(relative.to_owned()),
            None => DomainName(domain),
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        let name = self.0.as_str();
        name.split('.').filter(move |_| !name.is_empty())
    }

    // Encodes the domain name into a sequence of labels ending in a zero octet.
    pub fn encode(&self, encoded: &mut Vec<u8>) -> Result<()> {
        let mut wire = vec![];
        for label in self.labels() {
            if label.is_empty() {
                return Err(DNSCheckError::Encode(
                    String::from("name"),
                    format!("empty label in `{}`", self.0),
                ));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DNSCheckError::Encode(
                    String::from("name"),
                    format!("label `{label}` is longer than {MAX_LABEL_LEN} bytes"),
                ));
            }
            let len = u8::try_from(label.len()).map_err(|e| map_encode_err("name", &e))?;
            wire.push(len);
            wire.extend(label.as_bytes());
        }
        wire.push(0);

        if wire.len() > MAX_NAME_LEN {
            return Err(DNSCheckError::Encode(
                String::from("name"),
                format!("`{}` is {} bytes on the wire, longer than {MAX_NAME_LEN}", self.0, wire.len()),
            ));
        }
        encoded.extend(wire);
        Ok(())
    }

    // Decodes a name from its wire format. A name is one of:
    // 1. a sequence of labels ending in a zero octet
    // 2. a pointer
    // 3. a sequence of labels ending with a pointer
    // `message` is the entire DNS message, needed to follow pointers.
    pub fn decode<'a, T>(iter: &mut T, message: &'a [u8]) -> Result<DomainName>
    where
        T: Iterator<Item = &'a u8>,
    {
        let mut labels = vec![];
        read_labels(iter, message, &mut labels, 0)?;
        Ok(DomainName(labels.join(".")))
    }
}

impl std::fmt::Display for DomainName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn read_labels<'a, T>(
    iter: &mut T,
    message: &'a [u8],
    labels: &mut Vec<String>,
    hops: usize,
) -> Result<()>
where
    T: Iterator<Item = &'a u8>,
{
    loop {
        let len = *iter.next().ok_or(DNSCheckError::Parse)?;
        if len == 0 {
            return Ok(());
        }

        match len & POINTER_MASK {
            POINTER_MASK => {
                if hops >= MAX_POINTER_HOPS {
                    return Err(DNSCheckError::Decode(
                        String::from("compressed_name"),
                        String::from("too many compression pointers"),
                    ));
                }
                let next = *iter.next().ok_or(DNSCheckError::Parse)?;
                let offset = usize::from(u16::from_be_bytes([len & !POINTER_MASK, next]));
                let mut jumped = message
                    .get(offset..)
                    .ok_or_else(|| {
                        DNSCheckError::Decode(
                            String::from("compressed_name"),
                            format!("pointer to offset {offset} is out of bounds"),
                        )
                    })?
                    .iter();
                // A pointer always terminates the name.
                return read_labels(&mut jumped, message, labels, hops + 1);
            }
            0 => {
                let label = utils::take_exact(iter, usize::from(len))?;
                labels.push(String::from_utf8_lossy(&label).into_owned());
            }
            _ => {
                return Err(DNSCheckError::Decode(
                    String::from("name"),
                    format!("unsupported label type `{len:#04x}`"),
                ))
            }
        }
    }
}
