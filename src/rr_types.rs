use crate::error::{DNSCheckError, Result};
use strum_macros::{AsRefStr, EnumString};

// Creates the provided enum and generates a TryFrom trait implementation
// to convert a u16 to its equivalent variant.
macro_rules! rr_type {
    ($(#[$meta:meta])* $vis:vis enum $name:ident {
        $($variant:ident$( = $val:literal)?),*
    ,}) => {
        $(#[$meta])*
        $vis enum $name {
            $($variant$( = $val)?),*
        }

        impl TryFrom<u16> for $name {
            type Error = DNSCheckError;

            fn try_from(v: u16) -> Result<Self> {
                match v {
                    $(x if x == $name::$variant as u16 => Ok($name::$variant),)*
                    _ => Err(DNSCheckError::InvalidRecordType(v.to_string())),
                }
            }
        }
    };
}

rr_type!(
    #[derive(Debug, EnumString, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
    pub enum RRType {
        A = 1,
        NS,
        MD,
        MF,
        CNAME,
        SOA,
        MB,
        MG,
        MR,
        NULL,
        WKS,
        PTR,
        HINFO,
        MINFO,
        MX,
        TXT,
        AAAA = 28,
        SRV = 33,
        DNAME = 39,
        OPT = 41,
    }
);

impl RRType {
    pub fn code(self) -> u16 {
        self as u16
    }
}

// Human readable name for a record type code, falling back to the
// RFC 3597 `TYPEnnn` form for codes we don't know about.
pub fn type_name(code: u16) -> String {
    RRType::try_from(code)
        .map(|t| t.as_ref().to_string())
        .unwrap_or_else(|_| format!("TYPE{code}"))
}
