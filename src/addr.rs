//! Address and prefix bit-string utilities.
//!
//! This file contains the pure conversions the rest of the planner is
//! built on: dotted-decimal addresses and masks are turned into 32-bit
//! bit strings, subnet prefixes are derived from address/mask pairs,
//! and prefixes are rendered back to dotted-decimal form.

/// Errors produced while parsing addresses and masks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("invalid address '{address}': expected four dotted-decimal octets")]
    OctetCount { address: String },

    #[error("invalid address '{address}': octet '{octet}' is not in 0-255")]
    BadOctet { address: String, octet: String },

    #[error("invalid mask '{mask}': set bits are not contiguous")]
    NonContiguousMask { mask: String },
}

/// Convert a dotted-decimal address into a 32-character bit string.
pub fn address_bits(address: &str) -> Result<String, FormatError> {
    let octets: Vec<&str> = address.split('.').collect();
    if octets.len() != 4 {
        return Err(FormatError::OctetCount {
            address: address.to_string(),
        });
    }

    let mut bits = String::with_capacity(32);
    for octet in octets {
        let value: u8 = octet.parse().map_err(|_| FormatError::BadOctet {
            address: address.to_string(),
            octet: octet.to_string(),
        })?;
        bits.push_str(&format!("{:08b}", value));
    }
    Ok(bits)
}

/// Convert a dotted-decimal mask into its bit string, rejecting masks
/// whose set bits are not a contiguous leading run.
pub fn mask_bits(mask: &str) -> Result<String, FormatError> {
    let bits = address_bits(mask)?;
    let ones = bits.chars().take_while(|b| *b == '1').count();
    if bits[ones..].contains('1') {
        return Err(FormatError::NonContiguousMask {
            mask: mask.to_string(),
        });
    }
    Ok(bits)
}

/// Derive the subnet prefix of an address under a mask: the leading
/// address bits up to the first 0 bit of the mask.
pub fn subnet_prefix(address: &str, mask: &str) -> Result<String, FormatError> {
    let addr = address_bits(address)?;
    let len = mask_length(mask)?;
    Ok(addr[..len].to_string())
}

/// Number of set bits in a mask, i.e. the prefix length.
pub fn mask_length(mask: &str) -> Result<usize, FormatError> {
    Ok(mask_bits(mask)?.chars().filter(|b| *b == '1').count())
}

/// Check whether two address/mask pairs agree on every bit position
/// covered by both masks. Comparison stops at the first position where
/// the masks diverge or either mask bit is 0.
///
/// Kept for callers that want a containment-style check; the subnet
/// aggregation itself groups by exact prefix-string equality.
pub fn same_subnet(ip1: &str, mask1: &str, ip2: &str, mask2: &str) -> Result<bool, FormatError> {
    let bits_ip1 = address_bits(ip1)?;
    let bits_ip2 = address_bits(ip2)?;
    let bits_mask1 = mask_bits(mask1)?;
    let bits_mask2 = mask_bits(mask2)?;

    for i in 0..32 {
        if &bits_mask1[i..=i] == "1" && &bits_mask2[i..=i] == "1" {
            if bits_ip1[i..=i] != bits_ip2[i..=i] {
                return Ok(false);
            }
        } else {
            break;
        }
    }
    Ok(true)
}

/// Render a prefix bit string back to dotted-decimal form, zero-padding
/// the trailing host bits.
pub fn prefix_to_dotted(prefix: &str) -> String {
    let mut padded = prefix.to_string();
    while padded.len() < 32 {
        padded.push('0');
    }

    padded
        .as_bytes()
        .chunks(8)
        .map(|chunk| {
            let octet = chunk
                .iter()
                .fold(0u32, |acc, b| (acc << 1) | u32::from(*b - b'0'));
            octet.to_string()
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Render a prefix bit string as dotted-decimal CIDR notation.
pub fn prefix_to_cidr(prefix: &str) -> String {
    format!("{}/{}", prefix_to_dotted(prefix), prefix.len())
}
