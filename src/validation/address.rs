//! Recipient address checks

use crate::{Error, Result};
use alloy::primitives::Address;

/// Parse a `0x`-prefixed 20-byte hex address.
///
/// All-lowercase and all-uppercase input is accepted as is. Mixed-case input
/// must carry a valid EIP-55 checksum.
pub fn validate_address(input: &str) -> Result<Address> {
    let input = input.trim();
    let hex = input
        .strip_prefix("0x")
        .ok_or_else(|| Error::InvalidArgument(format!("Address must start with 0x: {}", input)))?;

    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidArgument(format!(
            "Address must be 20 hex-encoded bytes: {}",
            input
        )));
    }

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());

    if has_lower && has_upper {
        Address::parse_checksummed(input, None)
            .map_err(|_| Error::InvalidArgument(format!("Invalid address checksum: {}", input)))
    } else {
        input
            .parse()
            .map_err(|e| Error::InvalidArgument(format!("Invalid address {}: {}", input, e)))
    }
}

/// Reject sending to the account's own address
pub fn not_current_address(recipient: &str, current: Address) -> Result<()> {
    let recipient = validate_address(recipient)?;
    if recipient == current {
        return Err(Error::InvalidArgument(
            "Cannot send to the current account".to_string(),
        ));
    }
    Ok(())
}
