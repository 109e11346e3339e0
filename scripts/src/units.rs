//! Conversions between human readable ether amounts and wei

use alloy::primitives::{utils::parse_units, U256};

use crate::{constants::ETHER_DECIMALS, errors::ScriptError};

/// Parse a decimal ether amount (e.g. `"0.001"`) into wei
pub fn parse_ether(amount: &str) -> Result<U256, ScriptError> {
    let parsed = parse_units(amount.trim(), ETHER_DECIMALS)
        .map_err(|e| ScriptError::InvalidAmount(format!("{amount}: {e}")))?;

    if parsed.is_negative() {
        return Err(ScriptError::InvalidAmount(format!(
            "{amount}: amount can't be negative"
        )));
    }

    Ok(parsed.get_absolute())
}

/// Format a wei amount as a decimal ether string.
///
/// Trailing zeros of the fractional part are trimmed, but at least one
/// fractional digit is kept (`"0.001"`, `"1.0"`, `"0.0"`).
pub fn format_ether(amount: U256) -> String {
    let unit = U256::from(10u64).pow(U256::from(ETHER_DECIMALS));
    let (whole, fraction) = amount.div_rem(unit);

    // The remainder is below 10^18, so it always fits in a u64
    let fraction = format!(
        "{:0width$}",
        fraction.to::<u64>(),
        width = ETHER_DECIMALS as usize
    );
    let fraction = match fraction.trim_end_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };

    format!("{whole}.{fraction}")
}
