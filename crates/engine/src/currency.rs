use crate::EngineError;

/// Currency code used by every amount in the ledger.
///
/// The group settles in Dominican pesos only. The currency is still modelled
/// explicitly because the ledger text carries it on every posting and the
/// parser has to reject anything else.
///
/// ## Minor units
///
/// Amounts are stored as an `i64` number of **minor units** (see `MoneyCents`).
/// DOP has 2 minor units, so `10.50 DOP` ⇄ `1050`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Currency {
    #[default]
    Dop,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Dop => "DOP",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Dop => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DOP" => Ok(Currency::Dop),
            other => Err(EngineError::InvalidAmount(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_code_case_insensitively() {
        assert_eq!(Currency::try_from("dop").unwrap(), Currency::Dop);
        assert_eq!(Currency::try_from(" DOP ").unwrap(), Currency::Dop);
        assert!(Currency::try_from("EUR").is_err());
    }
}
