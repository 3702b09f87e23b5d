use rust_decimal::{Decimal, RoundingStrategy};

use crate::prelude::*;

pub const OTC_PREFIX: &str = "TIQ-OTC-";

/// Current plafond period, one counter row per calendar month.
pub fn current_period() -> String {
  let now = Utc::now();
  format!("{:04}-{:02}", now.year(), now.month())
}

/// Money rounding: 2 decimal places, half-up.
pub fn round_money(amount: Decimal) -> Decimal {
  amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Normalizes partner input to the full code string. Partners are told only
/// the 5-digit suffix, so both `12345` and `TIQ-OTC-12345` are accepted.
pub fn normalize_otc(input: &str) -> Option<String> {
  let input = input.trim().to_ascii_uppercase();
  let suffix = input.strip_prefix(OTC_PREFIX).unwrap_or(&input);

  if suffix.len() == 5 && suffix.bytes().all(|b| b.is_ascii_digit()) {
    Some(format!("{OTC_PREFIX}{suffix}"))
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_accepts_suffix_and_full_code() {
    assert_eq!(normalize_otc("12345").as_deref(), Some("TIQ-OTC-12345"));
    assert_eq!(normalize_otc("TIQ-OTC-12345").as_deref(), Some("TIQ-OTC-12345"));
    assert_eq!(normalize_otc(" tiq-otc-00042 ").as_deref(), Some("TIQ-OTC-00042"));
  }

  #[test]
  fn normalize_rejects_malformed_input() {
    assert_eq!(normalize_otc(""), None);
    assert_eq!(normalize_otc("1234"), None);
    assert_eq!(normalize_otc("123456"), None);
    assert_eq!(normalize_otc("TIQ-OTC-12a45"), None);
    assert_eq!(normalize_otc("OTC-12345"), None);
  }

  #[test]
  fn money_rounds_half_up() {
    assert_eq!(round_money(dec!(2.965)), dec!(2.97));
    assert_eq!(round_money(dec!(2.964)), dec!(2.96));
    assert_eq!(round_money(dec!(9.00) * dec!(33) / dec!(100)), dec!(2.97));
  }
}
