use rust_decimal::RoundingStrategy;

use crate::prelude::*;

pub fn format_time(time: Time) -> String {
  time.format("%H:%M").to_string()
}

/// Fixed-point rendering with `dp` decimals, halves rounded away from zero.
pub fn decimal(value: Decimal, dp: u32) -> String {
  let mut value =
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
  if value.is_zero() {
    value = value.abs();
  }
  format!("{value:.prec$}", prec = dp as usize)
}

/// Like [`decimal`] but always carries a sign.
pub fn signed(value: Decimal, dp: u32) -> String {
  let text = decimal(value, dp);
  if text.starts_with('-') { text } else { format!("+{text}") }
}

/// Maximum message length for Telegram Bot API (4096 characters).
/// We use a slightly smaller limit to account for potential HTML entity expansion.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4000;

/// Splits a long message into chunks that fit within Telegram's message limit.
/// Attempts to split at newline boundaries to preserve formatting.
pub fn chunk_message(text: &str, max_len: usize) -> Vec<String> {
  let max_len =
    if max_len == 0 { TELEGRAM_MAX_MESSAGE_LENGTH } else { max_len };

  if text.len() <= max_len {
    return vec![text.to_string()];
  }

  let mut chunks = Vec::new();
  let mut current = String::new();

  for line in text.lines() {
    if !current.is_empty() && current.len() + line.len() + 1 > max_len {
      chunks.push(std::mem::take(&mut current));
    }

    if line.len() > max_len {
      if !current.is_empty() {
        chunks.push(std::mem::take(&mut current));
      }
      let mut remaining = line;
      while remaining.len() > max_len {
        let mut cut = max_len;
        while !remaining.is_char_boundary(cut) {
          cut -= 1;
        }
        chunks.push(remaining[..cut].to_string());
        remaining = &remaining[cut..];
      }
      current = remaining.to_string();
    } else {
      if !current.is_empty() {
        current.push('\n');
      }
      current.push_str(line);
    }
  }

  if !current.is_empty() {
    chunks.push(current);
  }

  chunks
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decimal_rendering() {
    assert_eq!(decimal(dec!(80), 1), "80.0");
    assert_eq!(decimal(dec!(1.75), 1), "1.8");
    assert_eq!(decimal(dec!(-1.4778), 1), "-1.5");
    assert_eq!(decimal(dec!(116.67), 0), "117");
    assert_eq!(signed(dec!(8.333), 1), "+8.3");
    assert_eq!(signed(dec!(-0.04), 1), "+0.0");
    assert_eq!(signed(dec!(-1.2), 1), "-1.2");
  }

  #[test]
  fn test_chunk_message() {
    assert_eq!(chunk_message("short", 0), ["short"]);

    let text = "aaaa\nbbbb\ncccc";
    assert_eq!(chunk_message(text, 9), ["aaaa\nbbbb", "cccc"]);

    let chunks = chunk_message("ééééé", 4);
    assert!(chunks.iter().all(|chunk| chunk.len() <= 4));
    assert_eq!(chunks.concat(), "ééééé");
  }
}
