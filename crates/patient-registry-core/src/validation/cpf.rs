//! CPF (Brazilian taxpayer ID) checksum validation and display formatting.
//!
//! A CPF is 11 digits; the last two are check digits computed with weighted
//! mod-11 sums over the first 9 and first 10 digits respectively.

/// Number of digits in a sanitized CPF.
pub const CPF_LENGTH: usize = 11;

/// Validates and formats a record identifier.
///
/// The record service takes an implementation of this trait as an explicit
/// constructor argument.
pub trait IdentifierValidator {
    /// Check whether `raw` is a valid identifier. Non-digit characters are ignored.
    fn is_valid(&self, raw: &str) -> bool;

    /// Render `raw` for display. Returns the sanitized digits unchanged when
    /// they cannot be grouped.
    fn format(&self, raw: &str) -> String;

    /// Canonical storage form (digits only).
    fn sanitize(&self, raw: &str) -> String {
        sanitize(raw)
    }
}

impl<T: IdentifierValidator + ?Sized> IdentifierValidator for &T {
    fn is_valid(&self, raw: &str) -> bool {
        (**self).is_valid(raw)
    }

    fn format(&self, raw: &str) -> String {
        (**self).format(raw)
    }

    fn sanitize(&self, raw: &str) -> String {
        (**self).sanitize(raw)
    }
}

/// Stateless CPF validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpfValidator;

impl CpfValidator {
    pub fn new() -> Self {
        Self
    }
}

impl IdentifierValidator for CpfValidator {
    fn is_valid(&self, raw: &str) -> bool {
        let digits = digits(raw);
        if digits.len() != CPF_LENGTH {
            return false;
        }

        check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
    }

    fn format(&self, raw: &str) -> String {
        let cpf = sanitize(raw);
        if cpf.len() != CPF_LENGTH {
            return cpf;
        }

        format!("{}.{}.{}-{}", &cpf[0..3], &cpf[3..6], &cpf[6..9], &cpf[9..11])
    }
}

/// Strip every non-digit character.
pub fn sanitize(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Sanitized digits as numeric values.
fn digits(raw: &str) -> Vec<u32> {
    raw.chars().filter_map(|c| c.to_digit(10)).collect()
}

/// Compute the check digit for `prefix`.
///
/// Weights start at `prefix.len() + 1` and decrease by one per position, so a
/// 9-digit prefix uses 10..=2 and a 10-digit prefix uses 11..=2.
fn check_digit(prefix: &[u32]) -> u32 {
    let top_weight = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top_weight - i as u32))
        .sum();

    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}
