//! Amount-in-words rendering using the Indian numbering system
//! (crore / lakh / thousand). Always ends in "Rupees Only".

const BELOW_20: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

fn two_digits(n: u64) -> String {
    if n < 20 {
        return BELOW_20[n as usize].to_string();
    }
    let t = (n / 10) as usize;
    let r = n % 10;
    if r == 0 {
        TENS[t].to_string()
    } else {
        format!("{} {}", TENS[t], BELOW_20[r as usize])
    }
}

fn three_digits(n: u64) -> String {
    let h = n / 100;
    let r = n % 100;
    match (h, r) {
        (0, r) => two_digits(r),
        (h, 0) => format!("{} Hundred", BELOW_20[h as usize]),
        (h, r) => format!("{} Hundred {}", BELOW_20[h as usize], two_digits(r)),
    }
}

/// Convert a rupee amount to words. Negative or non-finite amounts are
/// coerced to zero rather than failing; the receipt must always render.
/// Fractional paise are truncated.
pub fn amount_to_words(amount: f64) -> String {
    let num = if amount.is_finite() && amount > 0.0 {
        amount.floor() as u64
    } else {
        0
    };
    integer_to_words(num)
}

/// Words rendering for an already-integral rupee amount.
pub fn integer_to_words(num: u64) -> String {
    if num == 0 {
        return "Zero Rupees Only".to_string();
    }

    let crore = num / 10_000_000;
    let mut remainder = num % 10_000_000;
    let lakh = remainder / 100_000;
    remainder %= 100_000;
    let thousand = remainder / 1_000;
    let rest = remainder % 1_000;

    let mut parts: Vec<String> = Vec::new();
    if crore > 0 {
        parts.push(format!("{} Crore", three_digits(crore)));
    }
    if lakh > 0 {
        parts.push(format!("{} Lakh", three_digits(lakh)));
    }
    if thousand > 0 {
        parts.push(format!("{} Thousand", three_digits(thousand)));
    }
    if rest > 0 {
        parts.push(three_digits(rest));
    }

    format!("{} Rupees Only", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero() {
        assert_eq!(amount_to_words(0.0), "Zero Rupees Only");
    }

    #[test]
    fn one_lakh() {
        assert_eq!(amount_to_words(100_000.0), "One Lakh Rupees Only");
    }

    #[test]
    fn twelve_lakh_mixed() {
        assert_eq!(
            amount_to_words(1_234_567.0),
            "Twelve Lakh Thirty Four Thousand Five Hundred Sixty Seven Rupees Only"
        );
    }

    #[test]
    fn eight_hundred() {
        assert_eq!(amount_to_words(800.0), "Eight Hundred Rupees Only");
    }

    #[test]
    fn crore_grouping() {
        assert_eq!(
            integer_to_words(12_34_56_789),
            "Twelve Crore Thirty Four Lakh Fifty Six Thousand Seven Hundred Eighty Nine Rupees Only"
        );
    }

    #[test]
    fn hundred_without_remainder() {
        assert_eq!(integer_to_words(100), "One Hundred Rupees Only");
        assert_eq!(integer_to_words(2_000), "Two Thousand Rupees Only");
    }

    #[test]
    fn teens_and_tens() {
        assert_eq!(integer_to_words(15), "Fifteen Rupees Only");
        assert_eq!(integer_to_words(40), "Forty Rupees Only");
        assert_eq!(integer_to_words(99), "Ninety Nine Rupees Only");
    }

    #[test]
    fn negative_and_nan_coerce_to_zero() {
        assert_eq!(amount_to_words(-500.0), "Zero Rupees Only");
        assert_eq!(amount_to_words(f64::NAN), "Zero Rupees Only");
    }

    #[test]
    fn fraction_truncates() {
        assert_eq!(amount_to_words(800.99), "Eight Hundred Rupees Only");
    }
}
