//! Masking helpers for the identifying fields of a `LoanApplication` (spec §7: name, email,
//! and id-last-4 are never written to logs verbatim, on both the success and error paths).
//!
//! These are display-only transforms for `tracing` fields — they never touch the stored or
//! wire-serialized value, only what a log line shows.

/// `tony@stark.com` -> `t***@stark.com`. Falls back to masking the whole string if there's
/// no `@`, rather than assuming it's safe to print.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            format!("{}***@{domain}", &local[..1])
        }
        _ => "***".to_string(),
    }
}

/// `1234` -> `**34`. Any input not exactly four digits is masked in full rather than
/// partially, since that shape is already unexpected.
pub fn mask_id_last_4(id_last_4: &str) -> String {
    if id_last_4.len() == 4 && id_last_4.bytes().all(|b| b.is_ascii_digit()) {
        format!("**{}", &id_last_4[2..])
    } else {
        "****".to_string()
    }
}

/// `Tony Stark` -> `T. Stark`. Keeps the family name (useful for correlating log lines across
/// a support call) while dropping the given name.
pub fn mask_name(name: &str) -> String {
    let mut parts = name.split_whitespace();
    match (parts.next(), parts.last()) {
        (Some(first), Some(last)) if !first.is_empty() && first != last => {
            format!("{}. {last}", &first[..1])
        }
        (Some(first), _) => first.to_string(),
        _ => "***".to_string(),
    }
}
