//! Splits an expense total across participants.
//!
//! Every strategy returns allocations whose sum is **exactly** the expense
//! total. Amounts are integer cents ([`MoneyCents`]), so there is no rounding
//! drift to paper over; whatever cents integer division leaves behind goes
//! entirely to the first participant in caller order. Callers are expected to
//! pass participants in a stable, meaningful order (insertion order).

use std::collections::HashSet;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Number of basis points in 100% (percentage shares are hundredths of a
/// percent, so 25% == 2500).
pub const FULL_SHARE_BPS: u32 = 10_000;

/// How an expense total is divided among participants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Even division, remainder cents to the first participant.
    Equal,
    /// Caller-supplied fixed amounts per participant; validated to sum to the
    /// total exactly.
    Custom(Vec<(String, MoneyCents)>),
    /// Caller-supplied basis points per participant (must sum to 10 000);
    /// converted to amounts with the same remainder rule as [`Equal`].
    ///
    /// [`Equal`]: SplitStrategy::Equal
    Percentage(Vec<(String, u32)>),
    /// Exactly two participants: the non-payer owes the full total. This is
    /// not half-splitting; the payer covers nothing of their own.
    FullCover,
}

impl SplitStrategy {
    /// Returns the canonical strategy string stored on the expense row.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Custom(_) => "custom",
            Self::Percentage(_) => "percentage",
            Self::FullCover => "full_cover",
        }
    }
}

/// Allocates `total` across `participants`, preserving their input order.
///
/// The returned shares always sum to `total` exactly; violations of the
/// strategy contract surface as [`EngineError::Validation`].
pub fn allocate(
    total: MoneyCents,
    participants: &[String],
    payer: &str,
    strategy: &SplitStrategy,
) -> ResultEngine<Vec<(String, MoneyCents)>> {
    if !total.is_positive() {
        return Err(EngineError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }
    if participants.is_empty() {
        return Err(EngineError::Validation(
            "participant list must not be empty".to_string(),
        ));
    }
    let mut seen = HashSet::with_capacity(participants.len());
    for username in participants {
        if !seen.insert(username.as_str()) {
            return Err(EngineError::Validation(format!(
                "duplicate participant: {username}"
            )));
        }
    }

    match strategy {
        SplitStrategy::Equal => Ok(split_even(total, participants)),
        SplitStrategy::Custom(amounts) => {
            let shares = collect_shares(participants, amounts)?;
            let mut sum = MoneyCents::ZERO;
            for (username, amount) in &shares {
                if amount.is_negative() {
                    return Err(EngineError::Validation(format!(
                        "negative amount for {username}"
                    )));
                }
                sum = sum.checked_add(*amount).ok_or_else(|| {
                    EngineError::Validation("amounts overflow".to_string())
                })?;
            }
            if sum != total {
                return Err(EngineError::Validation(format!(
                    "custom amounts sum to {sum}, expected {total}"
                )));
            }
            Ok(shares)
        }
        SplitStrategy::Percentage(shares_bps) => {
            let shares = collect_shares(participants, shares_bps)?;
            let bps_sum: u64 = shares.iter().map(|(_, bps)| u64::from(*bps)).sum();
            if bps_sum != u64::from(FULL_SHARE_BPS) {
                return Err(EngineError::Validation(format!(
                    "percentages sum to {bps_sum} basis points, expected {FULL_SHARE_BPS}"
                )));
            }
            let mut out = Vec::with_capacity(shares.len());
            let mut allocated = MoneyCents::ZERO;
            for (username, bps) in shares {
                let cents =
                    (i128::from(total.cents()) * i128::from(bps) / i128::from(FULL_SHARE_BPS)) as i64;
                let amount = MoneyCents::new(cents);
                allocated += amount;
                out.push((username, amount));
            }
            // Flooring leaves at most (n - 1) cents unassigned.
            out[0].1 += total - allocated;
            Ok(out)
        }
        SplitStrategy::FullCover => {
            if participants.len() != 2 {
                return Err(EngineError::Validation(
                    "full cover requires exactly two participants".to_string(),
                ));
            }
            if !participants.iter().any(|p| p == payer) {
                return Err(EngineError::Validation(
                    "full cover requires the payer among the participants".to_string(),
                ));
            }
            Ok(participants
                .iter()
                .map(|username| {
                    let share = if username == payer { MoneyCents::ZERO } else { total };
                    (username.clone(), share)
                })
                .collect())
        }
    }
}

fn split_even(total: MoneyCents, participants: &[String]) -> Vec<(String, MoneyCents)> {
    let n = participants.len() as i64;
    let base = total.cents() / n;
    let remainder = total.cents() - base * n;

    participants
        .iter()
        .enumerate()
        .map(|(i, username)| {
            let extra = if i == 0 { remainder } else { 0 };
            (username.clone(), MoneyCents::new(base + extra))
        })
        .collect()
}

/// Reorders caller-supplied `(username, value)` pairs into participant order,
/// rejecting missing, unknown, or duplicated entries.
fn collect_shares<T: Copy>(
    participants: &[String],
    supplied: &[(String, T)],
) -> ResultEngine<Vec<(String, T)>> {
    if supplied.len() != participants.len() {
        return Err(EngineError::Validation(
            "shares must cover every participant exactly once".to_string(),
        ));
    }

    let mut out = Vec::with_capacity(participants.len());
    for username in participants {
        let mut matches = supplied.iter().filter(|(name, _)| name == username);
        let Some((_, value)) = matches.next() else {
            return Err(EngineError::Validation(format!(
                "missing share for participant {username}"
            )));
        };
        if matches.next().is_some() {
            return Err(EngineError::Validation(format!(
                "duplicate share for participant {username}"
            )));
        }
        out.push((username.clone(), *value));
    }
    Ok(out)
}
