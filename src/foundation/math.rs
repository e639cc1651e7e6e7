pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Product of `factors`, saturating at `u128::MAX`.
///
/// An empty iterator yields `0`: no layers means no combinations, not one.
pub(crate) fn saturating_product(factors: impl IntoIterator<Item = usize>) -> u128 {
    let mut iter = factors.into_iter().peekable();
    if iter.peek().is_none() {
        return 0;
    }
    iter.fold(1u128, |acc, f| acc.saturating_mul(f as u128))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
