use rust_decimal::{Decimal, RoundingStrategy};

/// Price after applying a percentage discount, rounded half-up to cents.
///
/// A zero or absent discount returns `original_price` untouched.
pub fn discounted_price(original_price: Decimal, discount: Option<Decimal>) -> Decimal {
    let discount = discount.unwrap_or(Decimal::ZERO);
    if discount.is_zero() {
        return original_price;
    }

    let remaining = Decimal::ONE_HUNDRED - discount;
    (original_price * remaining / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Two decimal places, used wherever prices are compared for equality.
pub fn cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
