use std::{fmt, marker::PhantomData};

pub type Milimeters = Length<Milimeter>;

pub trait LengthUnit {
    const SUFFIX: &'static str;
}

pub struct Milimeter;

impl LengthUnit for Milimeter {
    const SUFFIX: &'static str = "mm";
}

/// A length tagged with its unit. Formatting always prints two decimal places
/// followed by the unit suffix.
pub struct Length<L: LengthUnit> {
    value: f64,
    _unit: PhantomData<L>,
}

impl<L: LengthUnit> Length<L> {
    pub const fn new(value: f64) -> Self {
        Self {
            value,
            _unit: PhantomData,
        }
    }
}

impl<L: LengthUnit> Clone for Length<L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: LengthUnit> Copy for Length<L> {}

impl<L: LengthUnit> fmt::Debug for Length<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, L::SUFFIX)
    }
}

impl<L: LengthUnit> fmt::Display for Length<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, L::SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_two_decimals() {
        assert_eq!(Milimeters::new(12.3456).to_string(), "12.35 mm");
        assert_eq!(Milimeters::new(0.0).to_string(), "0.00 mm");
        assert_eq!(Milimeters::new(7.0).to_string(), "7.00 mm");
    }
}
