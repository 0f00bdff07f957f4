/// A bounded resource: `0 <= current <= maximum`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Meter {
    current: f32,
    maximum: f32,
}

impl Meter {
    /// A full meter. Negative or non-finite maxima become zero.
    pub fn full(maximum: f32) -> Self {
        let maximum = super::non_negative(maximum);
        Self {
            current: maximum,
            maximum,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn maximum(&self) -> f32 {
        self.maximum
    }

    /// `current / maximum`, zero for an empty-capacity meter.
    pub fn fraction(&self) -> f32 {
        if self.maximum > 0.0 {
            self.current / self.maximum
        } else {
            0.0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    pub fn can_afford(&self, amount: f32) -> bool {
        amount.is_finite() && amount >= 0.0 && self.current >= amount
    }

    /// Deducts `amount` if the meter holds at least that much.
    pub fn spend(&mut self, amount: f32) -> bool {
        if !self.can_afford(amount) {
            return false;
        }
        self.current -= amount;
        true
    }

    /// Adds up to `amount`, returning what was actually added.
    pub fn restore(&mut self, amount: f32) -> f32 {
        self.shift(super::non_negative(amount))
    }

    /// Removes up to `amount`, returning what was actually removed.
    pub fn drain(&mut self, amount: f32) -> f32 {
        -self.shift(-super::non_negative(amount))
    }

    /// Changes capacity, keeping `current` within the new bound.
    pub fn set_maximum(&mut self, maximum: f32) {
        self.maximum = super::non_negative(maximum);
        self.current = self.current.min(self.maximum);
    }

    /// Clamps a persisted meter back into range. Returns true if it changed.
    pub fn repair(&mut self) -> bool {
        let before = *self;
        self.maximum = super::non_negative(self.maximum);
        self.current = super::non_negative(self.current).min(self.maximum);
        *self != before
    }

    fn shift(&mut self, delta: f32) -> f32 {
        let before = self.current;
        self.current = (self.current + delta).clamp(0.0, self.maximum);
        self.current - before
    }
}
