/// Where a multiplicative term came from.
///
/// Kept on every [`Modifier`] so a stack can be inspected term by term.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ModifierSource {
    TimelineSynergy,
    TimelineOpposition,
    PreferredResistance,
    PreferredEfficiency,
    AffinityEfficiency,
    Specialization,
    Resonance,
    LightPower,
    Barrier,
    Corruption,
    VoidPower,
    Channeling,
    Stance,
    TimeShift,
    Stealth,
    PhaseShift,
    DarkAffinity,
}

/// One multiplicative adjustment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Modifier {
    pub source: ModifierSource,
    pub factor: f32,
}

/// Ordered list of multiplicative terms.
///
/// Every bonus is a factor; the stack applies them left to right in the
/// order they were pushed. Pushing order therefore encodes the pipeline
/// stages (base terms before class-kit terms).
///
/// # Example
/// ```
/// # use echoes_core::modifier::{ModifierSource, ModifierStack};
/// let mut stack = ModifierStack::new();
/// stack.push(ModifierSource::TimelineSynergy, 1.3);
/// stack.push(ModifierSource::Stealth, 2.0);
/// assert!((stack.apply(100.0) - 260.0).abs() < 1e-3);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModifierStack {
    modifiers: Vec<Modifier>,
}

impl ModifierStack {
    pub fn new() -> Self {
        Self {
            modifiers: Vec::new(),
        }
    }

    /// Appends a factor. Exact `1.0` factors are dropped since they cannot
    /// change the result.
    pub fn push(&mut self, source: ModifierSource, factor: f32) {
        if factor != 1.0 {
            self.modifiers.push(Modifier { source, factor });
        }
    }

    /// Appends `factor` only when `condition` holds.
    pub fn push_if(&mut self, condition: bool, source: ModifierSource, factor: f32) {
        if condition {
            self.push(source, factor);
        }
    }

    /// Product of all factors.
    pub fn product(&self) -> f32 {
        self.modifiers.iter().map(|m| m.factor).product()
    }

    pub fn apply(&self, base: f32) -> f32 {
        self.modifiers.iter().fold(base, |acc, m| acc * m.factor)
    }

    /// Product of the factors contributed by `source`.
    pub fn factor_of(&self, source: ModifierSource) -> f32 {
        self.modifiers
            .iter()
            .filter(|m| m.source == source)
            .map(|m| m.factor)
            .product()
    }

    pub fn contains(&self, source: ModifierSource) -> bool {
        self.modifiers.iter().any(|m| m.source == source)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modifier> {
        self.modifiers.iter()
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }
}
