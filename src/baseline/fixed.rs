use crate::arm::DoseClass;
use crate::error::Result;
use crate::policy::Policy;
use crate::trial::Features;

/// Fixed-dose policy - always prescribes the high dose class
#[derive(Clone, Debug, Default)]
pub struct FixedDose;

impl Policy for FixedDose {
    fn name(&self) -> &str {
        "Fixed"
    }

    fn choose(&mut self, _features: &Features, _rng: &mut dyn rand::RngCore) -> Result<DoseClass> {
        Ok(DoseClass::High)
    }

    fn update(&mut self, _features: &Features, _arm: DoseClass, _reward: f64) -> Result<()> {
        Ok(())
    }

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_fixed_ignores_features() {
        let mut policy = FixedDose;
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        let empty = Features::new();
        assert_eq!(policy.choose(&empty, &mut rng).unwrap(), DoseClass::High);

        let mut features = Features::new();
        features.insert("Weight (kg)".to_string(), 40.0);
        features.insert("Age in decades".to_string(), 9.0);
        for _ in 0..10 {
            assert_eq!(policy.choose(&features, &mut rng).unwrap(), DoseClass::High);
        }
    }

    #[test]
    fn test_fixed_update_is_noop() {
        let mut policy = FixedDose;
        let empty = Features::new();
        assert!(policy.update(&empty, DoseClass::Low, -1.0).is_ok());
    }
}
